use std::fmt;

/// Ranking state of a beatmap, using the integers the client expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankedStatus {
    NotSubmitted,
    Pending,
    NeedUpdate,
    Ranked,
    Approved,
    Qualified,
    Loved,
}

impl RankedStatus {
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            -1 => Some(Self::NotSubmitted),
            0 => Some(Self::Pending),
            1 => Some(Self::NeedUpdate),
            2 => Some(Self::Ranked),
            3 => Some(Self::Approved),
            4 => Some(Self::Qualified),
            5 => Some(Self::Loved),
            _ => None,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            Self::NotSubmitted => -1,
            Self::Pending => 0,
            Self::NeedUpdate => 1,
            Self::Ranked => 2,
            Self::Approved => 3,
            Self::Qualified => 4,
            Self::Loved => 5,
        }
    }

    /// Unsubmitted and outdated maps never get a leaderboard.
    pub fn has_leaderboard(self) -> bool {
        !matches!(self, Self::NotSubmitted | Self::NeedUpdate)
    }

    /// Ranked and approved boards are ordered by pp; everything else by score.
    pub fn ranks_by_pp(self) -> bool {
        matches!(self, Self::Ranked | Self::Approved)
    }
}

impl fmt::Display for RankedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
