//! Leaderboard audiences and requester privilege tiers.

/// Privilege bits read from `users.privileges`.
pub mod privileges {
    /// Account is visible on public leaderboards (not restricted).
    pub const USER_PUBLIC: u64 = 1;
    pub const USER_NORMAL: u64 = 1 << 1;
    pub const USER_DONOR: u64 = 1 << 2;
    pub const USER_PREMIUM: u64 = 1 << 23;
}

/// Which audience a leaderboard view is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaderboardScope {
    Global,
    ModFiltered,
    Friends,
    Country,
}

impl LeaderboardScope {
    /// Parse the client's `v` argument. `0` (local) is never sent online.
    pub fn from_client_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Global),
            2 => Some(Self::ModFiltered),
            3 => Some(Self::Friends),
            4 => Some(Self::Country),
            _ => None,
        }
    }

    /// Only global and mod boards are shared between requesters.
    pub fn is_shared(self) -> bool {
        matches!(self, Self::Global | Self::ModFiltered)
    }
}

/// How many rows of a page a requester gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrivilegeTier {
    Low,
    Medium,
    High,
}

impl PrivilegeTier {
    pub fn from_privileges(bits: u64) -> Self {
        if bits & privileges::USER_PREMIUM != 0 {
            PrivilegeTier::High
        } else if bits & privileges::USER_DONOR != 0 {
            PrivilegeTier::Medium
        } else {
            PrivilegeTier::Low
        }
    }

    pub fn page_size(self) -> usize {
        match self {
            PrivilegeTier::Low => 150,
            PrivilegeTier::Medium => 250,
            PrivilegeTier::High => 500,
        }
    }
}
