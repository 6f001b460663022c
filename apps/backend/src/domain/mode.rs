//! Game modes, ruleset variants, and the seven ranked (mode, variant) pairs.

use std::fmt;

use crate::errors::domain::DomainError;

/// Mods bitmask values the leaderboard logic cares about.
pub mod mods {
    pub const NO_MOD: u32 = 0;
    pub const HIDDEN: u32 = 1 << 3;
    pub const DOUBLE_TIME: u32 = 1 << 6;
    pub const RELAX: u32 = 1 << 7;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    Standard,
    Taiko,
    Catch,
    Mania,
}

impl GameMode {
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(GameMode::Standard),
            1 => Some(GameMode::Taiko),
            2 => Some(GameMode::Catch),
            3 => Some(GameMode::Mania),
            _ => None,
        }
    }

    /// Value stored in `play_mode` columns.
    pub fn id(self) -> i32 {
        match self {
            GameMode::Standard => 0,
            GameMode::Taiko => 1,
            GameMode::Catch => 2,
            GameMode::Mania => 3,
        }
    }

    fn label(self) -> &'static str {
        match self {
            GameMode::Standard => "std",
            GameMode::Taiko => "taiko",
            GameMode::Catch => "catch",
            GameMode::Mania => "mania",
        }
    }
}

/// Standard scoring vs. the alternate (relax) scoring tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulesetVariant {
    Vanilla,
    Relax,
}

impl RulesetVariant {
    /// Relax selects the alternate tables except on mania, which has none.
    pub fn from_mods(mode: GameMode, mods_mask: u32) -> Self {
        if mods_mask & mods::RELAX != 0 && mode != GameMode::Mania {
            RulesetVariant::Relax
        } else {
            RulesetVariant::Vanilla
        }
    }
}

/// A (mode, variant) pair that owns a leaderboard.
///
/// There are exactly seven: every mode in the standard variant, and every
/// mode except mania in the relax variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankedRuleset {
    mode: GameMode,
    variant: RulesetVariant,
}

impl RankedRuleset {
    pub const COUNT: usize = 7;

    pub fn new(mode: GameMode, variant: RulesetVariant) -> Result<Self, DomainError> {
        if variant == RulesetVariant::Relax && mode == GameMode::Mania {
            return Err(DomainError::validation(
                "relax ruleset has no mania leaderboard",
            ));
        }
        Ok(Self { mode, variant })
    }

    pub fn all() -> [RankedRuleset; Self::COUNT] {
        use GameMode::{Catch, Mania, Standard, Taiko};
        use RulesetVariant::{Relax, Vanilla};
        [
            Self::pair(Standard, Vanilla),
            Self::pair(Taiko, Vanilla),
            Self::pair(Catch, Vanilla),
            Self::pair(Mania, Vanilla),
            Self::pair(Standard, Relax),
            Self::pair(Taiko, Relax),
            Self::pair(Catch, Relax),
        ]
    }

    const fn pair(mode: GameMode, variant: RulesetVariant) -> Self {
        Self { mode, variant }
    }

    pub fn mode(self) -> GameMode {
        self.mode
    }

    pub fn variant(self) -> RulesetVariant {
        self.variant
    }

    /// Dense slot in `0..COUNT`, matching the order of [`RankedRuleset::all`].
    pub fn index(self) -> usize {
        let mode = self.mode.id() as usize;
        match self.variant {
            RulesetVariant::Vanilla => mode,
            RulesetVariant::Relax => 4 + mode,
        }
    }

    pub fn scores_table(self) -> &'static str {
        match self.variant {
            RulesetVariant::Vanilla => "scores",
            RulesetVariant::Relax => "scores_relax",
        }
    }
}

impl fmt::Display for RankedRuleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.variant {
            RulesetVariant::Vanilla => "vn",
            RulesetVariant::Relax => "rx",
        };
        write!(f, "{prefix}_{}", self.mode.label())
    }
}
