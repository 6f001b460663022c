//! Error codes for the scoreboard backend.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE. The game client never sees them
//! directly: it only understands the short `error: <word>` lines produced by
//! [`ErrorCode::client_line`].

use core::fmt;

/// Centralized error codes for the scoreboard backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Client input
    /// Missing or unparsable request argument
    InvalidArguments,
    /// Leaderboard scope id outside the supported set
    InvalidScope,
    /// Game mode id outside 0..=3
    InvalidMode,
    /// Mode/variant pair with no leaderboard (alternate ruleset + mania)
    InvalidRuleset,

    // Authentication
    /// Unknown user or wrong password hash
    LoginFailed,
    /// Restricted account
    Banned,

    // Upstream collaborators
    /// Beatmap resolver failed
    BeatmapUnavailable,
    /// Score store unreachable or erroring
    DbUnavailable,
    /// Request-scoped storage timeout expired
    DbTimeout,
    /// Cross-process cache unreachable
    CacheUnavailable,

    // System Errors
    /// Unexpected internal failure
    Internal,
    /// Configuration error
    ConfigError,
    /// Stored data could not be decoded
    DataCorruption,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArguments => "INVALID_ARGUMENTS",
            Self::InvalidScope => "INVALID_SCOPE",
            Self::InvalidMode => "INVALID_MODE",
            Self::InvalidRuleset => "INVALID_RULESET",

            Self::LoginFailed => "LOGIN_FAILED",
            Self::Banned => "BANNED",

            Self::BeatmapUnavailable => "BEATMAP_UNAVAILABLE",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::CacheUnavailable => "CACHE_UNAVAILABLE",

            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
        }
    }

    /// The fixed line the game client understands for this code.
    pub fn client_line(&self) -> String {
        match self {
            Self::InvalidArguments | Self::InvalidScope | Self::InvalidMode | Self::InvalidRuleset => {
                "error: meme".to_string()
            }
            Self::LoginFailed => "error: pass".to_string(),
            Self::Banned => "error: ban".to_string(),
            other => format!("error: {}", other.as_str().to_lowercase()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
