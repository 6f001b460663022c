//! Shared helpers for the scoreboard's unit and integration tests.

pub mod test_logging;
pub mod wire;
