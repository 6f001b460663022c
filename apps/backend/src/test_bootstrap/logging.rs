#![cfg(test)]

//! Unit-test logging hook, shared with the integration tests.

pub fn init() {
    scoreboard_test_support::test_logging::init();
}
