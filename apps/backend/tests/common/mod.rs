#![allow(dead_code)]

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    scoreboard_test_support::test_logging::init();
}
