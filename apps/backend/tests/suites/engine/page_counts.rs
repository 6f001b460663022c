// Total counts and the page cap.

use scoreboard::cache::CacheKey;
use scoreboard::config::ScoresConfig;
use scoreboard::domain::{privileges, LeaderboardScope};
use scoreboard_test_support::wire::split_response;

use crate::support::fakes::{request, vanilla_std, Harness, MAP};

#[tokio::test]
async fn total_reflects_all_scores_beyond_the_cap() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(612);

    let board = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    let parsed = split_response(&board.body);
    assert_eq!(parsed.total_count(), Some(612));
    assert_eq!(h.store.calls().counts, 1);

    let page = h
        .engine
        .caches()
        .pages
        .get(vanilla_std(), &CacheKey::global(MAP))
        .unwrap();
    assert_eq!(page.rows.len(), 500);
    assert!(page.truncated);
    assert_eq!(page.total_count, 612);
}

#[tokio::test]
async fn short_page_needs_no_count_query() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(42);

    let board = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(split_response(&board.body).total_count(), Some(42));
    assert_eq!(h.store.calls().counts, 0);
}

#[tokio::test]
async fn empty_board_renders_header_and_blank_personal_best() {
    let h = Harness::new(ScoresConfig::default());

    let board = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(
        board.body,
        "2|false|75|1|0\n0\nKenji Ninuma - DISCO PRINCE [Normal]\n10.0\n"
    );
}

#[tokio::test]
async fn rendered_rows_follow_privilege_tier() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(600);

    let low = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(split_response(&low.body).rows.len(), 150);

    let mut donor = request(LeaderboardScope::Global, 1);
    donor.requester.privileges |= privileges::USER_DONOR;
    let medium = h.engine.leaderboard(&donor).await.unwrap();
    assert_eq!(split_response(&medium.body).rows.len(), 250);

    let mut premium = request(LeaderboardScope::Global, 1);
    premium.requester.privileges |= privileges::USER_PREMIUM;
    let high = h.engine.leaderboard(&premium).await.unwrap();
    let rows = split_response(&high.body).rows;
    assert_eq!(rows.len(), 500);
    assert_eq!(rows[499].split('|').nth(13), Some("500"));
}

#[tokio::test]
async fn smaller_page_cap_is_honoured() {
    let config = ScoresConfig {
        page_cap: 50,
        ..ScoresConfig::default()
    };
    let h = Harness::new(config);
    h.seed(80);

    let board = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    let parsed = split_response(&board.body);
    assert_eq!(parsed.rows.len(), 50);
    assert_eq!(parsed.total_count(), Some(80));
}
