// Page cache behaviour: shared scopes hit the cache, private scopes never do.

use std::time::Duration;

use scoreboard::cache::CacheKey;
use scoreboard::config::ScoresConfig;
use scoreboard::domain::{mods, LeaderboardPage, LeaderboardScope};
use scoreboard::services::PageSource;
use scoreboard_test_support::wire::split_response;

use crate::support::fakes::{request, score, vanilla_std, Harness, COUNTRY, MAP};

#[tokio::test]
async fn second_global_request_is_served_from_cache() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(20);

    let first = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(first.page_source, PageSource::Storage);
    let calls = h.store.calls();

    let second = h.engine.leaderboard(&request(LeaderboardScope::Global, 2)).await.unwrap();
    assert_eq!(second.page_source, PageSource::Cache);
    assert_eq!(h.store.calls(), calls);

    let a = split_response(&first.body);
    let b = split_response(&second.body);
    assert_eq!(a.rows, b.rows);
    assert_eq!(a.total_count(), Some(20));
}

#[tokio::test]
async fn mod_filtered_pages_are_isolated_by_mods() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(5);
    let mut dt = score(100, 50, 2_000_000, 1500.0);
    dt.mods = mods::DOUBLE_TIME;
    h.store.insert(MAP, vanilla_std(), dt);

    let mut req = request(LeaderboardScope::ModFiltered, 1);
    req.mods = mods::DOUBLE_TIME;
    let dt_board = h.engine.leaderboard(&req).await.unwrap();
    assert_eq!(split_response(&dt_board.body).row_user_ids(), vec![50]);

    req.mods = mods::NO_MOD;
    let nomod_board = h.engine.leaderboard(&req).await.unwrap();
    assert_eq!(nomod_board.page_source, PageSource::Storage);
    assert_eq!(split_response(&nomod_board.body).row_user_ids(), vec![1, 2, 3, 4, 5]);

    let global = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(global.page_source, PageSource::Storage);
    assert_eq!(split_response(&global.body).row_user_ids()[0], 50);

    let pages = &h.engine.caches().pages;
    assert_eq!(pages.len(), 3);
    assert!(pages
        .get(vanilla_std(), &CacheKey::mod_filtered(MAP, mods::DOUBLE_TIME))
        .is_some());
}

#[tokio::test]
async fn friends_and_country_boards_never_touch_the_page_cache() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(10);
    h.store.befriend(3, 5);
    h.store.set_country(2, COUNTRY);
    h.store.set_country(4, COUNTRY);
    h.store.set_country(6, "DE");

    for _ in 0..2 {
        let friends = h.engine.leaderboard(&request(LeaderboardScope::Friends, 3)).await.unwrap();
        assert_eq!(friends.page_source, PageSource::Storage);
        assert_eq!(split_response(&friends.body).row_user_ids(), vec![3, 5]);
    }

    let country = h.engine.leaderboard(&request(LeaderboardScope::Country, 2)).await.unwrap();
    assert_eq!(country.page_source, PageSource::Storage);
    assert_eq!(split_response(&country.body).row_user_ids(), vec![2, 4]);

    assert_eq!(h.store.calls().pages, 3);
    assert!(h.engine.caches().pages.is_empty());
    assert_eq!(
        h.engine.caches().personal_bests.get(vanilla_std(), 3, MAP),
        None
    );
}

#[tokio::test]
async fn disabled_cache_always_reads_storage() {
    let mut config = ScoresConfig::default();
    config.cache.enabled = false;
    let h = Harness::new(config);
    h.seed(3);

    for _ in 0..3 {
        let board = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
        assert_eq!(board.page_source, PageSource::Storage);
    }
    assert_eq!(h.store.calls().pages, 3);
    assert!(h.engine.caches().pages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn expired_pages_are_refetched() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(3);

    h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    tokio::time::advance(Duration::from_secs(119 * 60)).await;
    let fresh = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(fresh.page_source, PageSource::Cache);

    tokio::time::advance(Duration::from_secs(2 * 60)).await;
    let stale = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(stale.page_source, PageSource::Storage);
    assert_eq!(h.store.calls().pages, 2);
}

#[tokio::test]
async fn inconsistent_cached_page_is_bypassed() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(3);
    let broken = LeaderboardPage {
        total_count: 1,
        rows: vec![score(1, 1, 10, 1.0), score(2, 2, 9, 0.5)],
        truncated: false,
    };
    h.engine
        .caches()
        .pages
        .put(vanilla_std(), CacheKey::global(MAP), broken.into());

    let board = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(board.page_source, PageSource::Storage);
    assert_eq!(split_response(&board.body).total_count(), Some(3));
}
