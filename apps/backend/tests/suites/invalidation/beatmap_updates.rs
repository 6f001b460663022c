// Beatmap update notifications evict every derived cache entry.

use std::sync::Arc;

use scoreboard::cache::CacheKey;
use scoreboard::config::ScoresConfig;
use scoreboard::domain::{LeaderboardPage, LeaderboardScope, RankedRuleset, RankedStatus};
use scoreboard::realtime::invalidation::{apply, handle_payload};
use scoreboard::realtime::BeatmapUpdate;
use scoreboard::services::PageSource;
use scoreboard_test_support::wire::split_response;

use crate::support::fakes::{request, score, vanilla_std, Harness, MAP};

const SIBLING: &str = "5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0b";

#[tokio::test]
async fn map_update_evicts_pages_and_personal_bests() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(612);
    h.engine.leaderboard(&request(LeaderboardScope::Global, 600)).await.unwrap();
    assert!(h.engine.caches().personal_bests.get(vanilla_std(), 600, MAP).is_some());

    let report = apply(&h.engine, &BeatmapUpdate::Map { id: 75 }).await.unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(report.personal_bests, 1);
    assert!(h.engine.caches().pages.is_empty());

    let pages_before = h.store.calls().pages;
    let board = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(board.page_source, PageSource::Storage);
    assert_eq!(h.store.calls().pages, pages_before + 1);
}

#[tokio::test]
async fn set_update_reaches_every_difficulty_and_ruleset() {
    let h = Harness::new(ScoresConfig::default());
    h.beatmaps.add(SIBLING, 76, 1, RankedStatus::Ranked);
    h.beatmaps.add("ffffffffffffffffffffffffffffffff", 900, 2, RankedStatus::Ranked);
    h.seed(3);

    let page = Arc::new(LeaderboardPage::empty());
    for ruleset in RankedRuleset::all() {
        for hash in [MAP, SIBLING, "ffffffffffffffffffffffffffffffff"] {
            h.engine
                .caches()
                .pages
                .put(ruleset, CacheKey::global(hash), page.clone());
        }
    }

    let report = apply(&h.engine, &BeatmapUpdate::Set { set_id: 1 }).await.unwrap();
    assert_eq!(report.pages, 2 * RankedRuleset::COUNT);
    assert_eq!(h.engine.caches().pages.len(), RankedRuleset::COUNT);
}

#[tokio::test]
async fn newly_ranked_map_is_served_after_hash_update() {
    let h = Harness::new(ScoresConfig::default());
    h.beatmaps.set_status(MAP, RankedStatus::NotSubmitted);
    h.store.insert(MAP, vanilla_std(), score(1, 1, 1000, 50.0));

    let before = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(before.body, "-1|false");

    h.beatmaps.set_status(MAP, RankedStatus::Ranked);
    let cached = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(cached.page_source, PageSource::Unranked);

    let payload = format!(r#"{{"md5": "{MAP}"}}"#);
    assert!(handle_payload(&h.engine, &payload).await.is_some());

    let after = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    let parsed = split_response(&after.body);
    assert!(parsed.status_line.starts_with("2|false|75|1|1"));
    assert_eq!(parsed.row_user_ids(), vec![1]);
}

#[tokio::test]
async fn malformed_payloads_are_dropped() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(3);
    h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();

    assert!(handle_payload(&h.engine, "not json").await.is_none());
    assert!(handle_payload(&h.engine, r#"{"id": "seventy-five"}"#).await.is_none());
    assert_eq!(h.engine.caches().pages.len(), 1);
}

#[tokio::test]
async fn unknown_map_id_is_a_no_op() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(3);
    h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();

    let report = handle_payload(&h.engine, r#"{"id": 123456}"#).await.unwrap();
    assert_eq!(report.pages, 0);
    assert_eq!(h.engine.caches().pages.len(), 1);
}
