// Results computed before an invalidation never outlive it.

use std::sync::Arc;
use std::time::Duration;

use scoreboard::cache::MemoryBestSlot;
use scoreboard::config::ScoresConfig;
use scoreboard::domain::{LeaderboardScope, RankedStatus};
use scoreboard::services::{PageSource, PersonalBestSource};
use scoreboard_test_support::wire::split_response;

use crate::support::fakes::{request, score, vanilla_std, Harness, MAP};

fn small_pages() -> ScoresConfig {
    ScoresConfig {
        page_cap: 3,
        ..ScoresConfig::default()
    }
}

/// Users 1..=10: user 10 is last by pp but fifth by score.
fn seed_split_orders(h: &Harness) {
    for i in 1..=9 {
        h.store
            .insert(MAP, vanilla_std(), score(i, i, 1_000_000 - i * 1000, 1000.0 - i as f64));
    }
    h.store.insert(MAP, vanilla_std(), score(10, 10, 995_500, 500.0));
}

#[tokio::test(start_paused = true)]
async fn page_fetched_across_an_invalidation_is_not_cached() {
    let h = Harness::new(small_pages());
    h.seed(3);
    h.store.delay(Duration::from_millis(100));

    let engine = Arc::clone(&h.engine);
    let in_flight = tokio::spawn(async move {
        engine
            .leaderboard(&request(LeaderboardScope::Global, 1))
            .await
    });

    // Lands while the count query is running.
    tokio::time::sleep(Duration::from_millis(150)).await;
    h.store
        .insert(MAP, vanilla_std(), score(50, 50, 5_000_000, 5000.0));
    h.engine.caches().invalidate_map(MAP).await;

    let raced = in_flight.await.unwrap().unwrap();
    assert_eq!(raced.page_source, PageSource::Storage);
    assert!(h.engine.caches().pages.is_empty());

    let board = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    assert_eq!(board.page_source, PageSource::Storage);
    let parsed = split_response(&board.body);
    assert_eq!(parsed.row_user_ids(), vec![50, 1, 2]);
    assert_eq!(parsed.total_count(), Some(4));
}

#[tokio::test]
async fn status_change_reranks_the_fallback_personal_best() {
    let h = Harness::new(small_pages());
    seed_split_orders(&h);

    let ranked = h.engine.leaderboard(&request(LeaderboardScope::Global, 10)).await.unwrap();
    assert_eq!(ranked.personal_best, PersonalBestSource::Fallback);
    assert_eq!(split_response(&ranked.body).personal_best_rank(), Some((10, 10)));

    h.beatmaps.set_status(MAP, RankedStatus::Loved);
    h.engine.caches().invalidate_map(MAP).await;

    let loved = h.engine.leaderboard(&request(LeaderboardScope::Global, 10)).await.unwrap();
    assert_eq!(loved.personal_best, PersonalBestSource::Fallback);
    assert_eq!(split_response(&loved.body).personal_best_rank(), Some((10, 5)));
    assert_eq!(h.store.calls().outranking, 2);
}

#[tokio::test]
async fn shared_slot_written_before_invalidation_is_ignored() {
    let slot = Arc::new(MemoryBestSlot::new());
    let first = Harness::with_slot(small_pages(), slot.clone());
    let second = Harness::with_slot(small_pages(), slot);
    first.seed(10);
    second.seed(10);

    let board = first.engine.leaderboard(&request(LeaderboardScope::Global, 8)).await.unwrap();
    assert_eq!(split_response(&board.body).personal_best_rank(), Some((8, 8)));

    // Two new scores above user 8, announced to the second process.
    for id in [100, 101] {
        second
            .store
            .insert(MAP, vanilla_std(), score(id, id, 2_000_000, 2000.0 + id as f64));
    }
    second.engine.caches().invalidate_map(MAP).await;

    let board = second.engine.leaderboard(&request(LeaderboardScope::Global, 8)).await.unwrap();
    assert_eq!(split_response(&board.body).personal_best_rank(), Some((8, 10)));
    assert_eq!(second.store.calls().outranking, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invalidations_leave_no_stale_page() {
    let h = Harness::new(ScoresConfig::default());
    h.seed(3);
    h.store.delay(Duration::from_millis(1));

    let mut readers = Vec::new();
    for user_id in 1..=6 {
        let engine = Arc::clone(&h.engine);
        readers.push(tokio::spawn(async move {
            for _ in 0..20 {
                engine
                    .leaderboard(&request(LeaderboardScope::Global, user_id))
                    .await
                    .unwrap();
            }
        }));
    }

    let engine = Arc::clone(&h.engine);
    let store = Arc::clone(&h.store);
    let writer = tokio::spawn(async move {
        for k in 0..20 {
            let id = 100 + k;
            store.insert(MAP, vanilla_std(), score(id, id, 2_000_000 + id, 2000.0 + id as f64));
            engine.caches().invalidate_map(MAP).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    });

    for reader in readers {
        reader.await.unwrap();
    }
    writer.await.unwrap();

    let board = h.engine.leaderboard(&request(LeaderboardScope::Global, 1)).await.unwrap();
    let parsed = split_response(&board.body);
    assert_eq!(parsed.row_user_ids().first(), Some(&119));
    assert_eq!(parsed.total_count(), Some(23));
}
