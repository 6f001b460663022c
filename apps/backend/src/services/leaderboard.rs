//! Leaderboard retrieval: page caching, personal-best resolution and rendering.
//!
//! Request flow:
//! 1. Maintenance mode and known-unranked hashes short-circuit.
//! 2. The beatmap is resolved; maps without a leaderboard are remembered.
//! 3. Global/mod pages come from the page cache or storage; friends and
//!    country pages are always computed from storage.
//! 4. The requester's personal best is taken from the index, the page, or a
//!    dedicated storage fallback when the page was truncated.
//! 5. The response is rendered in the client wire format.
//!
//! Results are only published to the caches when the map's epoch is the one
//! observed before storage was queried.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::cache::epoch::unix_millis;
use crate::cache::{
    CacheKey, CrossProcessBestSlot, LeaderboardCaches, MapEpoch, PersonalBest, SlotContext, SlotEntry,
};
use crate::config::ScoresConfig;
use crate::domain::{
    GameMode, LeaderboardPage, LeaderboardScope, RankedRuleset, RankedStatus, RankingOrder,
    RulesetVariant,
};
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::protocol::wire;
use crate::repos::{BeatmapInfo, BeatmapResolver, Requester, ScoreFilter, ScoreQuery, ScoreStore};

/// One client leaderboard request, already authenticated.
#[derive(Debug, Clone)]
pub struct LeaderboardRequest {
    pub map_hash: String,
    pub set_id: i64,
    pub file_name: String,
    pub mode: GameMode,
    /// Mods selected in the client; the relax bit picks the ruleset variant.
    pub mods: u32,
    pub scope: LeaderboardScope,
    pub requester: Requester,
}

/// Where the page behind a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    Cache,
    Storage,
    Unranked,
    Maintenance,
}

/// How the personal-best line was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalBestSource {
    Indexed,
    InPage,
    /// Page was complete and the requester was not on it.
    KnownAbsent,
    Fallback,
    /// Fallback ran and found no score.
    NoScore,
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLeaderboard {
    pub body: String,
    pub page_source: PageSource,
    pub personal_best: PersonalBestSource,
}

impl RenderedLeaderboard {
    fn short_circuit(body: String, page_source: PageSource) -> Self {
        Self {
            body,
            page_source,
            personal_best: PersonalBestSource::NotApplicable,
        }
    }
}

pub struct ScoreRetrievalEngine {
    scores: Arc<dyn ScoreStore>,
    beatmaps: Arc<dyn BeatmapResolver>,
    best_slot: Arc<dyn CrossProcessBestSlot>,
    caches: Arc<LeaderboardCaches>,
    config: ScoresConfig,
}

impl ScoreRetrievalEngine {
    pub fn new(
        scores: Arc<dyn ScoreStore>,
        beatmaps: Arc<dyn BeatmapResolver>,
        best_slot: Arc<dyn CrossProcessBestSlot>,
        caches: Arc<LeaderboardCaches>,
        config: ScoresConfig,
    ) -> Self {
        Self {
            scores,
            beatmaps,
            best_slot,
            caches,
            config,
        }
    }

    pub fn caches(&self) -> &Arc<LeaderboardCaches> {
        &self.caches
    }

    pub fn beatmaps(&self) -> Arc<dyn BeatmapResolver> {
        Arc::clone(&self.beatmaps)
    }

    pub fn config(&self) -> &ScoresConfig {
        &self.config
    }

    /// Build the full response body for `request`.
    ///
    /// Storage failures and the request timeout are returned as errors; an
    /// empty leaderboard is only ever rendered when storage says so.
    pub async fn leaderboard(
        &self,
        request: &LeaderboardRequest,
    ) -> Result<RenderedLeaderboard, DomainError> {
        if self.config.maintenance {
            return Ok(RenderedLeaderboard::short_circuit(
                wire::MAINTENANCE.to_string(),
                PageSource::Maintenance,
            ));
        }

        let started = Instant::now();
        let result = tokio::time::timeout(self.config.request_timeout, self.resolve(request)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(rendered)) => {
                info!(
                    map_hash = %request.map_hash,
                    user_id = request.requester.user_id,
                    scope = ?request.scope,
                    cache_hit = rendered.page_source == PageSource::Cache,
                    personal_best = ?rendered.personal_best,
                    elapsed_ms,
                    "leaderboard served"
                );
                Ok(rendered)
            }
            Ok(Err(err)) => {
                warn!(
                    map_hash = %request.map_hash,
                    user_id = request.requester.user_id,
                    error = %err,
                    elapsed_ms,
                    "leaderboard request failed"
                );
                Err(err)
            }
            Err(_) => {
                warn!(
                    map_hash = %request.map_hash,
                    user_id = request.requester.user_id,
                    timeout_ms = self.config.request_timeout.as_millis() as u64,
                    "leaderboard request timed out"
                );
                Err(DomainError::infra(
                    InfraErrorKind::Timeout,
                    format!(
                        "leaderboard request exceeded {}ms",
                        self.config.request_timeout.as_millis()
                    ),
                ))
            }
        }
    }

    async fn resolve(&self, request: &LeaderboardRequest) -> Result<RenderedLeaderboard, DomainError> {
        let epoch = self.caches.epochs.current(&request.map_hash);

        if let Some(status) = self.caches.unranked.get(&request.map_hash).await {
            debug!(map_hash = %request.map_hash, %status, "known unranked map");
            return Ok(RenderedLeaderboard::short_circuit(
                wire::status_only_header(status),
                PageSource::Unranked,
            ));
        }

        let beatmap = self
            .beatmaps
            .resolve(&request.map_hash, request.set_id, &request.file_name)
            .await?;
        let status = beatmap.ranked_status;
        if !status.has_leaderboard() {
            self.caches.unranked.remember(&request.map_hash, status).await;
            if self.caches.epochs.current(&request.map_hash) != epoch {
                self.caches.unranked.invalidate(&request.map_hash).await;
            }
            info!(map_hash = %request.map_hash, %status, "map has no leaderboard, remembered");
            return Ok(RenderedLeaderboard::short_circuit(
                wire::status_only_header(status),
                PageSource::Unranked,
            ));
        }

        let variant = RulesetVariant::from_mods(request.mode, request.mods);
        let ruleset = RankedRuleset::new(request.mode, variant)?;
        let query = score_query(request, ruleset, status);

        let (page, page_source) = self.page_for(ruleset, &query, request.scope, epoch).await?;
        let (best, personal_best) = self
            .personal_best(ruleset, &query, request, &page, epoch)
            .await?;

        let body = render(
            &beatmap,
            &page,
            best.as_deref(),
            request.requester.tier().page_size(),
            variant,
        );
        Ok(RenderedLeaderboard {
            body,
            page_source,
            personal_best,
        })
    }

    fn cache_key(&self, query: &ScoreQuery, scope: LeaderboardScope) -> Option<CacheKey> {
        if !self.config.cache.enabled {
            return None;
        }
        match (scope, &query.filter) {
            (LeaderboardScope::Global, _) => Some(CacheKey::global(query.map_hash.as_str())),
            (LeaderboardScope::ModFiltered, ScoreFilter::Mods(mods)) => {
                Some(CacheKey::mod_filtered(query.map_hash.as_str(), *mods))
            }
            _ => None,
        }
    }

    async fn page_for(
        &self,
        ruleset: RankedRuleset,
        query: &ScoreQuery,
        scope: LeaderboardScope,
        epoch: MapEpoch,
    ) -> Result<(Arc<LeaderboardPage>, PageSource), DomainError> {
        let key = self.cache_key(query, scope);

        if let Some(key) = &key {
            if let Some(page) = self.caches.pages.get(ruleset, key) {
                if page.total_count >= page.rows.len() as u64 {
                    debug!(map_hash = %query.map_hash, %ruleset, cache_hit = true, "page cache hit");
                    return Ok((page, PageSource::Cache));
                }
                error!(
                    map_hash = %query.map_hash,
                    %ruleset,
                    total_count = page.total_count,
                    rows = page.rows.len(),
                    "cached page is inconsistent, bypassing cache"
                );
                self.caches.pages.cache_for(ruleset).remove(key);
            }
        }

        let page = Arc::new(self.fetch_page(query).await?);
        if let Some(key) = key {
            let published = self
                .caches
                .epochs
                .publish_if_current(&query.map_hash, epoch, || {
                    self.caches.pages.put(ruleset, key, Arc::clone(&page))
                });
            if published.is_some() {
                debug!(map_hash = %query.map_hash, %ruleset, cache_hit = false, "page cached");
            } else {
                debug!(
                    map_hash = %query.map_hash,
                    %ruleset,
                    "map invalidated during fetch, page not cached"
                );
            }
        }
        Ok((page, PageSource::Storage))
    }

    /// Capped page query, plus an uncapped count only when the cap was hit.
    async fn fetch_page(&self, query: &ScoreQuery) -> Result<LeaderboardPage, DomainError> {
        let cap = self.config.page_cap;
        let mut rows = self.scores.query_page(query, cap).await?;
        rows.truncate(cap);

        let total = if rows.len() == cap {
            let counted = self.scores.count_matching(query).await?;
            if counted < cap as u64 {
                warn!(
                    map_hash = %query.map_hash,
                    counted,
                    cap,
                    "count query returned fewer rows than the page"
                );
            }
            counted
        } else {
            rows.len() as u64
        };

        Ok(LeaderboardPage::new(rows, total, cap))
    }

    async fn personal_best(
        &self,
        ruleset: RankedRuleset,
        query: &ScoreQuery,
        request: &LeaderboardRequest,
        page: &LeaderboardPage,
        epoch: MapEpoch,
    ) -> Result<(Option<Arc<PersonalBest>>, PersonalBestSource), DomainError> {
        let user_id = request.requester.user_id;
        let indexed = request.scope == LeaderboardScope::Global;

        if indexed {
            if let Some(best) = self
                .caches
                .personal_bests
                .get(ruleset, user_id, &query.map_hash)
            {
                return Ok((Some(best), PersonalBestSource::Indexed));
            }
        }

        if let Some(position) = page.position_of(user_id) {
            let best = Arc::new(PersonalBest {
                rank: position as u64 + 1,
                row: page.rows[position].clone(),
            });
            return Ok((Some(best), PersonalBestSource::InPage));
        }

        if !page.truncated {
            return Ok((None, PersonalBestSource::KnownAbsent));
        }

        let resolved_at_ms = unix_millis();
        let Some(row) = self.scores.query_user_best(query, user_id).await? else {
            return Ok((None, PersonalBestSource::NoScore));
        };

        let slot_ctx = slot_context(request, ruleset, query);
        let from_slot = match self.best_slot.get(user_id, &slot_ctx).await {
            Ok(Some(entry))
                if self
                    .caches
                    .epochs
                    .current(&query.map_hash)
                    .admits(entry.resolved_at_ms) =>
            {
                debug!(user_id, map_hash = %query.map_hash, rank = entry.rank, "personal best rank from slot");
                Some(entry.rank)
            }
            Ok(Some(_)) => {
                debug!(user_id, map_hash = %query.map_hash, "personal best slot predates invalidation");
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!(user_id, error = %err, "personal best slot unavailable");
                None
            }
        };
        let rank = match from_slot {
            Some(rank) => rank,
            None => self.rank_from_storage(query, &row).await?,
        };

        let best = PersonalBest { rank, row };
        let best = if indexed {
            self.caches
                .epochs
                .publish_if_current(&query.map_hash, epoch, || {
                    self.caches
                        .personal_bests
                        .set(ruleset, user_id, &query.map_hash, best.clone())
                })
                .unwrap_or_else(|| Arc::new(best))
        } else {
            Arc::new(best)
        };
        if from_slot.is_none() {
            let entry = SlotEntry {
                rank: best.rank,
                resolved_at_ms,
            };
            self.remember_slot(user_id, entry, &slot_ctx).await;
        }
        Ok((Some(best), PersonalBestSource::Fallback))
    }

    async fn rank_from_storage(
        &self,
        query: &ScoreQuery,
        row: &crate::domain::ScoreRow,
    ) -> Result<u64, DomainError> {
        let above = self
            .scores
            .count_outranking(query, query.order.value_of(row))
            .await?;
        Ok(above + 1)
    }

    async fn remember_slot(&self, user_id: i64, entry: SlotEntry, ctx: &SlotContext) {
        if let Err(err) = self
            .best_slot
            .set(user_id, entry, ctx, self.config.cache.best_slot_ttl)
            .await
        {
            warn!(user_id, error = %err, "failed to store personal best slot");
        }
    }
}

fn score_query(request: &LeaderboardRequest, ruleset: RankedRuleset, status: RankedStatus) -> ScoreQuery {
    let filter = match request.scope {
        LeaderboardScope::Global => ScoreFilter::All,
        LeaderboardScope::ModFiltered => ScoreFilter::Mods(request.mods),
        LeaderboardScope::Friends => ScoreFilter::Friends(request.requester.user_id),
        LeaderboardScope::Country => ScoreFilter::Country(request.requester.country.clone()),
    };
    ScoreQuery {
        map_hash: request.map_hash.clone(),
        ruleset,
        filter,
        order: RankingOrder::for_status(status),
    }
}

fn slot_context(request: &LeaderboardRequest, ruleset: RankedRuleset, query: &ScoreQuery) -> SlotContext {
    SlotContext {
        map_hash: query.map_hash.clone(),
        ruleset: ruleset.to_string(),
        order: query.order,
        country: request.scope == LeaderboardScope::Country,
        friends: request.scope == LeaderboardScope::Friends,
        mods: match query.filter {
            ScoreFilter::Mods(mods) => i64::from(mods),
            _ => -1,
        },
    }
}

fn render(
    beatmap: &BeatmapInfo,
    page: &LeaderboardPage,
    best: Option<&PersonalBest>,
    page_size: usize,
    variant: RulesetVariant,
) -> String {
    let header = wire::beatmap_header(beatmap, page.total_count);
    let best_line = best.map(|best| wire::format_score(&best.row, best.rank, variant));
    let rows = page
        .rows
        .iter()
        .take(page_size)
        .enumerate()
        .map(|(i, row)| wire::format_score(row, i as u64 + 1, variant));
    wire::render_leaderboard(&header, best_line.as_deref(), rows)
}
