//! Framework Driver
//!
//! Runs the registered plugins of each extension point and turns their
//! statuses into one stage result.
//!
//! # Stage contracts
//!
//! | Stage | Stops on | Result on failure |
//! |---|---|---|
//! | PreFilter | first non-Success | Unschedulable as-is, anything else Error |
//! | Filter | first non-Success, non-Unschedulable | per-plugin diagnostics |
//! | PostFilter | first Success or Error | merged Unschedulable |
//! | PreScore, Score | first non-Success | Error |
//! | Reserve, Permit, PreBind | first non-Success | Error, after Unreserve |
//! | Bind | first non-Skip | Error, after Unreserve |
//! | PostBind | never | none |

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, warn};

use super::context::SchedulingContext;
use super::cycle_state::CycleState;
use super::interface::{Placement, PoolInfo, VolumeInfo};
use super::registry::{ExtensionPoint, PluginSet};
use super::status::{
    Code, PluginToPoolScores, PluginToStatus, PoolScore, PoolScoreList, PoolToStatusMap, Status,
    MAX_POOL_SCORE, MIN_POOL_SCORE,
};
use crate::config::FrameworkConfig;
use crate::crd::{StoragePool, StorageVolume};
use crate::error::{BoxError, Error, Result};

/// Pools that passed filtering and the statuses of those that did not.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Feasible pools, in input order
    pub feasible: Vec<PoolInfo>,
    /// Merged status of every rejected pool
    pub pool_statuses: PoolToStatusMap,
}

/// The scheduling framework: ordered plugins per extension point plus the
/// rules for combining their results.
///
/// Immutable after construction; share it between concurrent cycles with an
/// `Arc`.
#[derive(Debug)]
pub struct Framework {
    config: FrameworkConfig,
    plugins: PluginSet,
}

impl Framework {
    /// Build a framework from a validated configuration and plugin set.
    pub fn new(config: FrameworkConfig, plugins: PluginSet) -> Result<Self> {
        config.validate()?;
        plugins.validate()?;

        let score_plugins = plugins.names(ExtensionPoint::Score);
        for plugin in config.score_weights.keys() {
            if !score_plugins.contains(plugin) {
                warn!(plugin = %plugin, "Score weight configured for unregistered plugin");
            }
        }

        Ok(Self { config, plugins })
    }

    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    /// Registered plugin names at `point`, in execution order.
    pub fn plugin_names(&self, point: ExtensionPoint) -> Vec<String> {
        self.plugins.names(point)
    }

    pub fn has_filter_plugins(&self) -> bool {
        !self.plugins.filter.is_empty()
    }

    pub fn has_post_filter_plugins(&self) -> bool {
        !self.plugins.post_filter.is_empty()
    }

    pub fn has_score_plugins(&self) -> bool {
        !self.plugins.score.is_empty()
    }

    // =========================================================================
    // PreFilter
    // =========================================================================

    /// Run every PreFilter plugin in order. The first non-success aborts the
    /// cycle: Unschedulable is returned as-is, anything else becomes an Error.
    pub async fn run_pre_filter_plugins(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
    ) -> Status {
        for pl in &self.plugins.pre_filter {
            if let Err(e) = ctx.check() {
                return context_failure(ExtensionPoint::PreFilter, pl.name(), e);
            }
            let status = pl.pre_filter(ctx, state, volume).await;
            if !status.is_success() {
                let status = status.with_plugin_name(pl.name());
                if status.is_unschedulable() {
                    return status;
                }
                return plugin_failure(ExtensionPoint::PreFilter, pl.name(), &status);
            }
        }
        Status::success()
    }

    /// Run `add_volume` of every PreFilter plugin that has extensions.
    pub async fn run_pre_filter_extension_add_volume(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume_to_schedule: &StorageVolume,
        volume_to_add: &VolumeInfo,
        pool: &PoolInfo,
    ) -> Status {
        for pl in &self.plugins.pre_filter {
            let Some(extensions) = pl.extensions() else {
                continue;
            };
            if let Err(e) = ctx.check() {
                return context_failure(ExtensionPoint::PreFilter, pl.name(), e);
            }
            let status = extensions
                .add_volume(ctx, state, volume_to_schedule, volume_to_add, pool)
                .await;
            if !status.is_success() {
                return plugin_failure(ExtensionPoint::PreFilter, pl.name(), &status);
            }
        }
        Status::success()
    }

    /// Run `remove_volume` of every PreFilter plugin that has extensions.
    pub async fn run_pre_filter_extension_remove_volume(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume_to_schedule: &StorageVolume,
        volume_to_remove: &VolumeInfo,
        pool: &PoolInfo,
    ) -> Status {
        for pl in &self.plugins.pre_filter {
            let Some(extensions) = pl.extensions() else {
                continue;
            };
            if let Err(e) = ctx.check() {
                return context_failure(ExtensionPoint::PreFilter, pl.name(), e);
            }
            let status = extensions
                .remove_volume(ctx, state, volume_to_schedule, volume_to_remove, pool)
                .await;
            if !status.is_success() {
                return plugin_failure(ExtensionPoint::PreFilter, pl.name(), &status);
            }
        }
        Status::success()
    }

    // =========================================================================
    // Filter
    // =========================================================================

    /// Run the Filter plugins for one pool.
    ///
    /// Unschedulable answers are collected and the remaining filters still
    /// run. Any other failure replaces the collected statuses with a single
    /// Error entry and stops. An empty result means the pool fits.
    pub async fn run_filter_plugins(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        pool: &PoolInfo,
    ) -> PluginToStatus {
        let mut statuses = PluginToStatus::new();
        for pl in &self.plugins.filter {
            if let Err(e) = ctx.check() {
                return single(pl.name(), context_failure(ExtensionPoint::Filter, pl.name(), e));
            }
            let status = pl.filter(ctx, state, volume, pool).await;
            if status.is_success() {
                continue;
            }
            if !status.is_unschedulable() {
                let failure = plugin_failure(ExtensionPoint::Filter, pl.name(), &status);
                return single(pl.name(), failure);
            }
            statuses.insert(pl.name(), status.with_plugin_name(pl.name()));
        }
        statuses
    }

    /// Run Filter against every pool, up to `parallelism` pools at a time.
    ///
    /// A pool whose filters escalated to Error cancels the remaining pools and
    /// the Error is returned. When several pools fail, the one reported is
    /// the first to complete; feasible pools and rejection statuses of a
    /// successful run do not depend on completion order.
    pub async fn run_filter_plugins_for_pools(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        pools: &[PoolInfo],
    ) -> std::result::Result<FilterOutcome, Status> {
        let ctx = ctx.child();
        let mut per_pool: Vec<Option<PluginToStatus>> = vec![None; pools.len()];

        {
            let ctx = &ctx;
            let mut results = stream::iter(0..pools.len())
                .map(|i| {
                    let pool = &pools[i];
                    async move { (i, self.run_filter_plugins(ctx, state, volume, pool).await) }
                })
                .buffer_unordered(self.config.parallelism);

            while let Some((i, statuses)) = results.next().await {
                if let Some(merged) = statuses.merge() {
                    if merged.code() == Code::Error {
                        ctx.cancel();
                        return Err(merged);
                    }
                }
                per_pool[i] = Some(statuses);
            }
        }

        let mut outcome = FilterOutcome::default();
        for (pool, statuses) in pools.iter().zip(per_pool) {
            match statuses.and_then(|s| s.merge()) {
                Some(merged) => {
                    debug!(pool = %pool.name(), reason = %merged, "Pool filtered out");
                    outcome.pool_statuses.insert(pool.name(), merged);
                }
                None => outcome.feasible.push(pool.clone()),
            }
        }
        Ok(outcome)
    }

    // =========================================================================
    // PostFilter
    // =========================================================================

    /// Run PostFilter plugins until one returns Success or Error.
    ///
    /// Returns the nominated pool (if any) with Success, the Error, or the
    /// merged Unschedulable statuses when no plugin could help.
    pub async fn run_post_filter_plugins(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        filtered_pool_statuses: &PoolToStatusMap,
    ) -> (Option<String>, Status) {
        let mut statuses = PluginToStatus::new();
        for pl in &self.plugins.post_filter {
            if let Err(e) = ctx.check() {
                return (None, context_failure(ExtensionPoint::PostFilter, pl.name(), e));
            }
            let (pool, status) = pl
                .post_filter(ctx, state, volume, filtered_pool_statuses)
                .await;
            if status.is_success() {
                return (pool, status.with_plugin_name(pl.name()));
            }
            if !status.is_unschedulable() {
                return (
                    None,
                    plugin_failure(ExtensionPoint::PostFilter, pl.name(), &status),
                );
            }
            statuses.insert(pl.name(), status.with_plugin_name(pl.name()));
        }

        let status = statuses.merge().unwrap_or_else(|| {
            Status::unschedulable("no PostFilter plugin could make the volume schedulable")
        });
        (None, status)
    }

    // =========================================================================
    // PreScore / Score
    // =========================================================================

    /// Run PreScore plugins in order; the first non-success is an Error.
    pub async fn run_pre_score_plugins(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        pools: &[StoragePool],
    ) -> Status {
        for pl in &self.plugins.pre_score {
            if let Err(e) = ctx.check() {
                return context_failure(ExtensionPoint::PreScore, pl.name(), e);
            }
            let status = pl.pre_score(ctx, state, volume, pools).await;
            if !status.is_success() {
                return plugin_failure(ExtensionPoint::PreScore, pl.name(), &status);
            }
        }
        Status::success()
    }

    /// Score every placement with every Score plugin.
    ///
    /// Pools are scored up to `parallelism` at a time; the first failure to
    /// complete is returned and cancels the rest. Each plugin's list is then
    /// normalized (if the plugin supports it), range-checked against
    /// [`MIN_POOL_SCORE`]..=[`MAX_POOL_SCORE`] and multiplied by the plugin's
    /// configured weight. Lists follow the order of `placements`; a
    /// normalizer that drops, adds or reorders entries fails the stage.
    pub async fn run_score_plugins(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placements: &[Placement],
    ) -> std::result::Result<PluginToPoolScores, Status> {
        let ctx = ctx.child();
        let mut rows: Vec<Option<Vec<i64>>> = vec![None; placements.len()];

        {
            let ctx = &ctx;
            let mut results = stream::iter(0..placements.len())
                .map(|i| {
                    let placement = &placements[i];
                    async move { (i, self.score_placement(ctx, state, volume, placement).await) }
                })
                .buffer_unordered(self.config.parallelism);

            while let Some((i, row)) = results.next().await {
                match row {
                    Ok(row) => rows[i] = Some(row),
                    Err(status) => {
                        ctx.cancel();
                        return Err(status);
                    }
                }
            }
        }

        let rows: Vec<Vec<i64>> = rows.into_iter().flatten().collect();
        let mut scores = PluginToPoolScores::new();

        for (index, pl) in self.plugins.score.iter().enumerate() {
            let mut list: PoolScoreList = placements
                .iter()
                .zip(&rows)
                .map(|(placement, row)| PoolScore {
                    name: placement.pool_name().to_string(),
                    score: row[index],
                })
                .collect();

            if let Some(extensions) = pl.score_extensions() {
                if let Err(e) = ctx.check() {
                    return Err(context_failure(ExtensionPoint::Score, pl.name(), e));
                }
                let status = extensions
                    .normalize_score(&ctx, state, volume, &mut list)
                    .await;
                if !status.is_success() {
                    return Err(plugin_failure(ExtensionPoint::Score, pl.name(), &status));
                }
                if !covers_placements(placements, &list) {
                    let err = Error::ScoreListMismatch {
                        plugin: pl.name().to_string(),
                    };
                    return Err(Status::from_error(err).with_plugin_name(pl.name()));
                }
            }

            let weight = self.config.score_weight(pl.name());
            for pool_score in list.iter_mut() {
                if !(MIN_POOL_SCORE..=MAX_POOL_SCORE).contains(&pool_score.score) {
                    let err = Error::InvalidScore {
                        plugin: pl.name().to_string(),
                        pool: pool_score.name.clone(),
                        score: pool_score.score,
                        min: MIN_POOL_SCORE,
                        max: MAX_POOL_SCORE,
                    };
                    return Err(Status::from_error(err).with_plugin_name(pl.name()));
                }
                pool_score.score = pool_score.score.saturating_mul(weight);
            }

            scores.insert(pl.name().to_string(), list);
        }

        Ok(scores)
    }

    /// Raw scores of every Score plugin for one placement, in plugin order.
    async fn score_placement(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) -> std::result::Result<Vec<i64>, Status> {
        let mut row = Vec::with_capacity(self.plugins.score.len());
        for pl in &self.plugins.score {
            if let Err(e) = ctx.check() {
                return Err(context_failure(ExtensionPoint::Score, pl.name(), e));
            }
            let (score, status) = pl.score(ctx, state, volume, placement).await;
            if !status.is_success() {
                return Err(plugin_failure(ExtensionPoint::Score, pl.name(), &status));
            }
            row.push(score);
        }
        Ok(row)
    }

    // =========================================================================
    // Reserve / Unreserve
    // =========================================================================

    /// Run Reserve plugins in order. On the first failure every reserve
    /// plugin is unreserved before the Error is returned.
    pub async fn run_reserve_plugins_reserve(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) -> Status {
        for pl in &self.plugins.reserve {
            let status = match ctx.check() {
                Ok(()) => pl.reserve(ctx, state, volume, placement).await,
                Err(e) => Status::from_error(e),
            };
            if !status.is_success() {
                let failure = plugin_failure(ExtensionPoint::Reserve, pl.name(), &status);
                error!(
                    error = %failure,
                    plugin = %pl.name(),
                    volume = %volume.key(),
                    "Failed running Reserve plugin"
                );
                self.run_reserve_plugins_unreserve(ctx, state, volume, placement)
                    .await;
                return failure;
            }
        }
        Status::success()
    }

    /// Run Unreserve on every reserve plugin in reverse registration order.
    ///
    /// Runs even when the context is already done; plugins must be
    /// idempotent.
    pub async fn run_reserve_plugins_unreserve(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) {
        for pl in self.plugins.reserve.iter().rev() {
            debug!(plugin = %pl.name(), volume = %volume.key(), "Running Unreserve plugin");
            pl.unreserve(ctx, state, volume, placement).await;
        }
    }

    // =========================================================================
    // Permit
    // =========================================================================

    /// Run every Permit plugin, then wait for the longest requested delay.
    ///
    /// Requested waits are clamped to `max_permit_wait`. Rejection, a Wait
    /// without a duration, or the context finishing during the wait fails the
    /// stage and unreserves the volume.
    pub async fn run_permit_plugins(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) -> Status {
        let mut longest: Option<(&str, Duration)> = None;

        for pl in &self.plugins.permit {
            if let Err(e) = ctx.check() {
                let failure = context_failure(ExtensionPoint::Permit, pl.name(), e);
                return self.permit_rejected(ctx, state, volume, placement, failure).await;
            }
            let (status, wait) = pl.permit(ctx, state, volume, placement).await;
            match status.code() {
                Code::Success => {}
                Code::Wait if !wait.is_zero() => {
                    let wait = wait.min(self.config.max_permit_wait);
                    debug!(plugin = %pl.name(), wait = ?wait, "Permit plugin requested wait");
                    if longest.map_or(true, |(_, current)| wait > current) {
                        longest = Some((pl.name(), wait));
                    }
                }
                Code::Wait => {
                    let err = Error::InvalidPermitWait {
                        plugin: pl.name().to_string(),
                    };
                    let failure = plugin_failure(ExtensionPoint::Permit, pl.name(), &err.into());
                    return self.permit_rejected(ctx, state, volume, placement, failure).await;
                }
                _ => {
                    let failure = plugin_failure(ExtensionPoint::Permit, pl.name(), &status);
                    return self.permit_rejected(ctx, state, volume, placement, failure).await;
                }
            }
        }

        if let Some((plugin, wait)) = longest {
            debug!(plugin = %plugin, wait = ?wait, volume = %volume.key(), "Waiting on permit");
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                err = ctx.done() => {
                    let failure = context_failure(ExtensionPoint::Permit, plugin, err);
                    return self.permit_rejected(ctx, state, volume, placement, failure).await;
                }
            }
        }

        Status::success()
    }

    async fn permit_rejected(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
        failure: Status,
    ) -> Status {
        error!(
            error = %failure,
            plugin = failure.plugin_name().unwrap_or_default(),
            volume = %volume.key(),
            "Volume rejected at Permit"
        );
        self.run_reserve_plugins_unreserve(ctx, state, volume, placement)
            .await;
        failure
    }

    // =========================================================================
    // PreBind / Bind / PostBind
    // =========================================================================

    /// Run PreBind plugins in order. The first failure unreserves the volume
    /// and is returned as an Error.
    pub async fn run_pre_bind_plugins(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) -> Status {
        for pl in &self.plugins.pre_bind {
            let status = match ctx.check() {
                Ok(()) => pl.pre_bind(ctx, state, volume, placement).await,
                Err(e) => Status::from_error(e),
            };
            if !status.is_success() {
                let failure = plugin_failure(ExtensionPoint::PreBind, pl.name(), &status);
                error!(
                    error = %failure,
                    plugin = %pl.name(),
                    volume = %volume.key(),
                    "Failed running PreBind plugin"
                );
                self.run_reserve_plugins_unreserve(ctx, state, volume, placement)
                    .await;
                return failure;
            }
        }
        Status::success()
    }

    /// Run Bind plugins until one returns something other than Skip.
    ///
    /// Success is returned as-is; any other code unreserves the volume and is
    /// returned as an Error. Skip from every plugin, or no bind plugins at
    /// all, yields Skip.
    pub async fn run_bind_plugins(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) -> Status {
        let mut last = Status::skip("no bind plugin bound the volume");
        for pl in &self.plugins.bind {
            let status = match ctx.check() {
                Ok(()) => pl.bind(ctx, state, volume, placement).await,
                Err(e) => Status::from_error(e),
            };
            if status.is_skip() {
                last = status.with_plugin_name(pl.name());
                continue;
            }
            if !status.is_success() {
                let failure = plugin_failure(ExtensionPoint::Bind, pl.name(), &status);
                error!(
                    error = %failure,
                    plugin = %pl.name(),
                    volume = %volume.key(),
                    "Failed running Bind plugin"
                );
                self.run_reserve_plugins_unreserve(ctx, state, volume, placement)
                    .await;
                return failure;
            }
            return status.with_plugin_name(pl.name());
        }
        last
    }

    /// Run every PostBind plugin in order.
    pub async fn run_post_bind_plugins(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) {
        for pl in &self.plugins.post_bind {
            pl.post_bind(ctx, state, volume, placement).await;
        }
    }
}

// =============================================================================
// Pool Selection
// =============================================================================

/// Sum of every plugin's (weighted) score per placement, in placement order.
///
/// Entries are matched to placements by pool name; a plugin without an
/// entry for a pool contributes nothing to it.
pub fn total_scores(placements: &[Placement], scores: &PluginToPoolScores) -> PoolScoreList {
    placements
        .iter()
        .enumerate()
        .map(|(i, placement)| {
            let name = placement.pool_name();
            let score = scores
                .values()
                .filter_map(|list| match list.get(i) {
                    Some(entry) if entry.name == name => Some(entry),
                    _ => list.iter().find(|entry| entry.name == name),
                })
                .fold(0i64, |sum, s| sum.saturating_add(s.score));
            PoolScore {
                name: name.to_string(),
                score,
            }
        })
        .collect()
}

/// Highest-scoring placement; ties go to the earliest placement.
pub fn select_pool<'a>(
    placements: &'a [Placement],
    scores: &PluginToPoolScores,
) -> Option<&'a Placement> {
    let totals = total_scores(placements, scores);
    let mut best: Option<(usize, i64)> = None;
    for (i, total) in totals.iter().enumerate() {
        if best.map_or(true, |(_, score)| total.score > score) {
            best = Some((i, total.score));
        }
    }
    best.map(|(i, _)| &placements[i])
}

// =============================================================================
// Helpers
// =============================================================================

fn cause_of(status: &Status) -> BoxError {
    status
        .as_error()
        .unwrap_or_else(|| Arc::new(Error::Status(status.message())))
}

/// Error status attributed to `plugin`, wrapping the cause of `status`.
fn plugin_failure(point: ExtensionPoint, plugin: &str, status: &Status) -> Status {
    let err = Error::PluginFailed {
        point,
        plugin: plugin.to_string(),
        source: cause_of(status),
    };
    Status::from_error(err).with_plugin_name(plugin)
}

fn context_failure(point: ExtensionPoint, plugin: &str, err: Error) -> Status {
    plugin_failure(point, plugin, &Status::from_error(err))
}

/// Whether `list` still names exactly the pools of `placements`, in order.
fn covers_placements(placements: &[Placement], list: &PoolScoreList) -> bool {
    list.len() == placements.len()
        && placements
            .iter()
            .zip(list)
            .all(|(placement, entry)| placement.pool_name() == entry.name)
}

fn single(plugin: &str, status: Status) -> PluginToStatus {
    let mut statuses = PluginToStatus::new();
    statuses.insert(plugin, status);
    statuses
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::ObjectReference;

    fn placement(name: &str) -> Placement {
        Placement::new(
            ObjectReference {
                name: Some(name.to_string()),
                ..Default::default()
            },
            None,
        )
    }

    fn list(scores: &[(&str, i64)]) -> PoolScoreList {
        scores
            .iter()
            .map(|(name, score)| PoolScore {
                name: name.to_string(),
                score: *score,
            })
            .collect()
    }

    #[test]
    fn test_select_pool_sums_plugins() {
        let placements = vec![placement("a"), placement("b"), placement("c")];
        let mut scores = PluginToPoolScores::new();
        scores.insert("capacity".into(), list(&[("a", 10), ("b", 50), ("c", 30)]));
        scores.insert("spread".into(), list(&[("a", 60), ("b", 0), ("c", 30)]));

        let totals = total_scores(&placements, &scores);
        assert_eq!(totals, list(&[("a", 70), ("b", 50), ("c", 60)]));
        assert_eq!(select_pool(&placements, &scores).unwrap().pool_name(), "a");
    }

    #[test]
    fn test_select_pool_ties_prefer_first() {
        let placements = vec![placement("a"), placement("b")];
        let mut scores = PluginToPoolScores::new();
        scores.insert("capacity".into(), list(&[("a", 40), ("b", 40)]));
        assert_eq!(select_pool(&placements, &scores).unwrap().pool_name(), "a");

        let no_plugins = PluginToPoolScores::new();
        assert_eq!(
            select_pool(&placements, &no_plugins).unwrap().pool_name(),
            "a"
        );
    }

    #[test]
    fn test_totals_match_entries_by_pool_name() {
        let placements = vec![placement("a"), placement("b")];
        let mut scores = PluginToPoolScores::new();
        scores.insert("sorted".into(), list(&[("b", 90), ("a", 10)]));
        scores.insert("capacity".into(), list(&[("a", 5), ("b", 5)]));

        let totals = total_scores(&placements, &scores);
        assert_eq!(totals, list(&[("a", 15), ("b", 95)]));
        assert_eq!(select_pool(&placements, &scores).unwrap().pool_name(), "b");
    }

    #[test]
    fn test_covers_placements() {
        let placements = vec![placement("a"), placement("b")];
        assert!(covers_placements(&placements, &list(&[("a", 1), ("b", 2)])));
        assert!(!covers_placements(&placements, &list(&[("b", 2), ("a", 1)])));
        assert!(!covers_placements(&placements, &list(&[("a", 1)])));
    }

    #[test]
    fn test_select_pool_empty() {
        assert!(select_pool(&[], &PluginToPoolScores::new()).is_none());
    }

    #[test]
    fn test_plugin_failure_wraps_cause() {
        let status = plugin_failure(
            ExtensionPoint::PreBind,
            "attach",
            &Status::unschedulable("node down"),
        );
        assert_eq!(status.code(), Code::Error);
        assert_eq!(status.plugin_name(), Some("attach"));
        assert_eq!(
            status.message(),
            "running PreBind plugin \"attach\": node down"
        );
    }
}
