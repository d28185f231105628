//! One complete scheduling cycle
//!
//! [`Framework::run_cycle`] drives a volume through every extension point in
//! order, on a fresh [`CycleState`]:
//!
//! ```text
//! PreFilter → Filter → (PostFilter) → PreScore → Score → Reserve
//!     → Permit → PreBind → Bind → PostBind
//! ```
//!
//! Failures from Reserve onward have already been rolled back by the stage
//! that produced them when the outcome is returned.

use tracing::{debug, info, instrument};

use super::context::SchedulingContext;
use super::cycle_state::CycleState;
use super::interface::{Placement, PoolInfo};
use super::runtime::{select_pool, Framework};
use super::status::{Code, PluginToPoolScores, PoolToStatusMap, Status};
use crate::crd::{StoragePool, StorageVolume};

/// Result of [`Framework::run_cycle`].
#[derive(Debug, Clone, Default)]
pub struct CycleOutcome {
    /// Final status of the cycle; Success only after a successful bind
    pub status: Status,
    /// Chosen placement, once scoring picked one
    pub placement: Option<Placement>,
    /// Statuses of pools rejected by Filter
    pub pool_statuses: PoolToStatusMap,
    /// Weighted scores per plugin
    pub scores: PluginToPoolScores,
}

impl CycleOutcome {
    /// Whether the volume was bound and the binding should be persisted.
    pub fn is_bound(&self) -> bool {
        self.status.is_success() && self.placement.is_some()
    }

    fn finish(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

impl Framework {
    /// Run a full scheduling cycle for `volume` against `pools`.
    #[instrument(skip_all, fields(volume = %volume.key(), pools = pools.len()))]
    pub async fn run_cycle(
        &self,
        ctx: &SchedulingContext,
        volume: &StorageVolume,
        pools: &[PoolInfo],
    ) -> CycleOutcome {
        let state = CycleState::new();
        let mut outcome = CycleOutcome::default();

        let status = self.run_pre_filter_plugins(ctx, &state, volume).await;
        if !status.is_success() {
            return outcome.finish(status);
        }

        let filtered = match self
            .run_filter_plugins_for_pools(ctx, &state, volume, pools)
            .await
        {
            Ok(filtered) => filtered,
            Err(status) => return outcome.finish(status),
        };
        outcome.pool_statuses = filtered.pool_statuses;
        let mut feasible = filtered.feasible;

        if feasible.is_empty() {
            let (nominated, status) = self
                .run_post_filter_plugins(ctx, &state, volume, &outcome.pool_statuses)
                .await;
            let nominated_pool = nominated
                .filter(|_| status.is_success())
                .and_then(|name| pools.iter().find(|p| p.name() == name));
            match nominated_pool {
                Some(pool) => {
                    debug!(pool = %pool.name(), "PostFilter nominated pool");
                    feasible.push(pool.clone());
                }
                None => {
                    let status = unschedulable_summary(pools.len(), status);
                    return outcome.finish(status);
                }
            }
        }

        let feasible_pools: Vec<StoragePool> = feasible.iter().map(|p| p.pool.clone()).collect();
        let status = self
            .run_pre_score_plugins(ctx, &state, volume, &feasible_pools)
            .await;
        if !status.is_success() {
            return outcome.finish(status);
        }

        let placements: Vec<Placement> = feasible
            .iter()
            .map(|p| Placement::for_pool(&p.pool))
            .collect();
        outcome.scores = match self
            .run_score_plugins(ctx, &state, volume, &placements)
            .await
        {
            Ok(scores) => scores,
            Err(status) => return outcome.finish(status),
        };

        let Some(placement) = select_pool(&placements, &outcome.scores).cloned() else {
            return outcome.finish(Status::unschedulable("no pool left after scoring"));
        };
        debug!(pool = %placement.pool_name(), "Selected pool");
        outcome.placement = Some(placement.clone());

        let status = self
            .run_reserve_plugins_reserve(ctx, &state, volume, &placement)
            .await;
        if !status.is_success() {
            return outcome.finish(status);
        }

        let status = self
            .run_permit_plugins(ctx, &state, volume, &placement)
            .await;
        if !status.is_success() {
            return outcome.finish(status);
        }

        let status = self
            .run_pre_bind_plugins(ctx, &state, volume, &placement)
            .await;
        if !status.is_success() {
            return outcome.finish(status);
        }

        let status = self.run_bind_plugins(ctx, &state, volume, &placement).await;
        if status.is_skip() {
            self.run_reserve_plugins_unreserve(ctx, &state, volume, &placement)
                .await;
            return outcome.finish(status);
        }
        if !status.is_success() {
            return outcome.finish(status);
        }

        self.run_post_bind_plugins(ctx, &state, volume, &placement)
            .await;

        info!(
            pool = %placement.pool_name(),
            cohort = placement.cohort_name().unwrap_or_default(),
            "Volume bound"
        );
        outcome.finish(Status::success())
    }
}

/// Unschedulable status for a cycle where no pool survived filtering.
fn unschedulable_summary(total: usize, post_filter: Status) -> Status {
    if post_filter.code() == Code::Error {
        return post_filter;
    }
    let mut reasons = vec![format!("0/{} pools are available", total)];
    reasons.extend(post_filter.reasons().iter().cloned());
    let status = Status::new(Code::Unschedulable, reasons);
    match post_filter.plugin_name() {
        Some(plugin) => status.with_plugin_name(plugin),
        None => status,
    }
}
