//! Plugin capability contracts
//!
//! One trait per extension point. A policy implements [`Plugin`] plus any
//! number of the stage traits and is registered once per capability in a
//! [`PluginSet`](super::PluginSet).
//!
//! # Example
//!
//! ```ignore
//! struct CapacityFit;
//!
//! impl Plugin for CapacityFit {
//!     fn name(&self) -> &str { "CapacityFit" }
//! }
//!
//! #[async_trait]
//! impl FilterPlugin for CapacityFit {
//!     async fn filter(&self, _ctx: &SchedulingContext, _state: &CycleState,
//!                     volume: &StorageVolume, pool: &PoolInfo) -> Status {
//!         if pool.available() < volume.spec.capacity {
//!             return Status::unschedulable("insufficient capacity");
//!         }
//!         Status::success()
//!     }
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;

use super::context::SchedulingContext;
use super::cycle_state::CycleState;
use super::status::{PoolScoreList, PoolToStatusMap, Status};
use crate::crd::{StoragePool, StorageVolume};

// =============================================================================
// Value Objects
// =============================================================================

/// A volume already placed on a pool.
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    pub volume: StorageVolume,
}

impl VolumeInfo {
    pub fn new(volume: StorageVolume) -> Self {
        Self { volume }
    }
}

/// A candidate pool and the volumes it already hosts.
#[derive(Debug, Clone)]
pub struct PoolInfo {
    pub pool: StoragePool,
    pub volumes: Vec<VolumeInfo>,
}

impl PoolInfo {
    pub fn new(pool: StoragePool) -> Self {
        Self {
            pool,
            volumes: Vec::new(),
        }
    }

    pub fn with_volumes(pool: StoragePool, volumes: Vec<VolumeInfo>) -> Self {
        Self { pool, volumes }
    }

    pub fn name(&self) -> String {
        self.pool.pool_name()
    }

    /// Available bytes reported by the pool, 0 without a status.
    pub fn available(&self) -> u64 {
        self.pool.status.as_ref().map_or(0, |s| s.available)
    }
}

/// The pool (and its cohort) a volume is scored against or reserved on.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub pool: ObjectReference,
    pub cohort: Option<ObjectReference>,
}

impl Placement {
    pub fn new(pool: ObjectReference, cohort: Option<ObjectReference>) -> Self {
        Self { pool, cohort }
    }

    pub fn for_pool(pool: &StoragePool) -> Self {
        Self {
            pool: pool.pool_ref(),
            cohort: pool.cohort_ref(),
        }
    }

    pub fn pool_name(&self) -> &str {
        self.pool.name.as_deref().unwrap_or("unknown")
    }

    pub fn cohort_name(&self) -> Option<&str> {
        self.cohort.as_ref().and_then(|c| c.name.as_deref())
    }
}

// =============================================================================
// Plugin Traits
// =============================================================================

/// Parent trait of every scheduling plugin.
pub trait Plugin: Send + Sync {
    /// Unique name; used for status attribution and score weights.
    fn name(&self) -> &str;
}

/// Runs once at the beginning of a cycle, before any pool is known.
#[async_trait]
pub trait PreFilterPlugin: Plugin {
    /// Every PreFilter plugin must succeed or the volume is rejected.
    async fn pre_filter(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
    ) -> Status;

    /// Incremental updates of the pre-computed state, if supported.
    fn extensions(&self) -> Option<&dyn PreFilterExtensions> {
        None
    }
}

/// Callbacks that adjust PreFilter state for a hypothetical change to a pool.
///
/// Only called after PreFilter, usually on a cloned [`CycleState`], possibly
/// several times before Filter runs again for a pool.
#[async_trait]
pub trait PreFilterExtensions: Send + Sync {
    /// Evaluate the impact of adding `volume_to_add` to `pool`.
    async fn add_volume(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume_to_schedule: &StorageVolume,
        volume_to_add: &VolumeInfo,
        pool: &PoolInfo,
    ) -> Status;

    /// Evaluate the impact of removing `volume_to_remove` from `pool`.
    async fn remove_volume(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume_to_schedule: &StorageVolume,
        volume_to_remove: &VolumeInfo,
        pool: &PoolInfo,
    ) -> Status;
}

/// Excludes pools that cannot host the volume.
///
/// Should answer Success or Unschedulable; any other code is escalated to
/// an Error for the pool.
#[async_trait]
pub trait FilterPlugin: Plugin {
    async fn filter(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        pool: &PoolInfo,
    ) -> Status;
}

/// Runs only when no pool passed filtering.
#[async_trait]
pub trait PostFilterPlugin: Plugin {
    /// Success (optionally with a nominated pool), Unschedulable, or Error.
    async fn post_filter(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        filtered_pool_statuses: &PoolToStatusMap,
    ) -> (Option<String>, Status);
}

/// Informational hook run with the pools that passed filtering.
#[async_trait]
pub trait PreScorePlugin: Plugin {
    async fn pre_score(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        pools: &[StoragePool],
    ) -> Status;
}

/// Ranks pools that passed filtering.
#[async_trait]
pub trait ScorePlugin: Plugin {
    /// Score one pool. Must succeed or the volume is rejected.
    async fn score(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) -> (i64, Status);

    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        None
    }
}

/// Post-processing of a score plugin's own scores.
#[async_trait]
pub trait ScoreExtensions: Send + Sync {
    /// Rescale `scores` in place; called once with all pools' scores from
    /// the same plugin.
    async fn normalize_score(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        scores: &mut PoolScoreList,
    ) -> Status;
}

/// Provisionally commits a pool to the volume.
#[async_trait]
pub trait ReservePlugin: Plugin {
    /// A failure here makes the framework call `unreserve` on every
    /// reserve plugin.
    async fn reserve(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) -> Status;

    /// Release what `reserve` committed. Must be idempotent and tolerate
    /// being called when `reserve` never ran for this plugin.
    async fn unreserve(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    );
}

/// Approves, delays, or rejects binding.
#[async_trait]
pub trait PermitPlugin: Plugin {
    /// Success, or Wait with a positive duration the framework should wait
    /// before letting the cycle continue. Anything else rejects the volume.
    async fn permit(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) -> (Status, Duration);
}

/// Runs right before binding.
#[async_trait]
pub trait PreBindPlugin: Plugin {
    async fn pre_bind(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) -> Status;
}

/// Binds the volume to the pool.
#[async_trait]
pub trait BindPlugin: Plugin {
    /// Return Skip to let the next bind plugin handle the volume.
    async fn bind(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    ) -> Status;
}

/// Informational hook after a successful bind.
#[async_trait]
pub trait PostBindPlugin: Plugin {
    async fn post_bind(
        &self,
        ctx: &SchedulingContext,
        state: &CycleState,
        volume: &StorageVolume,
        placement: &Placement,
    );
}
