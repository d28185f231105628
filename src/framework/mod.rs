//! Scheduling Framework
//!
//! Extension points, plugin contracts, and the driver that runs them.
//!
//! ```text
//! CycleState + Status ─▶ plugin traits ─▶ PluginSet ─▶ Framework ─▶ run_cycle
//! ```

mod context;
mod cycle;
mod cycle_state;
mod interface;
mod registry;
mod runtime;
mod status;

pub use context::SchedulingContext;
pub use cycle::CycleOutcome;
pub use cycle_state::{AsAny, CycleState, StateData, StateKey};
pub use interface::{
    BindPlugin, FilterPlugin, PermitPlugin, Placement, Plugin, PoolInfo, PostBindPlugin,
    PostFilterPlugin, PreBindPlugin, PreFilterExtensions, PreFilterPlugin, PreScorePlugin,
    ReservePlugin, ScoreExtensions, ScorePlugin, VolumeInfo,
};
pub use registry::{Capability, ExtensionPoint, PluginSet};
pub use runtime::{select_pool, total_scores, FilterOutcome, Framework};
pub use status::{
    Code, OptionStatusExt, PluginToPoolScores, PluginToStatus, PoolScore, PoolScoreList,
    PoolToStatusMap, Status, MAX_POOL_SCORE, MIN_POOL_SCORE,
};
