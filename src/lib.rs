//! Volume Scheduler - Extension-Point Scheduling Framework
//!
//! Decides which storage pool (and cohort) should host a volume by running
//! ordered sets of independent plugins through fixed extension points.
//!
//! # Architecture
//!
//! ```text
//! PreFilter → Filter → PostFilter → PreScore → Score
//!     → Reserve → Permit → PreBind → Bind → PostBind
//!          ↑___________ Unreserve on failure ___|
//! ```
//!
//! The outer control loop creates a [`SchedulingContext`] per attempt,
//! calls the framework (stage by stage, or [`Framework::run_cycle`]) and
//! persists the binding once Bind succeeds.
//!
//! # Modules
//!
//! - [`config`] - Framework configuration and CLI flags
//! - [`crd`] - StorageVolume and StoragePool resources
//! - [`error`] - Error types
//! - [`framework`] - Cycle state, statuses, plugin contracts, and the driver
//! - [`telemetry`] - Logging setup

pub mod config;
pub mod crd;
pub mod error;
pub mod framework;
pub mod telemetry;

// Re-export commonly used types
pub use config::{FrameworkArgs, FrameworkConfig};
pub use crd::{StoragePool, StorageVolume};
pub use error::{Error, Result};
pub use framework::{
    Capability, Code, CycleOutcome, CycleState, Framework, Placement, PluginSet, PoolInfo,
    SchedulingContext, Status,
};
