//! Custom Resource Definitions
//!
//! Volume and pool resources the framework schedules. Their contents belong
//! to the surrounding storage system; the framework only reads identities.

mod storage;

pub use storage::{
    PoolPhase, StoragePool, StoragePoolSpec, StoragePoolStatus, StorageVolume,
    StorageVolumeSpec, StorageVolumeStatus, COHORT_KIND,
};
