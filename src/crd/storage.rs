//! StorageVolume and StoragePool Custom Resource Definitions

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ObjectReference;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind used for cohort references built from a pool's `cohort` field.
pub const COHORT_KIND: &str = "StorageCohort";

const API_VERSION: &str = "scp.openebs.io/v1alpha1";

// =============================================================================
// StorageVolume CRD
// =============================================================================

/// StorageVolume is a volume waiting to be placed on a pool
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "scp.openebs.io",
    version = "v1alpha1",
    kind = "StorageVolume",
    plural = "storagevolumes",
    shortname = "sv",
    status = "StorageVolumeStatus",
    namespaced = true
)]
#[serde(rename_all = "camelCase")]
pub struct StorageVolumeSpec {
    /// Requested capacity in bytes
    pub capacity: u64,

    /// Labels a pool must carry to host this volume
    #[serde(default)]
    pub pool_selector: BTreeMap<String, String>,
}

/// StorageVolume status
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageVolumeStatus {
    /// Pool the volume is bound to
    #[serde(default)]
    pub pool: Option<String>,

    /// Cohort of the bound pool
    #[serde(default)]
    pub cohort: Option<String>,
}

impl StorageVolume {
    /// Name of the volume, or "unknown" for an unnamed object
    pub fn volume_name(&self) -> String {
        self.metadata
            .name
            .clone()
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Namespace/name identity used in log fields
    pub fn key(&self) -> String {
        match self.namespace() {
            Some(ns) => format!("{}/{}", ns, self.name_any()),
            None => self.name_any(),
        }
    }

    /// Whether the volume already records a pool
    pub fn is_bound(&self) -> bool {
        self.status.as_ref().and_then(|s| s.pool.as_ref()).is_some()
    }
}

// =============================================================================
// StoragePool CRD
// =============================================================================

/// StoragePool is a placement target for volumes
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "scp.openebs.io",
    version = "v1alpha1",
    kind = "StoragePool",
    plural = "storagepools",
    shortname = "sp",
    status = "StoragePoolStatus",
    namespaced = false
)]
#[serde(rename_all = "camelCase")]
pub struct StoragePoolSpec {
    /// Node hosting the pool
    #[serde(default)]
    pub node: Option<String>,

    /// Cohort the pool belongs to
    #[serde(default)]
    pub cohort: Option<String>,

    /// Total capacity in bytes
    pub capacity: u64,
}

/// StoragePool status
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoragePoolStatus {
    /// Pool phase
    #[serde(default)]
    pub phase: PoolPhase,

    /// Available capacity in bytes
    #[serde(default)]
    pub available: u64,
}

/// Pool phase
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum PoolPhase {
    #[default]
    Unknown,
    Online,
    Degraded,
    Offline,
}

impl StoragePool {
    /// Get the pool name
    pub fn pool_name(&self) -> String {
        self.name_any()
    }

    /// Get the pool labels
    pub fn pool_labels(&self) -> BTreeMap<String, String> {
        self.metadata.labels.clone().unwrap_or_default()
    }

    /// Reference to this pool
    pub fn pool_ref(&self) -> ObjectReference {
        ObjectReference {
            api_version: Some(API_VERSION.to_string()),
            kind: Some("StoragePool".to_string()),
            name: self.metadata.name.clone(),
            uid: self.metadata.uid.clone(),
            resource_version: self.metadata.resource_version.clone(),
            ..Default::default()
        }
    }

    /// Reference to the cohort this pool belongs to, if any
    pub fn cohort_ref(&self) -> Option<ObjectReference> {
        self.spec.cohort.as_ref().map(|cohort| ObjectReference {
            api_version: Some(API_VERSION.to_string()),
            kind: Some(COHORT_KIND.to_string()),
            name: Some(cohort.clone()),
            ..Default::default()
        })
    }

    /// Check if pool is online
    pub fn is_online(&self) -> bool {
        self.status
            .as_ref()
            .map(|s| s.phase == PoolPhase::Online)
            .unwrap_or(false)
    }
}
