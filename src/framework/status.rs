//! Plugin Result Model
//!
//! Every plugin answers with a [`Status`]. The driver combines the answers of
//! several plugins with [`PluginToStatus::merge`], which keeps the most severe
//! code according to [`Code::precedence`].
//!
//! # Precedence
//!
//! ```text
//! Error (2) > Unschedulable (1) > Wait = Skip (0) > Success (-1)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, Error};

/// Lowest score a score plugin may report for a pool.
pub const MIN_POOL_SCORE: i64 = 0;

/// Highest score a score plugin may report for a pool.
pub const MAX_POOL_SCORE: i64 = 100;

// =============================================================================
// Code
// =============================================================================

/// Outcome category of a plugin run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Code {
    /// The plugin ran correctly and found the volume schedulable.
    #[default]
    Success,
    /// Internal plugin error, unexpected input, etc.
    Error,
    /// The plugin found the volume unschedulable on the evaluated pool.
    Unschedulable,
    /// A permit plugin asks the framework to delay the volume.
    Wait,
    /// A bind plugin declines to bind the volume.
    Skip,
}

impl Code {
    /// Merge precedence; larger wins.
    ///
    /// Wait and Skip share an explicit middle tier: they outrank Success but
    /// never mask a rejection or an error.
    pub fn precedence(self) -> i8 {
        match self {
            Code::Error => 2,
            Code::Unschedulable => 1,
            Code::Wait | Code::Skip => 0,
            Code::Success => -1,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Success => write!(f, "Success"),
            Code::Error => write!(f, "Error"),
            Code::Unschedulable => write!(f, "Unschedulable"),
            Code::Wait => write!(f, "Wait"),
            Code::Skip => write!(f, "Skip"),
        }
    }
}

// =============================================================================
// Status
// =============================================================================

/// Result of running a plugin.
///
/// A success status never carries reasons or a cause. The name of the plugin
/// that produced the status is filled in by the framework.
#[derive(Debug, Clone, Default)]
pub struct Status {
    code: Code,
    reasons: Vec<String>,
    err: Option<BoxError>,
    plugin_name: Option<String>,
}

impl Status {
    /// Create a status with the given code and reasons.
    ///
    /// Reasons given with [`Code::Success`] are dropped. An Error status keeps
    /// its joined reasons as the underlying cause.
    pub fn new<I, S>(code: Code, reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if code == Code::Success {
            return Self::success();
        }
        let reasons: Vec<String> = reasons.into_iter().map(Into::into).collect();
        let err = (code == Code::Error)
            .then(|| Arc::new(Error::Status(reasons.join(", "))) as BoxError);
        Self {
            code,
            reasons,
            err,
            plugin_name: None,
        }
    }

    /// The success status.
    pub fn success() -> Self {
        Self::default()
    }

    /// Unschedulable status with a single reason.
    pub fn unschedulable(reason: impl Into<String>) -> Self {
        Self::new(Code::Unschedulable, [reason.into()])
    }

    /// Error status with a single reason.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::new(Code::Error, [reason.into()])
    }

    /// Wait status with a single reason.
    pub fn wait(reason: impl Into<String>) -> Self {
        Self::new(Code::Wait, [reason.into()])
    }

    /// Skip status with a single reason.
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::new(Code::Skip, [reason.into()])
    }

    /// Wrap an error: Error code, the error's message as sole reason, the
    /// error itself kept as cause.
    pub fn from_error<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = err.into();
        let err: BoxError = Arc::from(boxed);
        Self {
            code: Code::Error,
            reasons: vec![err.to_string()],
            err: Some(err),
            plugin_name: None,
        }
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Reasons joined with `", "`.
    pub fn message(&self) -> String {
        self.reasons.join(", ")
    }

    /// Append a reason. Ignored on a success status.
    pub fn append_reason(&mut self, reason: impl Into<String>) {
        if self.code != Code::Success {
            self.reasons.push(reason.into());
        }
    }

    pub fn plugin_name(&self) -> Option<&str> {
        self.plugin_name.as_deref()
    }

    pub fn set_plugin_name(&mut self, plugin: impl Into<String>) {
        self.plugin_name = Some(plugin.into());
    }

    pub fn with_plugin_name(mut self, plugin: impl Into<String>) -> Self {
        self.set_plugin_name(plugin);
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == Code::Success
    }

    pub fn is_unschedulable(&self) -> bool {
        self.code == Code::Unschedulable
    }

    pub fn is_wait(&self) -> bool {
        self.code == Code::Wait
    }

    pub fn is_skip(&self) -> bool {
        self.code == Code::Skip
    }

    /// `None` for success; otherwise the cause, or a message-bearing error
    /// built from the reasons.
    pub fn as_error(&self) -> Option<BoxError> {
        if self.is_success() {
            return None;
        }
        if let Some(err) = &self.err {
            return Some(Arc::clone(err));
        }
        Some(Arc::new(Error::Status(self.message())))
    }

    /// Underlying cause, if one is recorded.
    pub fn cause(&self) -> Option<&BoxError> {
        self.err.as_ref()
    }
}

impl PartialEq for Status {
    /// Error statuses compare their causes by message, other statuses compare
    /// reasons. The plugin name is not part of equality.
    fn eq(&self, other: &Self) -> bool {
        if self.code != other.code {
            return false;
        }
        if self.code == Code::Error {
            let lhs = self.err.as_ref().map(|e| e.to_string());
            let rhs = other.err.as_ref().map(|e| e.to_string());
            return lhs == rhs;
        }
        self.reasons == other.reasons
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        Status::from_error(err)
    }
}

/// Absent-status semantics: `None` behaves exactly like a success status.
pub trait OptionStatusExt {
    fn code(&self) -> Code;
    fn is_success(&self) -> bool;
    fn message(&self) -> String;
    fn as_error(&self) -> Option<BoxError>;
}

impl OptionStatusExt for Option<Status> {
    fn code(&self) -> Code {
        self.as_ref().map_or(Code::Success, Status::code)
    }

    fn is_success(&self) -> bool {
        self.code() == Code::Success
    }

    fn message(&self) -> String {
        self.as_ref().map(Status::message).unwrap_or_default()
    }

    fn as_error(&self) -> Option<BoxError> {
        self.as_ref().and_then(Status::as_error)
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Plugin name to status, in the order plugins reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginToStatus(Vec<(String, Status)>);

impl PluginToStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a plugin's status. A second insert for the same plugin replaces
    /// the status in place.
    pub fn insert(&mut self, plugin: impl Into<String>, status: Status) {
        let plugin = plugin.into();
        match self.0.iter_mut().find(|(name, _)| *name == plugin) {
            Some(entry) => entry.1 = status,
            None => self.0.push((plugin, status)),
        }
    }

    pub fn get(&self, plugin: &str) -> Option<&Status> {
        self.0
            .iter()
            .find(|(name, _)| name == plugin)
            .map(|(_, status)| status)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Status)> {
        self.0.iter().map(|(name, status)| (name.as_str(), status))
    }

    /// Combine all statuses into one.
    ///
    /// The result carries the highest-precedence code seen, the name of the
    /// first plugin that reported it, every reason in encounter order, and the
    /// cause of the last Error member. Returns `None` when empty.
    pub fn merge(&self) -> Option<Status> {
        if self.0.is_empty() {
            return None;
        }

        let mut code = Code::Success;
        let mut plugin_name = None;
        let mut reasons = Vec::new();
        let mut err = None;

        for (name, status) in &self.0 {
            if status.code() == Code::Error {
                err = status.as_error();
            }
            if status.code().precedence() > code.precedence() {
                code = status.code();
                plugin_name = Some(status.plugin_name().unwrap_or(name).to_string());
            }
            reasons.extend(status.reasons().iter().cloned());
        }

        if code == Code::Success {
            return Some(Status::success());
        }
        Some(Status {
            code,
            reasons,
            err: if code == Code::Error { err } else { None },
            plugin_name,
        })
    }
}

impl FromIterator<(String, Status)> for PluginToStatus {
    fn from_iter<T: IntoIterator<Item = (String, Status)>>(iter: T) -> Self {
        let mut map = PluginToStatus::new();
        for (plugin, status) in iter {
            map.insert(plugin, status);
        }
        map
    }
}

/// Pool name to status for pools rejected during filtering.
pub type PoolToStatusMap = BTreeMap<String, Status>;

/// Score of one pool from one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolScore {
    pub name: String,
    pub score: i64,
}

/// Scores of one plugin, in candidate order.
pub type PoolScoreList = Vec<PoolScore>;

/// Plugin name to its score list.
pub type PluginToPoolScores = BTreeMap<String, PoolScoreList>;
