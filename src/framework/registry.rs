//! Extension points and plugin registration
//!
//! A [`PluginSet`] is assembled once at startup and handed to
//! [`Framework::new`](super::Framework::new). It is never mutated after that.

use std::fmt;
use std::sync::Arc;

use super::interface::{
    BindPlugin, FilterPlugin, PermitPlugin, PostBindPlugin, PostFilterPlugin, PreBindPlugin,
    PreFilterPlugin, PreScorePlugin, ReservePlugin, ScorePlugin,
};
use crate::error::{Error, Result};

/// Named stage of a scheduling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtensionPoint {
    PreFilter,
    Filter,
    PostFilter,
    PreScore,
    Score,
    Reserve,
    Permit,
    PreBind,
    Bind,
    PostBind,
}

impl ExtensionPoint {
    /// All extension points in cycle order.
    pub const ALL: [ExtensionPoint; 10] = [
        ExtensionPoint::PreFilter,
        ExtensionPoint::Filter,
        ExtensionPoint::PostFilter,
        ExtensionPoint::PreScore,
        ExtensionPoint::Score,
        ExtensionPoint::Reserve,
        ExtensionPoint::Permit,
        ExtensionPoint::PreBind,
        ExtensionPoint::Bind,
        ExtensionPoint::PostBind,
    ];
}

impl fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtensionPoint::PreFilter => "PreFilter",
            ExtensionPoint::Filter => "Filter",
            ExtensionPoint::PostFilter => "PostFilter",
            ExtensionPoint::PreScore => "PreScore",
            ExtensionPoint::Score => "Score",
            ExtensionPoint::Reserve => "Reserve",
            ExtensionPoint::Permit => "Permit",
            ExtensionPoint::PreBind => "PreBind",
            ExtensionPoint::Bind => "Bind",
            ExtensionPoint::PostBind => "PostBind",
        };
        write!(f, "{}", name)
    }
}

/// A plugin registered for exactly one extension point.
#[derive(Clone)]
pub enum Capability {
    PreFilter(Arc<dyn PreFilterPlugin>),
    Filter(Arc<dyn FilterPlugin>),
    PostFilter(Arc<dyn PostFilterPlugin>),
    PreScore(Arc<dyn PreScorePlugin>),
    Score(Arc<dyn ScorePlugin>),
    Reserve(Arc<dyn ReservePlugin>),
    Permit(Arc<dyn PermitPlugin>),
    PreBind(Arc<dyn PreBindPlugin>),
    Bind(Arc<dyn BindPlugin>),
    PostBind(Arc<dyn PostBindPlugin>),
}

impl Capability {
    pub fn extension_point(&self) -> ExtensionPoint {
        match self {
            Capability::PreFilter(_) => ExtensionPoint::PreFilter,
            Capability::Filter(_) => ExtensionPoint::Filter,
            Capability::PostFilter(_) => ExtensionPoint::PostFilter,
            Capability::PreScore(_) => ExtensionPoint::PreScore,
            Capability::Score(_) => ExtensionPoint::Score,
            Capability::Reserve(_) => ExtensionPoint::Reserve,
            Capability::Permit(_) => ExtensionPoint::Permit,
            Capability::PreBind(_) => ExtensionPoint::PreBind,
            Capability::Bind(_) => ExtensionPoint::Bind,
            Capability::PostBind(_) => ExtensionPoint::PostBind,
        }
    }

    pub fn plugin_name(&self) -> &str {
        match self {
            Capability::PreFilter(p) => p.name(),
            Capability::Filter(p) => p.name(),
            Capability::PostFilter(p) => p.name(),
            Capability::PreScore(p) => p.name(),
            Capability::Score(p) => p.name(),
            Capability::Reserve(p) => p.name(),
            Capability::Permit(p) => p.name(),
            Capability::PreBind(p) => p.name(),
            Capability::Bind(p) => p.name(),
            Capability::PostBind(p) => p.name(),
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.extension_point(), self.plugin_name())
    }
}

/// Ordered plugin lists, one per extension point. Registration order is
/// execution order.
#[derive(Clone, Default)]
pub struct PluginSet {
    pub(crate) pre_filter: Vec<Arc<dyn PreFilterPlugin>>,
    pub(crate) filter: Vec<Arc<dyn FilterPlugin>>,
    pub(crate) post_filter: Vec<Arc<dyn PostFilterPlugin>>,
    pub(crate) pre_score: Vec<Arc<dyn PreScorePlugin>>,
    pub(crate) score: Vec<Arc<dyn ScorePlugin>>,
    pub(crate) reserve: Vec<Arc<dyn ReservePlugin>>,
    pub(crate) permit: Vec<Arc<dyn PermitPlugin>>,
    pub(crate) pre_bind: Vec<Arc<dyn PreBindPlugin>>,
    pub(crate) bind: Vec<Arc<dyn BindPlugin>>,
    pub(crate) post_bind: Vec<Arc<dyn PostBindPlugin>>,
}

impl PluginSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin to its extension point.
    pub fn register(mut self, capability: Capability) -> Self {
        match capability {
            Capability::PreFilter(p) => self.pre_filter.push(p),
            Capability::Filter(p) => self.filter.push(p),
            Capability::PostFilter(p) => self.post_filter.push(p),
            Capability::PreScore(p) => self.pre_score.push(p),
            Capability::Score(p) => self.score.push(p),
            Capability::Reserve(p) => self.reserve.push(p),
            Capability::Permit(p) => self.permit.push(p),
            Capability::PreBind(p) => self.pre_bind.push(p),
            Capability::Bind(p) => self.bind.push(p),
            Capability::PostBind(p) => self.post_bind.push(p),
        }
        self
    }

    /// Register every capability in order.
    pub fn register_all(self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        capabilities.into_iter().fold(self, PluginSet::register)
    }

    /// Plugin names registered at `point`, in execution order.
    pub fn names(&self, point: ExtensionPoint) -> Vec<String> {
        fn collect<P: ?Sized + super::interface::Plugin>(list: &[Arc<P>]) -> Vec<String> {
            list.iter().map(|p| p.name().to_string()).collect()
        }
        match point {
            ExtensionPoint::PreFilter => collect(&self.pre_filter),
            ExtensionPoint::Filter => collect(&self.filter),
            ExtensionPoint::PostFilter => collect(&self.post_filter),
            ExtensionPoint::PreScore => collect(&self.pre_score),
            ExtensionPoint::Score => collect(&self.score),
            ExtensionPoint::Reserve => collect(&self.reserve),
            ExtensionPoint::Permit => collect(&self.permit),
            ExtensionPoint::PreBind => collect(&self.pre_bind),
            ExtensionPoint::Bind => collect(&self.bind),
            ExtensionPoint::PostBind => collect(&self.post_bind),
        }
    }

    /// Reject a plugin name registered twice at the same extension point.
    pub fn validate(&self) -> Result<()> {
        for point in ExtensionPoint::ALL {
            let mut seen = std::collections::HashSet::new();
            for name in self.names(point) {
                if !seen.insert(name.clone()) {
                    return Err(Error::DuplicatePlugin {
                        point,
                        plugin: name,
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for point in ExtensionPoint::ALL {
            map.entry(&point, &self.names(point));
        }
        map.finish()
    }
}
