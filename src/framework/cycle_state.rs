//! Per-cycle scratch space shared by plugins
//!
//! Plugins store pre-computed data in a [`CycleState`] at one extension point
//! and read it back at a later one. A fresh state is created for every
//! scheduling cycle and dropped when the cycle ends.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};

/// Key of an entry in [`CycleState`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(String);

impl StateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StateKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StateKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Downcasting support for [`StateData`], implemented for every `'static` type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Arbitrary data stored in a [`CycleState`].
///
/// `clone_data` should copy members shallowly (e.g. share large vectors
/// behind an `Arc`) but must return a value whose top level is independent
/// of `self`.
pub trait StateData: AsAny + fmt::Debug + Send + Sync {
    fn clone_data(&self) -> Box<dyn StateData>;
}

/// Thread-safe key/value store for one scheduling cycle.
#[derive(Debug, Default)]
pub struct CycleState {
    storage: RwLock<HashMap<StateKey, Arc<dyn StateData>>>,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the entry under `key`, `None` if it was never written.
    pub fn read(&self, key: &StateKey) -> Option<Arc<dyn StateData>> {
        self.storage.read().get(key).cloned()
    }

    /// Read the entry under `key` as a `T`, cloning it out of the store.
    pub fn read_as<T>(&self, key: &StateKey) -> Result<T>
    where
        T: StateData + Clone + 'static,
    {
        let data = self
            .read(key)
            .ok_or_else(|| Error::StateNotFound(key.to_string()))?;
        data.as_ref()
            .as_any()
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| Error::StateTypeMismatch(key.to_string()))
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn write(&self, key: impl Into<StateKey>, value: impl StateData + 'static) {
        self.write_arc(key, Arc::new(value));
    }

    fn write_arc(&self, key: impl Into<StateKey>, value: Arc<dyn StateData>) {
        self.storage.write().insert(key.into(), value);
    }

    pub fn delete(&self, key: &StateKey) {
        self.storage.write().remove(key);
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.storage.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.storage.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the state, replacing every entry with its own `clone_data`.
    ///
    /// Used before evaluating a hypothetical change; writes to the copy are
    /// never visible in `self` and the other way round.
    pub fn clone_state(&self) -> CycleState {
        let copy = CycleState::new();
        for (key, value) in self.storage.read().iter() {
            copy.write_arc(key.clone(), Arc::from(value.clone_data()));
        }
        copy
    }
}
