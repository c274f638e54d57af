//! Types shared by both facades: the registered model set and the
//! lifecycle state.

use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter};

/// Name to model mapping produced by a successful `start`.
///
/// Iteration follows registration order.
#[derive(Debug)]
pub struct RegisteredModelSet<M> {
    models: IndexMap<String, M>,
}

impl<M> RegisteredModelSet<M> {
    pub fn new() -> Self {
        Self {
            models: IndexMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, model: M) {
        self.models.insert(name.into(), model);
    }

    pub fn get(&self, name: &str) -> Option<&M> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, M> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl<M> Default for RegisteredModelSet<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> IntoIterator for RegisteredModelSet<M> {
    type Item = (String, M);
    type IntoIter = IntoIter<String, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.into_iter()
    }
}

impl<'a, M> IntoIterator for &'a RegisteredModelSet<M> {
    type Item = (&'a String, &'a M);
    type IntoIter = Iter<'a, String, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}

/// Where a facade is in its `configure → connect → register` lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Unconfigured,
    Configured,
    Connecting,
    Connected,
    ModelsRegistered,
    /// Connecting or registration failed; a new `start` may be attempted.
    Failed,
    Closed,
}

impl StoreState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Configured => "configured",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::ModelsRegistered => "models_registered",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
