//! Annotation payloads attached to schema elements
//!
//! The front-end resolves custom options into JSON values keyed by their fully
//! qualified identifier (e.g. `wasmjs.v1.browser_provided`). This module only
//! stores and looks them up; interpreting a payload is the analyzer's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(BTreeMap<String, Value>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the raw payload for an annotation identifier
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, payload: Value) {
        self.0.insert(id.into(), payload);
    }

    /// Builder-style insert, mostly useful for fixtures
    pub fn with(mut self, id: impl Into<String>, payload: Value) -> Self {
        self.insert(id, payload);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Annotations {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
