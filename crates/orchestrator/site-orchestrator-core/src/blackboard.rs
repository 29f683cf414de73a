use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use site_motion_core::{Change, Value};

/// Latest published presentation value with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackboardEntry {
    pub value: Value,
    pub epoch: u64,
    pub source: String,
}

impl BlackboardEntry {
    pub fn new(value: Value, epoch: u64, source: String) -> Self {
        Self {
            value,
            epoch,
            source,
        }
    }
}

/// Presentation state keyed by path, in first-publish order.
///
/// Controllers publish their full state every frame; only values that differ
/// from what is already stored come back as frame changes, so the renderer
/// touches the minimum.
#[derive(Debug, Default)]
pub struct Blackboard {
    inner: IndexMap<String, BlackboardEntry>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self {
            inner: IndexMap::new(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&BlackboardEntry> {
        self.inner.get(path)
    }

    /// Shorthand for the stored value at `path`.
    pub fn value(&self, path: &str) -> Option<&Value> {
        self.inner.get(path).map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Store `changes` from `source`; returns those that altered a value.
    /// Last writer wins.
    pub fn apply(&mut self, changes: Vec<Change>, epoch: u64, source: &str) -> Vec<Change> {
        let mut applied = Vec::new();
        for change in changes {
            if let Some(prev) = self.inner.get(&change.path) {
                if prev.value == change.value {
                    continue;
                }
            }
            self.inner.insert(
                change.path.clone(),
                BlackboardEntry::new(change.value.clone(), epoch, source.to_string()),
            );
            applied.push(change);
        }
        applied
    }

    /// Current state as a list of changes (used for full snapshots).
    pub fn snapshot(&self) -> Vec<Change> {
        self.inner
            .iter()
            .map(|(path, e)| Change {
                path: path.clone(),
                value: e.value.clone(),
            })
            .collect()
    }
}
