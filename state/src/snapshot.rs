//! Captured payloads of a whole tree
//!
//! A snapshot pairs a saved payload with the name of the tree it came from,
//! so a host or a tool can persist it as JSON and feed it back later.

use serde::{Deserialize, Serialize};
use viewstate_core::{Payload, StatefulNode, ViewStateError, ViewStateResult};

/// Saved state of one tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Name of the root node type
    pub root: String,
    /// `None` when the tree had nothing to save
    pub payload: Option<Payload>,
}

impl TreeSnapshot {
    pub fn new(root: impl Into<String>, payload: Option<Payload>) -> Self {
        Self {
            root: root.into(),
            payload,
        }
    }

    /// Take the current diff of `tree`
    pub fn capture<T: StatefulNode + ?Sized>(root: impl Into<String>, tree: &T) -> Self {
        Self::new(root, tree.save())
    }

    /// Load this snapshot's payload into `tree`
    pub fn restore_into<T: StatefulNode + ?Sized>(&self, tree: &mut T) -> ViewStateResult<()> {
        tree.load(self.payload.clone())
    }

    pub fn to_json(&self) -> ViewStateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot; unreadable input is reported as corrupt state
    pub fn from_json(json: &str) -> ViewStateResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ViewStateError::corrupt(format!("unreadable snapshot: {}", e)))
    }

    /// Number of dictionary entries carried
    pub fn entry_count(&self) -> usize {
        self.payload.as_ref().map(Payload::entry_count).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::DiffDictionary;

    #[test]
    fn test_snapshot_roundtrip() {
        let mut bag = DiffDictionary::new();
        bag.begin_tracking();
        bag.set("Text", "hello");
        bag.set("Count", 3i64);

        let snapshot = TreeSnapshot::capture("bag", &bag);
        assert_eq!(snapshot.entry_count(), 2);

        let json = snapshot.to_json().unwrap();
        let back = TreeSnapshot::from_json(&json).unwrap();
        assert_eq!(back, snapshot);

        let mut fresh = DiffDictionary::new();
        back.restore_into(&mut fresh).unwrap();
        assert_eq!(fresh.get_str("Text", "").unwrap(), "hello");
        assert_eq!(fresh.get_int("Count", 0).unwrap(), 3);
    }

    #[test]
    fn test_clean_tree_snapshot_is_empty() {
        let mut bag = DiffDictionary::new();
        bag.set("Default", true);
        bag.begin_tracking();

        let snapshot = TreeSnapshot::capture("bag", &bag);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.entry_count(), 0);
    }

    #[test]
    fn test_garbage_json_is_corrupt_state() {
        let err = TreeSnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ViewStateError::CorruptState(_)));
        assert!(err.is_structural());
    }
}
