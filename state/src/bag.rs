//! Ordered key-value state with per-entry dirty tracking

use indexmap::IndexMap;
use std::borrow::Cow;
use tracing::trace;
use viewstate_core::{
    DictDiff, DiffEntry, FromStateValue, Payload, StateConfig, StateValue, StatefulNode,
    ViewStateError, ViewStateResult,
};

/// A single dictionary entry
///
/// `value == None` is a tombstone: the key existed in the baseline and was
/// removed while tracking.
#[derive(Debug, Clone)]
struct StateItem {
    key: String,
    value: Option<StateValue>,
    dirty: bool,
    baseline: bool,
}

/// Ordered dictionary of named values that reports only what changed
/// after tracking began
#[derive(Debug, Clone, Default)]
pub struct DiffDictionary {
    items: IndexMap<String, StateItem>,
    config: StateConfig,
    tracking: bool,
}

impl DiffDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_case(ignore_case: bool) -> Self {
        Self::with_config(&StateConfig {
            ignore_case,
            ..StateConfig::default()
        })
    }

    pub fn with_config(config: &StateConfig) -> Self {
        Self {
            items: IndexMap::new(),
            config: *config,
            tracking: false,
        }
    }

    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    fn fold<'k>(&self, key: &'k str) -> Cow<'k, str> {
        if self.config.ignore_case {
            Cow::Owned(key.to_ascii_lowercase())
        } else {
            Cow::Borrowed(key)
        }
    }

    fn item(&self, key: &str) -> Option<&StateItem> {
        self.items.get(&*self.fold(key))
    }

    /// Stored value for `key`, `None` if absent
    pub fn get_value(&self, key: &str) -> Option<&StateValue> {
        self.item(key).and_then(|item| item.value.as_ref())
    }

    /// Typed read with a fallback for absent keys
    ///
    /// A present value of the wrong type is reported as `TypeMismatch`; the
    /// caller decides whether to coerce or fall back.
    pub fn get_or<T: FromStateValue>(&self, key: &str, default: T) -> ViewStateResult<T> {
        match self.get_value(key) {
            None => Ok(default),
            Some(value) => T::from_state_value(value).ok_or_else(|| ViewStateError::TypeMismatch {
                key: key.to_string(),
                expected: T::TYPE_NAME,
                found: value.type_name(),
            }),
        }
    }

    pub fn get_str(&self, key: &str, default: &str) -> ViewStateResult<String> {
        self.get_or(key, default.to_string())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> ViewStateResult<bool> {
        self.get_or(key, default)
    }

    pub fn get_int(&self, key: &str, default: i32) -> ViewStateResult<i32> {
        self.get_or(key, default)
    }

    pub fn get_char(&self, key: &str, default: char) -> ViewStateResult<char> {
        self.get_or(key, default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.items.values().filter(|item| item.value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live keys in insertion order, as first written
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    /// Live entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateValue)> {
        self.items
            .values()
            .filter_map(|item| item.value.as_ref().map(|value| (item.key.as_str(), value)))
    }

    /// Store a value; marks the entry dirty while tracking
    pub fn set(&mut self, key: &str, value: impl Into<StateValue>) {
        let value = value.into();
        let tracking = self.tracking;
        let folded = self.fold(key).into_owned();

        trace!(key, tracking, "state entry set");

        match self.items.get_mut(&folded) {
            Some(item) => {
                item.value = Some(value);
                item.dirty |= tracking;
                item.baseline |= !tracking;
            }
            None => {
                self.items.insert(
                    folded,
                    StateItem {
                        key: key.to_string(),
                        value: Some(value),
                        dirty: tracking,
                        baseline: !tracking,
                    },
                );
            }
        }
    }

    /// Delete an entry, returning its value
    ///
    /// While tracking, removing an entry that has a baseline leaves a
    /// tombstone so the next diff reports the removal. An entry first
    /// created during this tracking cycle vanishes without trace.
    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        let folded = self.fold(key).into_owned();

        if !self.tracking || !self.config.record_removals {
            return self.items.shift_remove(&folded).and_then(|item| item.value);
        }

        let baseline = self.items.get(&folded)?.baseline;
        if !baseline {
            return self.items.shift_remove(&folded).and_then(|item| item.value);
        }

        trace!(key, "state entry tombstoned");
        let item = self.items.get_mut(&folded)?;
        item.dirty = true;
        item.value.take()
    }

    /// Remove every entry, following the same tombstone rule as `remove`
    pub fn clear(&mut self) {
        if self.tracking && self.config.record_removals {
            self.items.retain(|_, item| {
                if item.baseline {
                    item.value = None;
                    item.dirty = true;
                    true
                } else {
                    false
                }
            });
        } else {
            self.items.clear();
        }
    }

    pub fn is_item_dirty(&self, key: &str) -> bool {
        self.item(key).map(|item| item.dirty).unwrap_or(false)
    }

    pub fn set_item_dirty(&mut self, key: &str, dirty: bool) {
        let folded = self.fold(key).into_owned();
        if let Some(item) = self.items.get_mut(&folded) {
            item.dirty = dirty;
            if !dirty && item.value.is_none() {
                self.items.shift_remove(&folded);
            }
        }
    }

    /// Mark every entry dirty or clean regardless of tracking state
    pub fn set_dirty(&mut self, dirty: bool) {
        for item in self.items.values_mut() {
            item.dirty = dirty;
        }
        if !dirty {
            self.items.retain(|_, item| item.value.is_some());
        }
    }

    /// Dirty entries in insertion order, with tombstones as removals
    pub fn diff(&self) -> DictDiff {
        let mut diff = DictDiff::new();
        for item in self.items.values().filter(|item| item.dirty) {
            match &item.value {
                Some(value) => diff.push_set(item.key.as_str(), value.clone()),
                None => diff.push_removed(item.key.as_str()),
            }
        }
        diff
    }

    /// Install a saved diff as clean baseline state
    pub fn merge(&mut self, diff: DictDiff) -> ViewStateResult<()> {
        let mut seen = std::collections::HashSet::new();
        for entry in &diff {
            if entry.key().is_empty() {
                return Err(ViewStateError::corrupt("dictionary diff contains an empty key"));
            }
            if !seen.insert(self.fold(entry.key()).into_owned()) {
                return Err(ViewStateError::corrupt(format!(
                    "dictionary diff repeats key {}",
                    entry.key()
                )));
            }
        }

        for entry in diff {
            match entry {
                DiffEntry::Set { key, value } => {
                    trace!(key = key.as_str(), "state entry merged");
                    let folded = self.fold(&key).into_owned();
                    match self.items.get_mut(&folded) {
                        Some(item) => {
                            item.value = Some(value);
                            item.dirty = false;
                            item.baseline = true;
                        }
                        None => {
                            self.items.insert(
                                folded,
                                StateItem {
                                    key,
                                    value: Some(value),
                                    dirty: false,
                                    baseline: true,
                                },
                            );
                        }
                    }
                }
                DiffEntry::Removed { key } => {
                    trace!(key = key.as_str(), "state entry removal merged");
                    let folded = self.fold(&key).into_owned();
                    self.items.shift_remove(&folded);
                }
            }
        }
        Ok(())
    }
}

impl StatefulNode for DiffDictionary {
    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn begin_tracking(&mut self) {
        self.tracking = true;
    }

    fn save(&self) -> Option<Payload> {
        let diff = self.diff();
        if diff.is_empty() {
            None
        } else {
            Some(Payload::Diff(diff))
        }
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        match payload {
            None => Ok(()),
            Some(payload) => self.merge(payload.into_diff()?),
        }
    }

    fn force_dirty(&mut self) {
        self.set_dirty(true);
    }
}
