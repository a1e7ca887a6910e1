//! Core types for view-state tracking
//!
//! Defines the values a state dictionary can hold and the positional shape
//! of the payloads produced by `save` and consumed by `load`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ViewStateError;
use crate::traits::ViewStateResult;

/// A value stored in a state dictionary
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    List(Vec<StateValue>),
}

impl StateValue {
    /// Name used in `TypeMismatch` reports
    pub fn type_name(&self) -> &'static str {
        match self {
            StateValue::Bool(_) => "bool",
            StateValue::Int(_) => "int",
            StateValue::Float(_) => "float",
            StateValue::Char(_) => "char",
            StateValue::Str(_) => "string",
            StateValue::List(_) => "list",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StateValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            StateValue::Float(f) => Some(*f),
            StateValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            StateValue::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[StateValue]> {
        match self {
            StateValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Bool(b) => write!(f, "{}", b),
            StateValue::Int(i) => write!(f, "{}", i),
            StateValue::Float(v) => write!(f, "{}", v),
            StateValue::Char(c) => write!(f, "'{}'", c),
            StateValue::Str(s) => write!(f, "{:?}", s),
            StateValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self)
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Int(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        StateValue::Int(value as i64)
    }
}

impl From<i16> for StateValue {
    fn from(value: i16) -> Self {
        StateValue::Int(value as i64)
    }
}

impl From<u32> for StateValue {
    fn from(value: u32) -> Self {
        StateValue::Int(value as i64)
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Float(value)
    }
}

impl From<char> for StateValue {
    fn from(value: char) -> Self {
        StateValue::Char(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Str(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Str(value)
    }
}

impl From<Vec<StateValue>> for StateValue {
    fn from(value: Vec<StateValue>) -> Self {
        StateValue::List(value)
    }
}

impl From<Vec<String>> for StateValue {
    fn from(value: Vec<String>) -> Self {
        StateValue::List(value.into_iter().map(StateValue::Str).collect())
    }
}

/// One change reported by a dictionary diff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiffEntry {
    /// Key holds a value the counterpart must install
    Set { key: String, value: StateValue },
    /// Key existed in the baseline and was removed this cycle
    Removed { key: String },
}

impl DiffEntry {
    pub fn key(&self) -> &str {
        match self {
            DiffEntry::Set { key, .. } | DiffEntry::Removed { key } => key,
        }
    }

    pub fn value(&self) -> Option<&StateValue> {
        match self {
            DiffEntry::Set { value, .. } => Some(value),
            DiffEntry::Removed { .. } => None,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, DiffEntry::Removed { .. })
    }
}

/// Ordered dirty entries of a single dictionary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DictDiff {
    entries: Vec<DiffEntry>,
}

impl DictDiff {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Build a diff of plain `Set` entries, in the given order
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<StateValue>,
    {
        let mut diff = Self::new();
        for (key, value) in pairs {
            diff.push_set(key, value);
        }
        diff
    }

    pub fn push_set(&mut self, key: impl Into<String>, value: impl Into<StateValue>) {
        self.entries.push(DiffEntry::Set {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn push_removed(&mut self, key: impl Into<String>) {
        self.entries.push(DiffEntry::Removed { key: key.into() });
    }

    /// Replace the entry for `key` in place, or append it
    pub fn upsert(&mut self, key: &str, value: StateValue) {
        match self.entries.iter_mut().find(|e| e.key() == key) {
            Some(entry) => {
                *entry = DiffEntry::Set {
                    key: key.to_string(),
                    value,
                }
            }
            None => self.push_set(key, value),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DiffEntry> {
        self.entries.iter().find(|e| e.key() == key)
    }

    pub fn value(&self, key: &str) -> Option<&StateValue> {
        self.get(key).and_then(DiffEntry::value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffEntry> {
        self.entries.iter()
    }
}

impl IntoIterator for DictDiff {
    type Item = DiffEntry;
    type IntoIter = std::vec::IntoIter<DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a DictDiff {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Saved state of a positional item collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsPayload {
    /// Set when the collection's structure changed and every item was saved
    pub rebuilt: bool,
    /// Item count to recreate on load; only meaningful when `rebuilt`
    pub len: usize,
    /// `(index, item payload)` pairs in ascending index order
    pub entries: Vec<(usize, Option<Payload>)>,
}

impl ItemsPayload {
    pub fn incremental(entries: Vec<(usize, Option<Payload>)>) -> Self {
        Self {
            rebuilt: false,
            len: 0,
            entries,
        }
    }

    pub fn rebuilt(len: usize, entries: Vec<(usize, Option<Payload>)>) -> Self {
        Self {
            rebuilt: true,
            len,
            entries,
        }
    }
}

/// Saved state of one node
///
/// `Option<Payload>` is used at every level; `None` means there is nothing
/// to restore for that node or slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Dirty entries of a primitive dictionary or bitmask field set
    Diff(DictDiff),
    /// `[own diff, child 0, child 1, ...]` with fixed arity per node type
    Tuple(Vec<Option<Payload>>),
    /// Positional item collection
    Items(ItemsPayload),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Diff(_) => "diff",
            Payload::Tuple(_) => "tuple",
            Payload::Items(_) => "items",
        }
    }

    pub fn into_diff(self) -> ViewStateResult<DictDiff> {
        match self {
            Payload::Diff(diff) => Ok(diff),
            other => Err(ViewStateError::corrupt(format!(
                "expected dictionary diff, found {}",
                other.kind()
            ))),
        }
    }

    pub fn into_tuple(self) -> ViewStateResult<Vec<Option<Payload>>> {
        match self {
            Payload::Tuple(slots) => Ok(slots),
            other => Err(ViewStateError::corrupt(format!(
                "expected positional tuple, found {}",
                other.kind()
            ))),
        }
    }

    pub fn into_items(self) -> ViewStateResult<ItemsPayload> {
        match self {
            Payload::Items(items) => Ok(items),
            other => Err(ViewStateError::corrupt(format!(
                "expected item collection, found {}",
                other.kind()
            ))),
        }
    }

    pub fn as_diff(&self) -> Option<&DictDiff> {
        match self {
            Payload::Diff(diff) => Some(diff),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Option<Payload>]> {
        match self {
            Payload::Tuple(slots) => Some(slots),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&ItemsPayload> {
        match self {
            Payload::Items(items) => Some(items),
            _ => None,
        }
    }

    /// Payload at tuple position `index`, `None` for empty slots and non-tuples
    pub fn slot(&self, index: usize) -> Option<&Payload> {
        self.as_tuple()
            .and_then(|slots| slots.get(index))
            .and_then(Option::as_ref)
    }

    /// Number of dictionary entries carried anywhere in this payload
    pub fn entry_count(&self) -> usize {
        match self {
            Payload::Diff(diff) => diff.len(),
            Payload::Tuple(slots) => slots.iter().flatten().map(Payload::entry_count).sum(),
            Payload::Items(items) => items
                .entries
                .iter()
                .filter_map(|(_, p)| p.as_ref())
                .map(Payload::entry_count)
                .sum(),
        }
    }
}

impl From<DictDiff> for Payload {
    fn from(diff: DictDiff) -> Self {
        Payload::Diff(diff)
    }
}

impl From<ItemsPayload> for Payload {
    fn from(items: ItemsPayload) -> Self {
        Payload::Items(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(StateValue::from("x").as_str(), Some("x"));
        assert_eq!(StateValue::from(3i32).as_int(), Some(3));
        assert_eq!(StateValue::from(3i32).as_float(), Some(3.0));
        assert_eq!(StateValue::from(true).as_str(), None);
        assert_eq!(StateValue::from('k').type_name(), "char");
    }

    #[test]
    fn test_diff_upsert_keeps_position() {
        let mut diff = DictDiff::from_pairs([("a", 1i64), ("b", 2i64)]);
        diff.upsert("a", StateValue::Int(10));
        diff.upsert("c", StateValue::Int(3));

        let keys: Vec<&str> = diff.iter().map(DiffEntry::key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(diff.value("a"), Some(&StateValue::Int(10)));
    }

    #[test]
    fn test_removed_entry_has_no_value() {
        let mut diff = DictDiff::new();
        diff.push_removed("gone");
        assert!(diff.get("gone").unwrap().is_removal());
        assert_eq!(diff.value("gone"), None);
    }

    #[test]
    fn test_payload_shape_errors() {
        let payload = Payload::Tuple(vec![None]);
        let err = payload.into_diff().unwrap_err();
        assert!(err.is_structural());

        let payload = Payload::Diff(DictDiff::new());
        assert!(payload.into_tuple().is_err());
    }

    #[test]
    fn test_entry_count_walks_nested_payloads() {
        let inner = Payload::Tuple(vec![
            Some(DictDiff::from_pairs([("X", "1")]).into()),
            None,
        ]);
        let items = ItemsPayload::incremental(vec![(
            0,
            Some(DictDiff::from_pairs([("a", 1i64), ("b", 2i64)]).into()),
        )]);
        let outer = Payload::Tuple(vec![None, Some(inner), Some(items.into())]);
        assert_eq!(outer.entry_count(), 3);
        assert!(outer.slot(0).is_none());
        assert_eq!(outer.slot(1).map(Payload::kind), Some("tuple"));
    }

    #[test]
    fn test_payload_json_roundtrip() {
        let payload = Payload::Tuple(vec![
            None,
            Some(DictDiff::from_pairs([("X", "1")]).into()),
        ]);
        let json = serde_json::to_string(&payload).unwrap();
        let back: Payload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
