//! Core traits defining the view-state contract
//!
//! Every stateful node, from a single dictionary up to a whole control,
//! exposes the same three operations to its host.

use crate::types::{Payload, StateValue};

/// Result type for view-state operations
pub type ViewStateResult<T> = Result<T, crate::error::ViewStateError>;

/// Capability shared by every node that survives a request/response cycle
pub trait StatefulNode {
    /// Whether mutations are currently being marked dirty
    fn is_tracking(&self) -> bool;

    /// Start marking mutations dirty, cascading to every instantiated child.
    /// Idempotent.
    fn begin_tracking(&mut self);

    /// Project the dirty state of this node and its subtree.
    ///
    /// Returns `None` when nothing in the subtree changed. Does not mutate
    /// the node, so it may be called repeatedly.
    fn save(&self) -> Option<Payload>;

    /// Install a previously saved payload as baseline state.
    ///
    /// `None` leaves the node at its constructed defaults.
    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()>;

    /// Mark the entire current state dirty so the next `save` re-transmits it
    fn force_dirty(&mut self);
}

impl<T: StatefulNode + ?Sized> StatefulNode for Box<T> {
    fn is_tracking(&self) -> bool {
        (**self).is_tracking()
    }

    fn begin_tracking(&mut self) {
        (**self).begin_tracking()
    }

    fn save(&self) -> Option<Payload> {
        (**self).save()
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        (**self).load(payload)
    }

    fn force_dirty(&mut self) {
        (**self).force_dirty()
    }
}

/// Typed extraction of a stored value
pub trait FromStateValue: Sized {
    /// Name reported as `expected` in a `TypeMismatch`
    const TYPE_NAME: &'static str;

    fn from_state_value(value: &StateValue) -> Option<Self>;
}

impl FromStateValue for StateValue {
    const TYPE_NAME: &'static str = "any";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromStateValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromStateValue for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_int()
    }
}

impl FromStateValue for i32 {
    const TYPE_NAME: &'static str = "int";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_int().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromStateValue for i16 {
    const TYPE_NAME: &'static str = "short";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_int().and_then(|i| i16::try_from(i).ok())
    }
}

impl FromStateValue for u32 {
    const TYPE_NAME: &'static str = "uint";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_int().and_then(|i| u32::try_from(i).ok())
    }
}

impl FromStateValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_float()
    }
}

impl FromStateValue for char {
    const TYPE_NAME: &'static str = "char";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_char()
    }
}

impl FromStateValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromStateValue for Vec<String> {
    const TYPE_NAME: &'static str = "string list";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value
            .as_list()?
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_range_checks() {
        let big = StateValue::Int(i64::from(i16::MAX) + 1);
        assert_eq!(i16::from_state_value(&big), None);
        assert_eq!(i32::from_state_value(&big), Some(32768));
        assert_eq!(u32::from_state_value(&StateValue::Int(-1)), None);
    }

    #[test]
    fn test_string_list_requires_all_strings() {
        let names = StateValue::from(vec!["Arial".to_string(), "Verdana".to_string()]);
        assert_eq!(
            Vec::<String>::from_state_value(&names),
            Some(vec!["Arial".to_string(), "Verdana".to_string()])
        );

        let mixed = StateValue::List(vec![StateValue::from("Arial"), StateValue::Int(1)]);
        assert_eq!(Vec::<String>::from_state_value(&mixed), None);
    }

    #[test]
    fn test_mismatched_kinds() {
        assert_eq!(bool::from_state_value(&StateValue::from("true")), None);
        assert_eq!(String::from_state_value(&StateValue::Bool(true)), None);
    }
}
