//! Host-side recovery when restoring a tree
//!
//! A structural error anywhere in a load leaves the tree partly hydrated.
//! The tree is rebuilt from defaults instead, and the host learns why.

use tracing::warn;
use viewstate_core::{Payload, StatefulNode, ViewStateError, ViewStateResult};

/// Outcome of [`restore_tree`]
#[derive(Debug)]
pub struct Restored<T> {
    pub tree: T,
    /// Error that caused the payload to be thrown away, if any
    pub discarded: Option<ViewStateError>,
}

impl<T> Restored<T> {
    pub fn was_discarded(&self) -> bool {
        self.discarded.is_some()
    }

    pub fn into_tree(self) -> T {
        self.tree
    }
}

/// Build a tree with `make` and load `payload` into it
///
/// `CorruptState` and `SchemaMismatch` are recovered by returning a fresh
/// tree from `make`. Any other error is returned to the caller.
pub fn restore_tree<T, F>(make: F, payload: Option<Payload>) -> ViewStateResult<Restored<T>>
where
    T: StatefulNode,
    F: Fn() -> T,
{
    let mut tree = make();
    match tree.load(payload) {
        Ok(()) => Ok(Restored {
            tree,
            discarded: None,
        }),
        Err(err) if err.is_structural() => {
            warn!(error = %err, "discarding saved state, restarting from defaults");
            Ok(Restored {
                tree: make(),
                discarded: Some(err),
            })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::DiffDictionary;
    use crate::composite::{CompositeNode, NodeSchema};
    use viewstate_core::DictDiff;

    fn make_tree() -> CompositeNode {
        let schema = NodeSchema::builder("root").leaf_slot("a").leaf_slot("b").build();
        let mut node = CompositeNode::new(schema);
        node.state_mut().set("Default", "d");
        node
    }

    #[test]
    fn test_valid_payload_is_loaded() {
        let mut source = make_tree();
        source.begin_tracking();
        source.child_mut(0).unwrap().state_mut().set("Text", "hello");

        let restored = restore_tree(make_tree, source.save()).unwrap();
        assert!(!restored.was_discarded());
        let a = restored.tree.child(0).unwrap();
        assert_eq!(a.state().get_str("Text", "").unwrap(), "hello");
    }

    #[test]
    fn test_partial_load_is_discarded() {
        // own diff is valid, slot b has the wrong arity
        let payload = Payload::Tuple(vec![
            Some(DictDiff::from_pairs([("Default", "changed")]).into()),
            None,
            Some(Payload::Tuple(vec![None, None])),
        ]);

        let restored = restore_tree(make_tree, Some(payload)).unwrap();
        assert!(matches!(
            restored.discarded,
            Some(ViewStateError::SchemaMismatch { expected: 1, found: 2 })
        ));
        assert_eq!(restored.tree.state().get_str("Default", "").unwrap(), "d");
        assert!(restored.tree.child(1).is_none());
    }

    #[test]
    fn test_corrupt_leaf_is_discarded() {
        let restored = restore_tree(DiffDictionary::new, Some(Payload::Tuple(vec![]))).unwrap();
        assert!(matches!(
            restored.discarded,
            Some(ViewStateError::CorruptState(_))
        ));
        assert!(restored.into_tree().is_empty());
    }

    #[test]
    fn test_no_payload_keeps_defaults() {
        let restored = restore_tree(make_tree, None).unwrap();
        assert!(!restored.was_discarded());
        assert_eq!(restored.tree.state().get_str("Default", "").unwrap(), "d");
    }
}
