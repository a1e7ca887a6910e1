//! Positional composition of stateful nodes
//!
//! A composite node saves as `[own diff, child 0, child 1, ...]`. Slots carry
//! no names, so every node type declares its slot order once and keeps it.
//! A node whose own state and every child are clean contributes nothing.

use std::sync::Arc;
use tracing::debug;
use viewstate_core::{Payload, StateConfig, StatefulNode, ViewStateError, ViewStateResult};

use crate::bag::DiffDictionary;

/// Assemble a composite payload, `None` if every part is clean
pub fn compose(own: Option<Payload>, children: Vec<Option<Payload>>) -> Option<Payload> {
    if own.is_none() && children.iter().all(Option::is_none) {
        return None;
    }
    let mut slots = Vec::with_capacity(children.len() + 1);
    slots.push(own);
    slots.extend(children);
    Some(Payload::Tuple(slots))
}

/// Split a composite payload into own state and `arity` child payloads
///
/// The arity must match exactly. Positional data of another shape cannot
/// be reinterpreted, so it is never truncated or padded.
pub fn decompose(
    payload: Payload,
    arity: usize,
) -> ViewStateResult<(Option<Payload>, Vec<Option<Payload>>)> {
    let mut slots = payload.into_tuple()?;
    if slots.len() != arity + 1 {
        return Err(ViewStateError::SchemaMismatch {
            expected: arity + 1,
            found: slots.len(),
        });
    }
    let children = slots.split_off(1);
    let own = slots.pop().flatten();
    Ok((own, children))
}

/// A child slot instantiated on first access
///
/// A child created while its owner is tracking starts tracking at once.
#[derive(Debug, Clone)]
pub struct LazyChild<T> {
    node: Option<T>,
}

impl<T> Default for LazyChild<T> {
    fn default() -> Self {
        Self { node: None }
    }
}

impl<T: StatefulNode> LazyChild<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_created(&self) -> bool {
        self.node.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.node.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.node.as_mut()
    }

    pub fn get_or_create_with<F>(&mut self, owner_tracking: bool, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.node.get_or_insert_with(|| {
            let mut node = make();
            if owner_tracking {
                node.begin_tracking();
            }
            node
        })
    }

    /// Load into the child, creating it only when there is something to load
    pub fn load_with<F>(
        &mut self,
        payload: Option<Payload>,
        owner_tracking: bool,
        make: F,
    ) -> ViewStateResult<()>
    where
        F: FnOnce() -> T,
    {
        let Some(payload) = payload else {
            return Ok(());
        };
        let node = self.node.get_or_insert_with(make);
        node.load(Some(payload))?;
        if owner_tracking {
            node.begin_tracking();
        }
        Ok(())
    }

    pub fn save(&self) -> Option<Payload> {
        self.node.as_ref().and_then(StatefulNode::save)
    }

    pub fn begin_tracking(&mut self) {
        if let Some(node) = self.node.as_mut() {
            node.begin_tracking();
        }
    }

    pub fn force_dirty(&mut self) {
        if let Some(node) = self.node.as_mut() {
            node.force_dirty();
        }
    }

    /// Drop the child; it is recreated from defaults on next access
    pub fn reset(&mut self) {
        self.node = None;
    }
}

impl<T: StatefulNode + Default> LazyChild<T> {
    pub fn get_or_create(&mut self, owner_tracking: bool) -> &mut T {
        self.get_or_create_with(owner_tracking, T::default)
    }

    pub fn load(&mut self, payload: Option<Payload>, owner_tracking: bool) -> ViewStateResult<()> {
        self.load_with(payload, owner_tracking, T::default)
    }
}

/// Declared shape of a [`CompositeNode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSchema {
    pub name: String,
    pub slots: Vec<Arc<NodeSchema>>,
}

impl NodeSchema {
    pub fn leaf(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            slots: Vec::new(),
        })
    }

    pub fn builder(name: impl Into<String>) -> NodeSchemaBuilder {
        NodeSchemaBuilder {
            name: name.into(),
            slots: Vec::new(),
        }
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name == name)
    }
}

pub struct NodeSchemaBuilder {
    name: String,
    slots: Vec<Arc<NodeSchema>>,
}

impl NodeSchemaBuilder {
    pub fn slot(mut self, schema: Arc<NodeSchema>) -> Self {
        self.slots.push(schema);
        self
    }

    pub fn leaf_slot(self, name: impl Into<String>) -> Self {
        self.slot(NodeSchema::leaf(name))
    }

    pub fn build(self) -> Arc<NodeSchema> {
        Arc::new(NodeSchema {
            name: self.name,
            slots: self.slots,
        })
    }
}

/// Schema-driven node: one dictionary plus lazily created child slots
#[derive(Debug, Clone)]
pub struct CompositeNode {
    schema: Arc<NodeSchema>,
    state: DiffDictionary,
    children: Vec<LazyChild<CompositeNode>>,
    config: StateConfig,
}

impl CompositeNode {
    pub fn new(schema: Arc<NodeSchema>) -> Self {
        Self::with_config(schema, &StateConfig::default())
    }

    pub fn with_config(schema: Arc<NodeSchema>, config: &StateConfig) -> Self {
        let children = (0..schema.arity()).map(|_| LazyChild::new()).collect();
        Self {
            state: DiffDictionary::with_config(config),
            schema,
            children,
            config: *config,
        }
    }

    pub fn schema(&self) -> &Arc<NodeSchema> {
        &self.schema
    }

    pub fn state(&self) -> &DiffDictionary {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DiffDictionary {
        &mut self.state
    }

    /// Child at `index` if it has been created
    pub fn child(&self, index: usize) -> Option<&CompositeNode> {
        self.children.get(index).and_then(LazyChild::get)
    }

    /// Child at `index`, created on first access
    pub fn child_mut(&mut self, index: usize) -> ViewStateResult<&mut CompositeNode> {
        let arity = self.schema.arity();
        let tracking = self.state.is_tracking();
        let schema = self
            .schema
            .slots
            .get(index)
            .cloned()
            .ok_or_else(|| {
                ViewStateError::InvalidValue(format!(
                    "{} has {} slots, no slot {}",
                    self.schema.name, arity, index
                ))
            })?;
        let config = self.config;
        let slot = self
            .children
            .get_mut(index)
            .ok_or_else(|| ViewStateError::InvalidValue(format!("no slot {}", index)))?;
        Ok(slot.get_or_create_with(tracking, || CompositeNode::with_config(schema, &config)))
    }

    pub fn child_by_name(&mut self, name: &str) -> ViewStateResult<&mut CompositeNode> {
        let index = self.schema.slot_index(name).ok_or_else(|| {
            ViewStateError::InvalidValue(format!("{} has no slot named {}", self.schema.name, name))
        })?;
        self.child_mut(index)
    }
}

impl StatefulNode for CompositeNode {
    fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    fn begin_tracking(&mut self) {
        self.state.begin_tracking();
        for child in &mut self.children {
            child.begin_tracking();
        }
    }

    fn save(&self) -> Option<Payload> {
        let payload = compose(
            self.state.save(),
            self.children.iter().map(LazyChild::save).collect(),
        );
        debug!(node = %self.schema.name, dirty = payload.is_some(), "composite node saved");
        payload
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        let Some(payload) = payload else {
            return Ok(());
        };
        let (own, children) = decompose(payload, self.schema.arity())?;
        self.state.load(own)?;

        let tracking = self.state.is_tracking();
        for ((slot, schema), child) in self
            .children
            .iter_mut()
            .zip(self.schema.slots.iter())
            .zip(children)
        {
            let config = self.config;
            let schema = Arc::clone(schema);
            slot.load_with(child, tracking, || CompositeNode::with_config(schema, &config))?;
        }
        debug!(node = %self.schema.name, "composite node loaded");
        Ok(())
    }

    fn force_dirty(&mut self) {
        self.state.force_dirty();
        for child in &mut self.children {
            child.force_dirty();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewstate_core::DictDiff;

    fn two_slot_schema() -> Arc<NodeSchema> {
        let b = NodeSchema::builder("b").leaf_slot("b0").leaf_slot("b1").build();
        NodeSchema::builder("root").leaf_slot("a").slot(b).build()
    }

    #[test]
    fn test_compose_all_clean_is_none() {
        assert!(compose(None, vec![None, None]).is_none());
        assert!(compose(None, vec![]).is_none());
    }

    #[test]
    fn test_compose_keeps_positions() {
        let child = Payload::Diff(DictDiff::from_pairs([("k", 1i64)]));
        let payload = compose(None, vec![None, Some(child.clone())]).unwrap();
        assert_eq!(payload, Payload::Tuple(vec![None, None, Some(child)]));
    }

    #[test]
    fn test_decompose_arity_mismatch() {
        let payload = Payload::Tuple(vec![None, None]);
        let err = decompose(payload, 2).unwrap_err();
        assert!(matches!(
            err,
            ViewStateError::SchemaMismatch { expected: 3, found: 2 }
        ));
    }

    #[test]
    fn test_decompose_rejects_non_tuple() {
        let payload = Payload::Diff(DictDiff::new());
        assert!(matches!(
            decompose(payload, 0),
            Err(ViewStateError::CorruptState(_))
        ));
    }

    #[test]
    fn test_lazy_child_created_after_tracking_tracks() {
        let mut slot: LazyChild<DiffDictionary> = LazyChild::new();
        assert!(slot.save().is_none());

        let bag = slot.get_or_create(true);
        assert!(bag.is_tracking());
        bag.set("k", "v");
        assert!(slot.save().is_some());
    }

    #[test]
    fn test_lazy_child_load_none_does_not_create() {
        let mut slot: LazyChild<DiffDictionary> = LazyChild::new();
        slot.load(None, false).unwrap();
        assert!(!slot.is_created());
    }

    #[test]
    fn test_clean_tree_saves_nothing() {
        let mut root = CompositeNode::new(two_slot_schema());
        root.state_mut().set("Default", 1i64);
        root.child_mut(1).unwrap().state_mut().set("Default", 2i64);
        root.begin_tracking();

        assert!(root.save().is_none());
    }

    #[test]
    fn test_nested_mutation_produces_single_path() {
        let mut root = CompositeNode::new(two_slot_schema());
        root.begin_tracking();
        root.child_mut(1).unwrap().state_mut().set("X", "1");

        let expected = Payload::Tuple(vec![
            None,
            None,
            Some(Payload::Tuple(vec![
                Some(Payload::Diff(DictDiff::from_pairs([("X", "1")]))),
                None,
                None,
            ])),
        ]);
        assert_eq!(root.save(), Some(expected));
    }

    #[test]
    fn test_load_restores_into_fresh_tree() {
        let mut root = CompositeNode::new(two_slot_schema());
        root.begin_tracking();
        root.child_by_name("b").unwrap().state_mut().set("X", "1");
        let payload = root.save();

        let mut fresh = CompositeNode::new(two_slot_schema());
        fresh.load(payload).unwrap();
        fresh.begin_tracking();

        let b = fresh.child(1).unwrap();
        assert_eq!(b.state().get_str("X", "0").unwrap(), "1");
        assert!(fresh.child(0).is_none());
        assert!(fresh.save().is_none());
    }

    #[test]
    fn test_load_propagates_nested_schema_mismatch() {
        let payload = Payload::Tuple(vec![None, None, Some(Payload::Tuple(vec![None]))]);
        let mut root = CompositeNode::new(two_slot_schema());
        let err = root.load(Some(payload)).unwrap_err();
        assert!(matches!(
            err,
            ViewStateError::SchemaMismatch { expected: 3, found: 1 }
        ));
    }

    #[test]
    fn test_child_out_of_range() {
        let mut root = CompositeNode::new(two_slot_schema());
        assert!(matches!(
            root.child_mut(5),
            Err(ViewStateError::InvalidValue(_))
        ));
        assert!(root.child_by_name("missing").is_err());
    }

    #[test]
    fn test_force_dirty_cascades() {
        let mut root = CompositeNode::new(two_slot_schema());
        root.child_mut(0).unwrap().state_mut().set("A", 1i64);
        root.begin_tracking();
        root.force_dirty();

        let payload = root.save().unwrap();
        assert!(payload.slot(1).is_some());
        assert!(payload.slot(2).is_none());
    }
}
