//! Tree view nodes

use viewstate_core::{Payload, StatefulNode, ViewStateResult};
use viewstate_state::{compose, decompose, DiffDictionary, LazyChild, StateCollection};

use crate::values::{read_either, read_or};

/// Saved as `[own, child nodes]`
#[derive(Debug, Clone, Default)]
pub struct TreeNode {
    state: DiffDictionary,
    children: LazyChild<StateCollection<TreeNode>>,
}

impl TreeNode {
    pub fn new(text: &str) -> Self {
        let mut node = Self::default();
        node.set_text(text);
        node
    }

    pub fn with_value(text: &str, value: &str) -> Self {
        let mut node = Self::new(text);
        node.set_value(value);
        node
    }

    pub fn text(&self) -> String {
        read_either(&self.state, "Text", "Value")
    }

    pub fn set_text(&mut self, text: &str) {
        self.state.set("Text", text);
    }

    pub fn value(&self) -> String {
        read_either(&self.state, "Value", "Text")
    }

    pub fn set_value(&mut self, value: &str) {
        self.state.set("Value", value);
    }

    pub fn navigate_url(&self) -> String {
        read_or(&self.state, "NavigateUrl", String::new())
    }

    pub fn set_navigate_url(&mut self, url: &str) {
        self.state.set("NavigateUrl", url);
    }

    pub fn image_url(&self) -> String {
        read_or(&self.state, "ImageUrl", String::new())
    }

    pub fn set_image_url(&mut self, url: &str) {
        self.state.set("ImageUrl", url);
    }

    pub fn tool_tip(&self) -> String {
        read_or(&self.state, "ToolTip", String::new())
    }

    pub fn set_tool_tip(&mut self, tip: &str) {
        self.state.set("ToolTip", tip);
    }

    pub fn target(&self) -> String {
        read_or(&self.state, "Target", String::new())
    }

    pub fn set_target(&mut self, target: &str) {
        self.state.set("Target", target);
    }

    pub fn checked(&self) -> bool {
        read_or(&self.state, "Checked", false)
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.state.set("Checked", checked);
    }

    /// `None` until the node has been explicitly expanded or collapsed
    pub fn expanded(&self) -> Option<bool> {
        self.state.get_value("Expanded").and_then(|v| v.as_bool())
    }

    pub fn set_expanded(&mut self, expanded: Option<bool>) {
        match expanded {
            Some(expanded) => self.state.set("Expanded", expanded),
            None => {
                self.state.remove("Expanded");
            }
        }
    }

    pub fn expand(&mut self) {
        self.set_expanded(Some(true));
    }

    pub fn collapse(&mut self) {
        self.set_expanded(Some(false));
    }

    pub fn toggle_expand_state(&mut self) {
        let expanded = self.expanded().unwrap_or(false);
        self.set_expanded(Some(!expanded));
    }

    /// Expand this node and every descendant
    pub fn expand_all(&mut self) {
        self.set_expanded_recursive(true);
    }

    pub fn collapse_all(&mut self) {
        self.set_expanded_recursive(false);
    }

    fn set_expanded_recursive(&mut self, expanded: bool) {
        self.set_expanded(Some(expanded));
        if let Some(children) = self.children.get_mut() {
            for child in children.iter_mut() {
                child.set_expanded_recursive(expanded);
            }
        }
    }

    pub fn selected(&self) -> bool {
        read_or(&self.state, "Selected", false)
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.state.set("Selected", selected);
    }

    pub fn populate_on_demand(&self) -> bool {
        read_or(&self.state, "PopulateOnDemand", false)
    }

    pub fn set_populate_on_demand(&mut self, populate: bool) {
        self.state.set("PopulateOnDemand", populate);
    }

    pub fn show_check_box(&self) -> Option<bool> {
        self.state.get_value("ShowCheckBox").and_then(|v| v.as_bool())
    }

    pub fn set_show_check_box(&mut self, show: bool) {
        self.state.set("ShowCheckBox", show);
    }

    pub fn children(&self) -> Option<&StateCollection<TreeNode>> {
        self.children.get()
    }

    pub fn children_mut(&mut self) -> &mut StateCollection<TreeNode> {
        let tracking = self.is_tracking();
        self.children.get_or_create(tracking)
    }

    pub fn child_count(&self) -> usize {
        self.children().map(StateCollection::len).unwrap_or(0)
    }

    /// Follow a path of child indices from this node
    pub fn descendant(&self, path: &[usize]) -> Option<&TreeNode> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.children()?.get(*first)?.descendant(rest),
        }
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut TreeNode> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.children.get_mut()?.get_mut(*first)?.descendant_mut(rest),
        }
    }

    /// Slash-separated values from this node down `path`
    pub fn value_path(&self, path: &[usize]) -> Option<String> {
        let mut values = vec![self.value()];
        let mut node = self;
        for index in path {
            node = node.children()?.get(*index)?;
            values.push(node.value());
        }
        Some(values.join("/"))
    }
}

impl StatefulNode for TreeNode {
    fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    fn begin_tracking(&mut self) {
        self.state.begin_tracking();
        self.children.begin_tracking();
    }

    fn save(&self) -> Option<Payload> {
        compose(self.state.save(), vec![self.children.save()])
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        let Some(payload) = payload else {
            return Ok(());
        };
        let (own, children) = decompose(payload, 1)?;
        self.state.load(own)?;

        // child nodes load even when populated on demand
        let tracking = self.is_tracking();
        let saved = children.into_iter().next().flatten();
        self.children.load(saved, tracking)
    }

    fn force_dirty(&mut self) {
        self.state.force_dirty();
        self.children.force_dirty();
    }
}
