//! Menu items with nested child items

use viewstate_core::{Payload, StatefulNode, ViewStateResult};
use viewstate_state::{compose, decompose, DiffDictionary, LazyChild, StateCollection};

use crate::values::{read_either, read_or};

/// Saved as `[own, child items]`
#[derive(Debug, Clone, Default)]
pub struct MenuItem {
    state: DiffDictionary,
    children: LazyChild<StateCollection<MenuItem>>,
}

impl MenuItem {
    pub fn new(text: &str) -> Self {
        let mut item = Self::default();
        item.set_text(text);
        item
    }

    pub fn with_url(text: &str, navigate_url: &str) -> Self {
        let mut item = Self::new(text);
        item.set_navigate_url(navigate_url);
        item
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

    pub fn pop_out_image_url(&self) -> String {
        read_or(&self.state, "PopOutImageUrl", String::new())
    }

    pub fn set_pop_out_image_url(&mut self, url: &str) {
        self.state.set("PopOutImageUrl", url);
    }

    pub fn separator_image_url(&self) -> String {
        read_or(&self.state, "SeparatorImageUrl", String::new())
    }

    pub fn set_separator_image_url(&mut self, url: &str) {
        self.state.set("SeparatorImageUrl", url);
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

    pub fn selectable(&self) -> bool {
        read_or(&self.state, "Selectable", true)
    }

    pub fn set_selectable(&mut self, selectable: bool) {
        self.state.set("Selectable", selectable);
    }

    pub fn enabled(&self) -> bool {
        read_or(&self.state, "Enabled", true)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.state.set("Enabled", enabled);
    }

    pub fn children(&self) -> Option<&StateCollection<MenuItem>> {
        self.children.get()
    }

    pub fn children_mut(&mut self) -> &mut StateCollection<MenuItem> {
        let tracking = self.is_tracking();
        self.children.get_or_create(tracking)
    }

    pub fn has_children(&self) -> bool {
        self.children().map(|c| !c.is_empty()).unwrap_or(false)
    }

    /// Follow a path of child indices from this item
    pub fn descendant(&self, path: &[usize]) -> Option<&MenuItem> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.children()?.get(*first)?.descendant(rest),
        }
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut MenuItem> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.children.get_mut()?.get_mut(*first)?.descendant_mut(rest),
        }
    }
}

impl StatefulNode for MenuItem {
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

        let tracking = self.is_tracking();
        let saved = children.into_iter().next().flatten();
        self.children.load(saved, tracking)
    }

    fn force_dirty(&mut self) {
        self.state.force_dirty();
        self.children.force_dirty();
    }
}
