//! Selectable item lists

use tracing::debug;
use viewstate_core::{Payload, StatefulNode, ViewStateError, ViewStateResult};
use viewstate_state::{compose, decompose, DiffDictionary, LazyChild, StateCollection};

use crate::values::{read_either, read_or};
use crate::web_control::WebControl;

/// One entry of a list control
///
/// Text and value stand in for each other when only one is set.
#[derive(Debug, Clone, Default)]
pub struct ListItem {
    state: DiffDictionary,
}

impl ListItem {
    pub fn new(text: &str) -> Self {
        let mut item = Self::default();
        item.set_text(text);
        item
    }

    pub fn with_value(text: &str, value: &str) -> Self {
        let mut item = Self::new(text);
        item.set_value(value);
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

    pub fn selected(&self) -> bool {
        read_or(&self.state, "Selected", false)
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.state.set("Selected", selected);
    }

    pub fn enabled(&self) -> bool {
        read_or(&self.state, "Enabled", true)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.state.set("Enabled", enabled);
    }
}

impl StatefulNode for ListItem {
    fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    fn begin_tracking(&mut self) {
        self.state.begin_tracking();
    }

    fn save(&self) -> Option<Payload> {
        self.state.save()
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        self.state.load(payload)
    }

    fn force_dirty(&mut self) {
        self.state.force_dirty();
    }
}

/// A control presenting a list of items with a single selection
///
/// Saved as `[own, base control, items]`.
#[derive(Debug, Clone, Default)]
pub struct ListControl {
    state: DiffDictionary,
    base: LazyChild<WebControl>,
    items: LazyChild<StateCollection<ListItem>>,
}

impl ListControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_postback(&self) -> bool {
        read_or(&self.state, "AutoPostBack", false)
    }

    pub fn set_auto_postback(&mut self, enabled: bool) {
        self.state.set("AutoPostBack", enabled);
    }

    pub fn data_text_field(&self) -> String {
        read_or(&self.state, "DataTextField", String::new())
    }

    pub fn set_data_text_field(&mut self, field: &str) {
        self.state.set("DataTextField", field);
    }

    pub fn data_value_field(&self) -> String {
        read_or(&self.state, "DataValueField", String::new())
    }

    pub fn set_data_value_field(&mut self, field: &str) {
        self.state.set("DataValueField", field);
    }

    pub fn append_data_bound_items(&self) -> bool {
        read_or(&self.state, "AppendDataBoundItems", false)
    }

    pub fn set_append_data_bound_items(&mut self, append: bool) {
        self.state.set("AppendDataBoundItems", append);
    }

    pub fn base(&self) -> Option<&WebControl> {
        self.base.get()
    }

    pub fn base_mut(&mut self) -> &mut WebControl {
        let tracking = self.is_tracking();
        self.base.get_or_create(tracking)
    }

    pub fn items(&self) -> Option<&StateCollection<ListItem>> {
        self.items.get()
    }

    pub fn items_mut(&mut self) -> &mut StateCollection<ListItem> {
        let tracking = self.is_tracking();
        self.items.get_or_create(tracking)
    }

    pub fn item_count(&self) -> usize {
        self.items().map(StateCollection::len).unwrap_or(0)
    }

    /// Index of the selected item, -1 when nothing is selected
    pub fn selected_index(&self) -> i32 {
        read_or(&self.state, "SelectedIndex", -1i32)
    }

    /// Select by position; -1 clears the selection
    pub fn set_selected_index(&mut self, index: i32) -> ViewStateResult<()> {
        let count = self.item_count();
        let in_range = usize::try_from(index).map(|i| i < count).unwrap_or(index == -1);
        if !in_range {
            return Err(ViewStateError::InvalidValue(format!(
                "selected index {} out of range for {} items",
                index, count
            )));
        }

        debug!(index, "list selection changed");
        self.state.set("SelectedIndex", index);
        let selected = usize::try_from(index).ok();
        if let Some(items) = self.items.get_mut() {
            for (i, item) in items.iter_mut().enumerate() {
                let is_selected = Some(i) == selected;
                if item.selected() != is_selected {
                    item.set_selected(is_selected);
                }
            }
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) -> ViewStateResult<()> {
        self.set_selected_index(-1)
    }

    pub fn selected_item(&self) -> Option<&ListItem> {
        let index = usize::try_from(self.selected_index()).ok()?;
        self.items()?.get(index)
    }

    pub fn selected_value(&self) -> Option<String> {
        self.selected_item().map(ListItem::value)
    }

    /// Select the first item whose value is `value`
    pub fn select_by_value(&mut self, value: &str) -> ViewStateResult<()> {
        let position = self
            .items()
            .and_then(|items| items.iter().position(|item| item.value() == value))
            .ok_or_else(|| ViewStateError::InvalidValue(format!("no item with value {}", value)))?;
        let index = i32::try_from(position)
            .map_err(|_| ViewStateError::InvalidValue(format!("item index {} too large", position)))?;
        self.set_selected_index(index)
    }
}

impl StatefulNode for ListControl {
    fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    fn begin_tracking(&mut self) {
        self.state.begin_tracking();
        self.base.begin_tracking();
        self.items.begin_tracking();
    }

    fn save(&self) -> Option<Payload> {
        compose(self.state.save(), vec![self.base.save(), self.items.save()])
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        let Some(payload) = payload else {
            return Ok(());
        };
        let (own, children) = decompose(payload, 2)?;
        let mut children = children.into_iter();

        self.state.load(own)?;
        let tracking = self.is_tracking();
        self.base.load(children.next().flatten(), tracking)?;
        self.items.load(children.next().flatten(), tracking)
    }

    fn force_dirty(&mut self) {
        self.state.force_dirty();
        self.base.force_dirty();
        self.items.force_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> ListControl {
        let mut list = ListControl::new();
        let items = list.items_mut();
        items.push(ListItem::with_value("Red", "r"));
        items.push(ListItem::with_value("Green", "g"));
        items.push(ListItem::new("Blue"));
        list
    }

    #[test]
    fn test_text_and_value_fall_back() {
        let item = ListItem::new("Only text");
        assert_eq!(item.value(), "Only text");

        let mut item = ListItem::default();
        item.set_value("v");
        assert_eq!(item.text(), "v");
    }

    #[test]
    fn test_selection_updates_items() {
        let mut list = colors();
        list.set_selected_index(1).unwrap();
        assert_eq!(list.selected_value().as_deref(), Some("g"));
        assert!(list.items().unwrap().get(1).unwrap().selected());

        list.select_by_value("Blue").unwrap();
        assert_eq!(list.selected_index(), 2);
        assert!(!list.items().unwrap().get(1).unwrap().selected());

        list.clear_selection().unwrap();
        assert!(list.selected_item().is_none());
    }

    #[test]
    fn test_selection_out_of_range() {
        let mut list = colors();
        assert!(list.set_selected_index(3).is_err());
        assert!(list.set_selected_index(-2).is_err());
        assert!(list.select_by_value("missing").is_err());
    }

    #[test]
    fn test_tracked_selection_round_trip() {
        let mut list = colors();
        list.begin_tracking();
        list.set_selected_index(0).unwrap();
        list.items_mut().push(ListItem::new("Black"));

        let payload = list.save().unwrap();

        let mut fresh = colors();
        fresh.load(Some(payload)).unwrap();
        fresh.begin_tracking();

        assert_eq!(fresh.item_count(), 4);
        assert_eq!(fresh.selected_index(), 0);
        assert!(fresh.items().unwrap().get(0).unwrap().selected());
        assert_eq!(fresh.items().unwrap().get(3).unwrap().text(), "Black");
        assert!(fresh.save().is_none());
    }
}
