//! Data-bound column definition with four nested styles

use viewstate_core::{Payload, StatefulNode, ViewStateResult};
use viewstate_state::{compose, decompose, DiffDictionary, LazyChild};

use crate::style::Style;
use crate::values::read_or;

/// Number of style slots after the field's own state
const STYLE_SLOTS: usize = 4;

/// A grid column: text, visibility flags and per-region styles
///
/// Saved as `[own, control style, footer style, header style, item style]`.
#[derive(Debug, Clone, Default)]
pub struct DataControlField {
    state: DiffDictionary,
    control_style: LazyChild<Style>,
    footer_style: LazyChild<Style>,
    header_style: LazyChild<Style>,
    item_style: LazyChild<Style>,
}

impl DataControlField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DiffDictionary {
        &self.state
    }

    pub fn header_text(&self) -> String {
        read_or(&self.state, "HeaderText", String::new())
    }

    pub fn set_header_text(&mut self, text: &str) {
        self.state.set("HeaderText", text);
    }

    pub fn footer_text(&self) -> String {
        read_or(&self.state, "FooterText", String::new())
    }

    pub fn set_footer_text(&mut self, text: &str) {
        self.state.set("FooterText", text);
    }

    pub fn header_image_url(&self) -> String {
        read_or(&self.state, "HeaderImageUrl", String::new())
    }

    pub fn set_header_image_url(&mut self, url: &str) {
        self.state.set("HeaderImageUrl", url);
    }

    pub fn sort_expression(&self) -> String {
        read_or(&self.state, "SortExpression", String::new())
    }

    pub fn set_sort_expression(&mut self, expression: &str) {
        self.state.set("SortExpression", expression);
    }

    pub fn accessible_header_text(&self) -> String {
        read_or(&self.state, "AccessibleHeaderText", String::new())
    }

    pub fn set_accessible_header_text(&mut self, text: &str) {
        self.state.set("AccessibleHeaderText", text);
    }

    pub fn show_header(&self) -> bool {
        read_or(&self.state, "ShowHeader", true)
    }

    pub fn set_show_header(&mut self, show: bool) {
        self.state.set("ShowHeader", show);
    }

    pub fn insert_visible(&self) -> bool {
        read_or(&self.state, "InsertVisible", true)
    }

    pub fn set_insert_visible(&mut self, visible: bool) {
        self.state.set("InsertVisible", visible);
    }

    pub fn visible(&self) -> bool {
        read_or(&self.state, "Visible", true)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.state.set("Visible", visible);
    }

    pub fn control_style(&self) -> Option<&Style> {
        self.control_style.get()
    }

    pub fn control_style_mut(&mut self) -> &mut Style {
        let tracking = self.is_tracking();
        self.control_style.get_or_create(tracking)
    }

    pub fn footer_style(&self) -> Option<&Style> {
        self.footer_style.get()
    }

    pub fn footer_style_mut(&mut self) -> &mut Style {
        let tracking = self.is_tracking();
        self.footer_style.get_or_create(tracking)
    }

    pub fn header_style(&self) -> Option<&Style> {
        self.header_style.get()
    }

    pub fn header_style_mut(&mut self) -> &mut Style {
        let tracking = self.is_tracking();
        self.header_style.get_or_create(tracking)
    }

    pub fn item_style(&self) -> Option<&Style> {
        self.item_style.get()
    }

    pub fn item_style_mut(&mut self) -> &mut Style {
        let tracking = self.is_tracking();
        self.item_style.get_or_create(tracking)
    }

    fn styles_mut(&mut self) -> [&mut LazyChild<Style>; STYLE_SLOTS] {
        [
            &mut self.control_style,
            &mut self.footer_style,
            &mut self.header_style,
            &mut self.item_style,
        ]
    }
}

impl StatefulNode for DataControlField {
    fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    fn begin_tracking(&mut self) {
        self.state.begin_tracking();
        for style in self.styles_mut() {
            style.begin_tracking();
        }
    }

    fn save(&self) -> Option<Payload> {
        compose(
            self.state.save(),
            vec![
                self.control_style.save(),
                self.footer_style.save(),
                self.header_style.save(),
                self.item_style.save(),
            ],
        )
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        let Some(payload) = payload else {
            return Ok(());
        };
        let (own, styles) = decompose(payload, STYLE_SLOTS)?;
        self.state.load(own)?;

        let tracking = self.is_tracking();
        for (slot, saved) in self.styles_mut().into_iter().zip(styles) {
            slot.load(saved, tracking)?;
        }
        Ok(())
    }

    fn force_dirty(&mut self) {
        self.state.force_dirty();
        for style in self.styles_mut() {
            style.force_dirty();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Color;

    #[test]
    fn test_defaults() {
        let field = DataControlField::new();
        assert!(field.show_header());
        assert!(field.insert_visible());
        assert!(field.visible());
        assert_eq!(field.header_text(), "");
        assert!(field.header_style().is_none());
    }

    #[test]
    fn test_header_style_change_lands_in_its_slot() {
        let mut field = DataControlField::new();
        field.begin_tracking();
        field.header_style_mut().set_css_class("hdr");

        let payload = field.save().unwrap();
        let slots = payload.as_tuple().unwrap();
        assert_eq!(slots.len(), 5);
        assert!(slots[0].is_none());
        assert!(slots[1].is_none());
        assert!(slots[2].is_none());
        assert!(slots[3].is_some());
        assert!(slots[4].is_none());
    }

    #[test]
    fn test_round_trip() {
        let mut field = DataControlField::new();
        field.set_header_text("constructed");
        field.begin_tracking();
        field.set_sort_expression("Name DESC");
        field.set_visible(false);
        field.item_style_mut().set_fore_color(Color::named("Gray"));

        let mut fresh = DataControlField::new();
        fresh.set_header_text("constructed");
        fresh.load(field.save()).unwrap();
        fresh.begin_tracking();

        assert_eq!(fresh.sort_expression(), "Name DESC");
        assert!(!fresh.visible());
        assert_eq!(fresh.header_text(), "constructed");
        assert_eq!(fresh.item_style().unwrap().fore_color(), Color::named("Gray"));
        assert!(fresh.control_style().is_none());
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let mut field = DataControlField::new();
        let err = field.load(Some(Payload::Tuple(vec![None; 3]))).unwrap_err();
        assert!(err.is_structural());
    }
}
