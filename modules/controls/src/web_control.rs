//! Base state shared by styled controls

use viewstate_core::{Payload, StatefulNode, ViewStateError, ViewStateResult};
use viewstate_state::{compose, decompose, DiffDictionary, LazyChild};

use crate::style::Style;
use crate::values::read_or;

/// Saved as `[own, control style, attributes]`
#[derive(Debug, Clone, Default)]
pub struct WebControl {
    state: DiffDictionary,
    style: LazyChild<Style>,
    attributes: LazyChild<DiffDictionary>,
}

impl WebControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(&self) -> bool {
        read_or(&self.state, "Enabled", true)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.state.set("Enabled", enabled);
    }

    pub fn tool_tip(&self) -> String {
        read_or(&self.state, "ToolTip", String::new())
    }

    pub fn set_tool_tip(&mut self, tip: &str) {
        self.state.set("ToolTip", tip);
    }

    pub fn access_key(&self) -> String {
        read_or(&self.state, "AccessKey", String::new())
    }

    /// At most one character
    pub fn set_access_key(&mut self, key: &str) -> ViewStateResult<()> {
        if key.chars().count() > 1 {
            return Err(ViewStateError::InvalidValue(format!(
                "access key must be a single character, got {:?}",
                key
            )));
        }
        self.state.set("AccessKey", key);
        Ok(())
    }

    pub fn tab_index(&self) -> i16 {
        read_or(&self.state, "TabIndex", 0i16)
    }

    pub fn set_tab_index(&mut self, index: i16) {
        self.state.set("TabIndex", index);
    }

    pub fn has_control_style(&self) -> bool {
        self.style.is_created()
    }

    pub fn control_style(&self) -> Option<&Style> {
        self.style.get()
    }

    pub fn control_style_mut(&mut self) -> &mut Style {
        let tracking = self.is_tracking();
        self.style.get_or_create(tracking)
    }

    /// Copy every set property of `style` onto this control's style
    pub fn apply_style(&mut self, style: &Style) {
        if !style.is_empty() {
            self.control_style_mut().copy_from(style);
        }
    }

    /// Fill in properties this control's style does not set yet
    pub fn merge_style(&mut self, style: &Style) {
        if !style.is_empty() {
            self.control_style_mut().merge_with(style);
        }
    }

    /// Free-form markup attributes
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .get()
            .and_then(|attrs| attrs.get_value(name))
            .and_then(|value| value.as_str())
            .map(str::to_string)
    }

    pub fn attributes(&self) -> Option<&DiffDictionary> {
        self.attributes.get()
    }

    pub fn attributes_mut(&mut self) -> &mut DiffDictionary {
        let tracking = self.is_tracking();
        self.attributes
            .get_or_create_with(tracking, || DiffDictionary::with_ignore_case(true))
    }
}

impl StatefulNode for WebControl {
    fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    fn begin_tracking(&mut self) {
        self.state.begin_tracking();
        self.style.begin_tracking();
        self.attributes.begin_tracking();
    }

    fn save(&self) -> Option<Payload> {
        compose(
            self.state.save(),
            vec![self.style.save(), self.attributes.save()],
        )
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        let Some(payload) = payload else {
            return Ok(());
        };
        let (own, children) = decompose(payload, 2)?;
        let mut children = children.into_iter();
        let style = children.next().flatten();
        let attributes = children.next().flatten();

        self.state.load(own)?;
        let tracking = self.is_tracking();
        self.style.load(style, tracking)?;
        self.attributes.load_with(attributes, tracking, || {
            DiffDictionary::with_ignore_case(true)
        })
    }

    fn force_dirty(&mut self) {
        self.state.force_dirty();
        self.style.force_dirty();
        self.attributes.force_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Color, Unit};

    #[test]
    fn test_defaults() {
        let control = WebControl::new();
        assert!(control.enabled());
        assert_eq!(control.tab_index(), 0);
        assert!(!control.has_control_style());
        assert_eq!(control.attribute("onclick"), None);
    }

    #[test]
    fn test_access_key_must_be_single_char() {
        let mut control = WebControl::new();
        assert!(control.set_access_key("ab").is_err());
        control.set_access_key("a").unwrap();
        assert_eq!(control.access_key(), "a");
    }

    #[test]
    fn test_style_and_attributes_round_trip() {
        let mut control = WebControl::new();
        control.begin_tracking();
        control.set_tab_index(4);
        control.control_style_mut().set_width(Unit::pixel(80.0)).unwrap();
        control.attributes_mut().set("data-role", "menu");

        let payload = control.save().unwrap();
        assert_eq!(payload.as_tuple().unwrap().len(), 3);

        let mut fresh = WebControl::new();
        fresh.load(Some(payload)).unwrap();
        fresh.begin_tracking();

        assert_eq!(fresh.tab_index(), 4);
        assert_eq!(fresh.control_style().unwrap().width(), Unit::pixel(80.0));
        assert_eq!(fresh.attribute("DATA-ROLE").as_deref(), Some("menu"));
        assert!(fresh.save().is_none());
    }

    #[test]
    fn test_attributes_only_change() {
        let mut control = WebControl::new();
        control.begin_tracking();
        control.attributes_mut().set("title", "x");

        let payload = control.save().unwrap();
        assert!(payload.slot(0).is_none());
        assert!(payload.slot(1).is_none());
        assert!(payload.slot(2).is_some());
    }

    #[test]
    fn test_merge_style_keeps_own_values() {
        let mut theme = Style::new();
        theme.set_back_color(Color::named("White"));
        theme.set_css_class("themed");

        let mut control = WebControl::new();
        control.control_style_mut().set_css_class("own");
        control.merge_style(&theme);

        let style = control.control_style().unwrap();
        assert_eq!(style.css_class(), "own");
        assert_eq!(style.back_color(), Color::named("White"));
    }
}
