//! Bitmask-backed visual style
//!
//! Which properties a style carries is kept in a [`StyleBits`] mask, so an
//! untouched style answers `is_empty` and saves nothing without probing its
//! dictionary. Font properties live in the same field set and are reached
//! through the borrowed [`FontInfo`] / [`FontInfoMut`] views.

use bitflags::bitflags;
use viewstate_core::{FromStateValue, Payload, StateValue, StatefulNode, ViewStateResult};
use viewstate_state::BitTrackedFieldSet;

use crate::values::{convert_or, BorderStyle, Color, FontUnit, Unit};

bitflags! {
    /// Style properties, one bit each
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StyleBits: u32 {
        const CSS_CLASS = 0x2;
        const FORE_COLOR = 0x4;
        const BACK_COLOR = 0x8;
        const BORDER_COLOR = 0x10;
        const BORDER_WIDTH = 0x20;
        const BORDER_STYLE = 0x40;
        const HEIGHT = 0x80;
        const WIDTH = 0x100;
        const FONT_NAMES = 0x200;
        const FONT_SIZE = 0x400;
        const FONT_BOLD = 0x800;
        const FONT_ITALIC = 0x1000;
        const FONT_UNDERLINE = 0x2000;
        const FONT_OVERLINE = 0x4000;
        const FONT_STRIKEOUT = 0x8000;

        const FONT_ALL = 0xFE00;
    }
}

/// Field bits that hold a single property
fn property_bits() -> impl Iterator<Item = StyleBits> {
    StyleBits::all()
        .iter()
        .filter(|bits| bits.bits().count_ones() == 1)
}

#[derive(Debug, Clone, Default)]
pub struct Style {
    fields: BitTrackedFieldSet<StyleBits>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields without their presence bit read as `default`
    fn read<T: FromStateValue>(&self, field: StyleBits, default: T) -> T {
        convert_or(
            &BitTrackedFieldSet::<StyleBits>::field_key(field),
            self.fields.get(field),
            default,
        )
    }

    pub fn is_set(&self, field: StyleBits) -> bool {
        self.fields.is_set(field)
    }

    /// True iff no property has been set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &BitTrackedFieldSet<StyleBits> {
        &self.fields
    }

    pub fn css_class(&self) -> String {
        self.read(StyleBits::CSS_CLASS, String::new())
    }

    pub fn set_css_class(&mut self, class: &str) {
        self.fields.put(StyleBits::CSS_CLASS, class);
    }

    pub fn fore_color(&self) -> Color {
        self.read(StyleBits::FORE_COLOR, Color::Empty)
    }

    pub fn set_fore_color(&mut self, color: Color) {
        self.fields.put(StyleBits::FORE_COLOR, color);
    }

    pub fn back_color(&self) -> Color {
        self.read(StyleBits::BACK_COLOR, Color::Empty)
    }

    pub fn set_back_color(&mut self, color: Color) {
        self.fields.put(StyleBits::BACK_COLOR, color);
    }

    pub fn border_color(&self) -> Color {
        self.read(StyleBits::BORDER_COLOR, Color::Empty)
    }

    pub fn set_border_color(&mut self, color: Color) {
        self.fields.put(StyleBits::BORDER_COLOR, color);
    }

    pub fn border_style(&self) -> BorderStyle {
        self.read(StyleBits::BORDER_STYLE, BorderStyle::NotSet)
    }

    pub fn set_border_style(&mut self, style: BorderStyle) {
        self.fields.put(StyleBits::BORDER_STYLE, style);
    }

    pub fn border_width(&self) -> Unit {
        self.read(StyleBits::BORDER_WIDTH, Unit::EMPTY)
    }

    pub fn set_border_width(&mut self, width: Unit) -> ViewStateResult<()> {
        let width = width.non_negative("BorderWidth")?;
        self.fields.put(StyleBits::BORDER_WIDTH, width);
        Ok(())
    }

    pub fn height(&self) -> Unit {
        self.read(StyleBits::HEIGHT, Unit::EMPTY)
    }

    pub fn set_height(&mut self, height: Unit) -> ViewStateResult<()> {
        let height = height.non_negative("Height")?;
        self.fields.put(StyleBits::HEIGHT, height);
        Ok(())
    }

    pub fn width(&self) -> Unit {
        self.read(StyleBits::WIDTH, Unit::EMPTY)
    }

    pub fn set_width(&mut self, width: Unit) -> ViewStateResult<()> {
        let width = width.non_negative("Width")?;
        self.fields.put(StyleBits::WIDTH, width);
        Ok(())
    }

    pub fn font(&self) -> FontInfo<'_> {
        FontInfo { style: self }
    }

    pub fn font_mut(&mut self) -> FontInfoMut<'_> {
        FontInfoMut { style: self }
    }

    /// Stored value for `field` when it is set and not blank
    fn carried_value(&self, field: StyleBits) -> Option<StateValue> {
        let value = self.fields.get(field)?;
        match value.as_str() {
            Some("") => None,
            _ => Some(value.clone()),
        }
    }

    fn copy_fields(&mut self, other: &Style, mask: StyleBits, only_unset: bool) {
        if other.is_empty() {
            return;
        }
        for field in property_bits().filter(|f| mask.contains(*f)) {
            if only_unset && self.is_set(field) {
                continue;
            }
            if let Some(value) = other.carried_value(field) {
                self.fields.put(field, value);
            }
        }
    }

    /// Overwrite this style with every property set on `other`
    pub fn copy_from(&mut self, other: &Style) {
        self.copy_fields(other, StyleBits::all(), false);
    }

    /// Take properties from `other` only where this style has none
    pub fn merge_with(&mut self, other: &Style) {
        self.copy_fields(other, StyleBits::all(), true);
    }

    /// Clear every property
    pub fn reset(&mut self) {
        self.fields.reset();
    }
}

impl StatefulNode for Style {
    fn is_tracking(&self) -> bool {
        self.fields.is_tracking()
    }

    fn begin_tracking(&mut self) {
        self.fields.begin_tracking();
    }

    fn save(&self) -> Option<Payload> {
        self.fields.save()
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        self.fields.load(payload)
    }

    fn force_dirty(&mut self) {
        self.fields.force_dirty();
    }
}

/// Read-only view of a style's font properties
#[derive(Clone, Copy)]
pub struct FontInfo<'a> {
    style: &'a Style,
}

impl<'a> FontInfo<'a> {
    pub fn names(&self) -> Vec<String> {
        self.style.read(StyleBits::FONT_NAMES, Vec::new())
    }

    /// First font name, empty when none is set
    pub fn name(&self) -> String {
        self.names().into_iter().next().unwrap_or_default()
    }

    pub fn size(&self) -> FontUnit {
        self.style.read(StyleBits::FONT_SIZE, FontUnit::NotSet)
    }

    pub fn bold(&self) -> bool {
        self.style.read(StyleBits::FONT_BOLD, false)
    }

    pub fn italic(&self) -> bool {
        self.style.read(StyleBits::FONT_ITALIC, false)
    }

    pub fn underline(&self) -> bool {
        self.style.read(StyleBits::FONT_UNDERLINE, false)
    }

    pub fn overline(&self) -> bool {
        self.style.read(StyleBits::FONT_OVERLINE, false)
    }

    pub fn strikeout(&self) -> bool {
        self.style.read(StyleBits::FONT_STRIKEOUT, false)
    }

    pub fn is_empty(&self) -> bool {
        !self.style.fields.any_set(StyleBits::FONT_ALL)
    }
}

/// Mutable view of a style's font properties
pub struct FontInfoMut<'a> {
    style: &'a mut Style,
}

impl<'a> FontInfoMut<'a> {
    pub fn set_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.style.fields.put(StyleBits::FONT_NAMES, names);
    }

    /// Replace the font list with a single name
    pub fn set_name(&mut self, name: &str) {
        self.set_names([name]);
    }

    pub fn set_size(&mut self, size: FontUnit) -> ViewStateResult<()> {
        if let FontUnit::Size(unit) = size {
            unit.non_negative("FontSize")?;
        }
        self.style.fields.put(StyleBits::FONT_SIZE, size);
        Ok(())
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.style.fields.put(StyleBits::FONT_BOLD, bold);
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.style.fields.put(StyleBits::FONT_ITALIC, italic);
    }

    pub fn set_underline(&mut self, underline: bool) {
        self.style.fields.put(StyleBits::FONT_UNDERLINE, underline);
    }

    pub fn set_overline(&mut self, overline: bool) {
        self.style.fields.put(StyleBits::FONT_OVERLINE, overline);
    }

    pub fn set_strikeout(&mut self, strikeout: bool) {
        self.style.fields.put(StyleBits::FONT_STRIKEOUT, strikeout);
    }

    /// Copy every font property set on `other`
    pub fn copy_from(&mut self, other: &Style) {
        self.style.copy_fields(other, StyleBits::FONT_ALL, false);
    }

    pub fn merge_with(&mut self, other: &Style) {
        self.style.copy_fields(other, StyleBits::FONT_ALL, true);
    }

    /// Clear font properties only
    pub fn reset(&mut self) {
        for field in property_bits().filter(|f| StyleBits::FONT_ALL.contains(*f)) {
            self.style.fields.clear(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewstate_core::{DictDiff, ViewStateError};
    use viewstate_state::BIT_STATE_KEY;

    #[test]
    fn test_new_style_is_empty() {
        let mut style = Style::new();
        assert!(style.is_empty());
        assert!(style.back_color().is_empty());
        assert!(style.width().is_empty());
        style.begin_tracking();
        assert!(style.save().is_none());
    }

    #[test]
    fn test_tracked_change_saves_value_and_mask() {
        let mut style = Style::new();
        style.set_css_class("default");
        style.begin_tracking();
        style.set_back_color(Color::named("Red"));

        let payload = style.save().unwrap();
        let diff = payload.as_diff().unwrap();
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.value("BACK_COLOR"), Some(&StateValue::from("Red")));
        assert_eq!(
            diff.value(BIT_STATE_KEY),
            Some(&StateValue::Int(StyleBits::BACK_COLOR.bits() as i64))
        );
    }

    #[test]
    fn test_round_trip_into_fresh_style() {
        let mut style = Style::new();
        style.begin_tracking();
        style.set_width(Unit::pixel(120.0)).unwrap();
        style.font_mut().set_bold(true);
        style.font_mut().set_names(["Verdana", "Arial"]);

        let mut fresh = Style::new();
        fresh.load(style.save()).unwrap();
        fresh.begin_tracking();

        assert_eq!(fresh.width(), Unit::pixel(120.0));
        assert!(fresh.font().bold());
        assert_eq!(fresh.font().name(), "Verdana");
        assert!(fresh.is_set(StyleBits::FONT_NAMES));
        assert!(!fresh.is_set(StyleBits::HEIGHT));
    }

    #[test]
    fn test_negative_lengths_rejected() {
        let mut style = Style::new();
        assert!(matches!(
            style.set_height(Unit::pixel(-5.0)),
            Err(ViewStateError::InvalidValue(_))
        ));
        assert!(style.set_border_width(Unit::pixel(-0.5)).is_err());
        assert!(style.font_mut().set_size(FontUnit::points(-2.0)).is_err());
        assert!(style.is_empty());
    }

    #[test]
    fn test_copy_from_skips_blank_values() {
        let mut source = Style::new();
        source.set_back_color(Color::Empty);
        source.set_css_class("grid");
        source.font_mut().set_italic(true);

        let mut target = Style::new();
        target.set_back_color(Color::named("Blue"));
        target.copy_from(&source);

        assert_eq!(target.back_color(), Color::named("Blue"));
        assert_eq!(target.css_class(), "grid");
        assert!(target.font().italic());
    }

    #[test]
    fn test_merge_with_keeps_existing() {
        let mut source = Style::new();
        source.set_css_class("from-source");
        source.set_fore_color(Color::Rgb(0, 0, 0));

        let mut target = Style::new();
        target.set_css_class("mine");
        target.merge_with(&source);

        assert_eq!(target.css_class(), "mine");
        assert_eq!(target.fore_color(), Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_reset_under_tracking_reports_removals() {
        let mut style = Style::new();
        style.set_css_class("default");
        style.begin_tracking();
        style.reset();

        assert!(style.is_empty());
        let payload = style.save().unwrap();
        let diff = payload.as_diff().unwrap();
        assert!(diff.get("CSS_CLASS").unwrap().is_removal());
    }

    #[test]
    fn test_reset_of_defaults_round_trips_to_empty() {
        let build = || {
            let mut style = Style::new();
            style.set_css_class("default");
            style
        };
        let mut style = build();
        style.begin_tracking();
        style.reset();

        let mut fresh = build();
        fresh.load(style.save()).unwrap();
        assert!(fresh.is_empty());
        assert!(!fresh.is_set(StyleBits::CSS_CLASS));
        assert_eq!(fresh.css_class(), "");
    }

    #[test]
    fn test_value_without_presence_bit_reads_as_unset() {
        let mut style = Style::new();
        let payload = Payload::Diff(DictDiff::from_pairs([("BACK_COLOR", "Red")]));
        style.load(Some(payload)).unwrap();

        assert!(!style.is_set(StyleBits::BACK_COLOR));
        assert_eq!(style.back_color(), Color::Empty);
    }

    #[test]
    fn test_named_color_with_spaces_reads_back() {
        let mut style = Style::new();
        style.set_back_color(Color::named("Light Gray"));
        assert_eq!(style.back_color(), Color::named("Light Gray"));
    }

    #[test]
    fn test_font_reset_leaves_other_properties() {
        let mut style = Style::new();
        style.set_css_class("keep");
        style.font_mut().set_bold(true);
        style.font_mut().set_size(FontUnit::Large).unwrap();
        assert!(!style.font().is_empty());

        style.font_mut().reset();
        assert!(style.font().is_empty());
        assert_eq!(style.css_class(), "keep");
    }

    #[test]
    fn test_font_copy_from_only_copies_font() {
        let mut source = Style::new();
        source.set_css_class("other");
        source.font_mut().set_underline(true);

        let mut target = Style::new();
        target.font_mut().copy_from(&source);
        assert!(target.font().underline());
        assert!(!target.is_set(StyleBits::CSS_CLASS));
    }
}
