//! Small value types persisted by controls
//!
//! Each type converts into a [`StateValue`] for storage and back through
//! [`FromStateValue`], so it can sit in a dictionary entry like any scalar.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use viewstate_core::{FromStateValue, StateValue, ViewStateError, ViewStateResult};
use viewstate_state::DiffDictionary;

/// Read a property, falling back to `default` when the stored value has the
/// wrong type
pub(crate) fn read_or<T: FromStateValue>(bag: &DiffDictionary, key: &str, default: T) -> T {
    convert_or(key, bag.get_value(key), default)
}

/// Convert an already looked-up value, with the same fallback as [`read_or`]
pub(crate) fn convert_or<T: FromStateValue>(
    key: &str,
    value: Option<&StateValue>,
    default: T,
) -> T {
    match value {
        None => default,
        Some(value) => T::from_state_value(value).unwrap_or_else(|| {
            warn!(
                key,
                expected = T::TYPE_NAME,
                found = value.type_name(),
                "stored value has wrong type, using default"
            );
            default
        }),
    }
}

/// Read a string property that stands in for `fallback` when unset, and
/// the other way round (item text and value)
pub(crate) fn read_either(bag: &DiffDictionary, key: &str, fallback: &str) -> String {
    match bag.get_value(key).and_then(|v| v.as_str()) {
        Some(text) => text.to_string(),
        None => read_or(bag, fallback, String::new()),
    }
}

// ============ Color ============

/// A color as stored by a style
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    #[default]
    Empty,
    Named(String),
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn is_empty(&self) -> bool {
        matches!(self, Color::Empty)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Color::Named(name.into())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Empty => Ok(()),
            Color::Named(name) => write!(f, "{}", name),
            Color::Rgb(r, g, b) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
        }
    }
}

impl FromStr for Color {
    type Err = ViewStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Color::Empty);
        }
        let Some(hex) = s.strip_prefix('#') else {
            return Ok(Color::Named(s.to_string()));
        };
        if hex.len() != 6 {
            return Err(ViewStateError::InvalidValue(format!("not a color: {}", s)));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ViewStateError::InvalidValue(format!("not a color: {}", s)))
        };
        Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl From<Color> for StateValue {
    fn from(color: Color) -> Self {
        StateValue::Str(color.to_string())
    }
}

impl FromStateValue for Color {
    const TYPE_NAME: &'static str = "color";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_str()?.parse().ok()
    }
}

// ============ Unit ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitType {
    #[default]
    Pixel,
    Point,
    Pica,
    Inch,
    Mm,
    Cm,
    Percentage,
    Em,
    Ex,
}

impl UnitType {
    fn suffix(self) -> &'static str {
        match self {
            UnitType::Pixel => "px",
            UnitType::Point => "pt",
            UnitType::Pica => "pc",
            UnitType::Inch => "in",
            UnitType::Mm => "mm",
            UnitType::Cm => "cm",
            UnitType::Percentage => "%",
            UnitType::Em => "em",
            UnitType::Ex => "ex",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        let unit = match suffix.to_ascii_lowercase().as_str() {
            "" | "px" => UnitType::Pixel,
            "pt" => UnitType::Point,
            "pc" => UnitType::Pica,
            "in" => UnitType::Inch,
            "mm" => UnitType::Mm,
            "cm" => UnitType::Cm,
            "%" => UnitType::Percentage,
            "em" => UnitType::Em,
            "ex" => UnitType::Ex,
            _ => return None,
        };
        Some(unit)
    }
}

/// A length; `Unit::EMPTY` means "not specified"
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Unit {
    value: f64,
    unit_type: Option<UnitType>,
}

impl Unit {
    pub const EMPTY: Unit = Unit {
        value: 0.0,
        unit_type: None,
    };

    pub fn new(value: f64, unit_type: UnitType) -> Self {
        Self {
            value,
            unit_type: Some(unit_type),
        }
    }

    pub fn pixel(value: f64) -> Self {
        Self::new(value, UnitType::Pixel)
    }

    pub fn point(value: f64) -> Self {
        Self::new(value, UnitType::Point)
    }

    pub fn percentage(value: f64) -> Self {
        Self::new(value, UnitType::Percentage)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit_type(&self) -> UnitType {
        self.unit_type.unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.unit_type.is_none()
    }

    /// Reject negative lengths for properties that cannot hold them
    pub(crate) fn non_negative(self, property: &str) -> ViewStateResult<Self> {
        if self.value < 0.0 {
            return Err(ViewStateError::InvalidValue(format!(
                "{} must not be negative, got {}",
                property, self
            )));
        }
        Ok(self)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit_type {
            None => Ok(()),
            Some(unit_type) => write!(f, "{}{}", self.value, unit_type.suffix()),
        }
    }
}

impl FromStr for Unit {
    type Err = ViewStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Unit::EMPTY);
        }
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(s.len());
        let (number, suffix) = s.split_at(split);
        let value: f64 = number
            .parse()
            .map_err(|_| ViewStateError::InvalidValue(format!("not a unit: {}", s)))?;
        let unit_type = UnitType::from_suffix(suffix.trim())
            .ok_or_else(|| ViewStateError::InvalidValue(format!("unknown unit in {}", s)))?;
        Ok(Unit::new(value, unit_type))
    }
}

impl From<Unit> for StateValue {
    fn from(unit: Unit) -> Self {
        StateValue::Str(unit.to_string())
    }
}

impl FromStateValue for Unit {
    const TYPE_NAME: &'static str = "unit";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_str()?.parse().ok()
    }
}

// ============ FontUnit ============

/// A font size, either a named size or an explicit length
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum FontUnit {
    #[default]
    NotSet,
    Smaller,
    Larger,
    XXSmall,
    XSmall,
    Small,
    Medium,
    Large,
    XLarge,
    XXLarge,
    Size(Unit),
}

const NAMED_SIZES: [(FontUnit, &str); 9] = [
    (FontUnit::Smaller, "Smaller"),
    (FontUnit::Larger, "Larger"),
    (FontUnit::XXSmall, "XX-Small"),
    (FontUnit::XSmall, "X-Small"),
    (FontUnit::Small, "Small"),
    (FontUnit::Medium, "Medium"),
    (FontUnit::Large, "Large"),
    (FontUnit::XLarge, "X-Large"),
    (FontUnit::XXLarge, "XX-Large"),
];

impl FontUnit {
    pub fn points(value: f64) -> Self {
        FontUnit::Size(Unit::point(value))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FontUnit::NotSet => true,
            FontUnit::Size(unit) => unit.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for FontUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontUnit::NotSet => Ok(()),
            FontUnit::Size(unit) => write!(f, "{}", unit),
            named => {
                let name = NAMED_SIZES
                    .iter()
                    .find(|(size, _)| size == named)
                    .map(|(_, name)| *name)
                    .unwrap_or_default();
                write!(f, "{}", name)
            }
        }
    }
}

impl FromStr for FontUnit {
    type Err = ViewStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(FontUnit::NotSet);
        }
        if let Some((size, _)) = NAMED_SIZES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
        {
            return Ok(*size);
        }
        Ok(FontUnit::Size(s.parse()?))
    }
}

impl From<FontUnit> for StateValue {
    fn from(size: FontUnit) -> Self {
        StateValue::Str(size.to_string())
    }
}

impl FromStateValue for FontUnit {
    const TYPE_NAME: &'static str = "font unit";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        value.as_str()?.parse().ok()
    }
}

// ============ BorderStyle ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BorderStyle {
    #[default]
    NotSet,
    None,
    Dotted,
    Dashed,
    Solid,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

const BORDER_STYLES: [BorderStyle; 10] = [
    BorderStyle::NotSet,
    BorderStyle::None,
    BorderStyle::Dotted,
    BorderStyle::Dashed,
    BorderStyle::Solid,
    BorderStyle::Double,
    BorderStyle::Groove,
    BorderStyle::Ridge,
    BorderStyle::Inset,
    BorderStyle::Outset,
];

impl From<BorderStyle> for StateValue {
    fn from(style: BorderStyle) -> Self {
        StateValue::Int(style as i64)
    }
}

impl FromStateValue for BorderStyle {
    const TYPE_NAME: &'static str = "border style";

    fn from_state_value(value: &StateValue) -> Option<Self> {
        let index = usize::try_from(value.as_int()?).ok()?;
        BORDER_STYLES.get(index).copied()
    }
}
