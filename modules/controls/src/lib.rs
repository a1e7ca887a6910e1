//! Stateful controls
//!
//! Concrete nodes built from the view-state engine:
//! - Bitmask-backed styles with font views
//! - Data-bound columns with four nested styles
//! - Styled base controls with free-form attributes
//! - List, menu and tree controls over positional item collections

pub mod values;
pub mod style;
pub mod field;
pub mod web_control;
pub mod list;
pub mod menu;
pub mod tree;

pub use values::*;
pub use style::*;
pub use field::*;
pub use web_control::*;
pub use list::*;
pub use menu::*;
pub use tree::*;
