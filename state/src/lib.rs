//! View-state tracking engine
//!
//! Differential state for trees of stateful nodes: a dirty-tracking
//! dictionary, a bitmask-indexed field set over it, and the positional
//! composition that assembles a whole tree's changes into one payload.

pub mod bag;
pub mod bitset;
pub mod collection;
pub mod composite;
pub mod inspect;
pub mod restore;
pub mod snapshot;

pub use bag::*;
pub use bitset::*;
pub use collection::*;
pub use composite::*;
pub use inspect::*;
pub use restore::*;
pub use snapshot::*;
