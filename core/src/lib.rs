//! View-state Core Library
//! 
//! Value model, payload shapes, and the capability trait shared by every
//! stateful node. The tracking engine itself lives in `viewstate-state`.

pub mod types;
pub mod traits;
pub mod error;
pub mod config;

pub use types::*;
pub use traits::*;
pub use error::*;
pub use config::*;
