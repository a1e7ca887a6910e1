//! vstate - view-state payload tooling

pub mod commands;

pub use commands::*;
