//! sharenote site
//!
//! Serves notes published with the `sharenote` CLI as JSON, read straight
//! from the record store.

pub mod modules;

pub use modules::*;
