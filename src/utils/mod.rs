//! Utils Module - Shared Constants
//!
//! Entity types, property keys, icons and endpoint builders.

pub mod constants;

pub use constants::*;
