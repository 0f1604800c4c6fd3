//! Models Module - Data Structures & Configuration
//!
//! Currencies, GraphSense records, output entities, errors and config.

pub mod config;
pub mod entity;
pub mod errors;
pub mod types;

pub use config::*;
pub use entity::*;
pub use errors::*;
pub use types::*;
