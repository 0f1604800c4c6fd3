//! Providers Module - External Data Sources
//!
//! GraphSense REST client and the lookup gateway built on top of it.

pub mod gateway;
pub mod graphsense;

pub use gateway::*;
pub use graphsense::*;
