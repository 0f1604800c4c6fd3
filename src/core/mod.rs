//! Core Module - Business Logic
//!
//! Currency detection, request classification, entity projection, error
//! reporting and the transforms that wire them together.

pub mod classifier;
pub mod detector;
pub mod projector;
pub mod reporter;
pub mod transforms;

pub use classifier::*;
pub use detector::*;
pub use projector::*;
pub use reporter::*;
pub use transforms::*;
