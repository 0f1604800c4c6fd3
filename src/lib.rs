//! GraphSense Transforms Library
//!
//! Cryptocurrency investigation transforms backed by a GraphSense server:
//! - Currency detection from address formats
//! - Address and cluster (wallet) lookups
//! - Attribution tag lookups
//! - Projection of results into typed graph entities

pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{
    classify, detect, detect_from_hint, format_error, report_error, ClassifiedRequest,
    EntityProjector, RunSummary, Transform, TransformInfo,
};
pub use models::{
    AppError, AppResult, CurrencyCode, ErrorCode, GraphSenseConfig, OutputEntity, Properties,
    QueryKind, Severity, TransformResponse, TransformSink,
};
pub use providers::{BackendFault, BackendSession, Connector, Gateway, GraphSenseConnector};
