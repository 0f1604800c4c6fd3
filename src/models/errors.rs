//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so operator notices and logs can
//! be correlated. The message is what the operator sees; the code is what the
//! logs carry.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - INPUT_xxx: request shape errors (missing/invalid identifier or currency)
//! - DETECT_xxx: currency detection errors
//! - BACKEND_xxx: GraphSense faults and transport failures
//! - NODATA_xxx: lookups that succeeded but returned nothing usable
//! - CFG_xxx: configuration errors

use std::fmt;

use crate::models::types::{CurrencyCode, LookupTarget};

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging
    pub code: ErrorCode,
    /// Operator-facing message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

// The operator sees the bare message; codes only go to the logs.
impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Input Errors (1xx)
    // ============================================
    /// Cluster/wallet id is not a non-negative integer
    InputInvalidClusterId,
    /// Cluster/wallet id given without a currency
    InputClusterMissingCurrency,
    /// No address property in the request
    InputMissingAddress,
    /// Currency property names an unsupported chain
    InputUnsupportedCurrency,

    // ============================================
    // Detection Errors (2xx)
    // ============================================
    /// Address matches no known format
    DetectUnsupportedFormat,
    /// Neither a marker key nor an address is present
    DetectNoAddress,

    // ============================================
    // Backend Errors (3xx)
    // ============================================
    /// GraphSense answered with a non-success status
    BackendApiFault,
    /// Transport or decoding failure
    BackendUnexpected,

    // ============================================
    // No-Data Errors (4xx)
    // ============================================
    /// No attribution tags for the subject
    NoDataTags,
    /// Address record carries no owning cluster
    NoDataCluster,

    // ============================================
    // Configuration Errors (5xx)
    // ============================================
    /// Config file could not be read
    ConfigUnreadable,
    /// Config file is not valid JSON or has the wrong shape
    ConfigInvalid,
    /// `api_url` missing or empty
    ConfigMissingUrl,
    /// `api_key` missing or empty
    ConfigMissingApiKey,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // Input Errors
            Self::InputInvalidClusterId => "INPUT_INVALID_CLUSTER_ID",
            Self::InputClusterMissingCurrency => "INPUT_CLUSTER_MISSING_CURRENCY",
            Self::InputMissingAddress => "INPUT_MISSING_ADDRESS",
            Self::InputUnsupportedCurrency => "INPUT_UNSUPPORTED_CURRENCY",

            // Detection Errors
            Self::DetectUnsupportedFormat => "DETECT_UNSUPPORTED_FORMAT",
            Self::DetectNoAddress => "DETECT_NO_ADDRESS",

            // Backend Errors
            Self::BackendApiFault => "BACKEND_API_FAULT",
            Self::BackendUnexpected => "BACKEND_UNEXPECTED",

            // No-Data Errors
            Self::NoDataTags => "NODATA_TAGS",
            Self::NoDataCluster => "NODATA_CLUSTER",

            // Configuration Errors
            Self::ConfigUnreadable => "CFG_UNREADABLE",
            Self::ConfigInvalid => "CFG_INVALID",
            Self::ConfigMissingUrl => "CFG_MISSING_URL",
            Self::ConfigMissingApiKey => "CFG_MISSING_API_KEY",
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Cluster/wallet id not parseable
    pub fn invalid_cluster_id() -> Self {
        Self::new(
            ErrorCode::InputInvalidClusterId,
            "Invalid Cluster/Wallet ID format (expected integer)",
        )
    }

    /// Cluster/wallet id without currency
    pub fn cluster_missing_currency() -> Self {
        Self::new(
            ErrorCode::InputClusterMissingCurrency,
            "Cluster found but currency is missing",
        )
    }

    /// No address in the request
    pub fn missing_address() -> Self {
        Self::new(
            ErrorCode::InputMissingAddress,
            "No cryptocurrency address found in properties",
        )
    }

    /// Unknown currency code
    pub fn unsupported_currency(currency: &str) -> Self {
        Self::new(
            ErrorCode::InputUnsupportedCurrency,
            format!("Unsupported currency: {}", currency),
        )
    }

    /// Address format not recognized
    pub fn currency_not_supported() -> Self {
        Self::new(ErrorCode::DetectUnsupportedFormat, "Currency not supported")
    }

    /// Nothing to detect from
    pub fn no_address_or_currency() -> Self {
        Self::new(
            ErrorCode::DetectNoAddress,
            "No address or currency found in entity details",
        )
    }

    /// Backend-declared fault
    pub fn backend_api(target: LookupTarget, detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::BackendApiFault,
            format!("GraphSense API error ({}): {}", target, detail),
        )
    }

    /// Any other backend failure
    pub fn backend_unexpected(detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::BackendUnexpected,
            format!("Unexpected error: {}", detail),
        )
    }

    /// Zero attribution tags
    pub fn no_tags(currency: CurrencyCode) -> Self {
        Self::new(
            ErrorCode::NoDataTags,
            format!("No attribution tags found for this query in {}", currency),
        )
    }

    /// Address record has no owning cluster
    pub fn no_cluster(currency: CurrencyCode, address: &str) -> Self {
        Self::new(
            ErrorCode::NoDataCluster,
            format!("No cluster found in {} for address {}", currency, address),
        )
    }

    /// Config file unreadable
    pub fn config_unreadable(path: &str, source: std::io::Error) -> Self {
        Self::with_source(
            ErrorCode::ConfigUnreadable,
            format!("Failed to read config file {}", path),
            source,
        )
    }

    /// Config file malformed
    pub fn config_invalid(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;
