//! Error Classifier
//!
//! Turns a per-currency lookup failure into the operator notice. Gateway
//! timeouts and not-found faults get dedicated wording, everything else is
//! passed through with the currency prefixed.

use tracing::warn;

use crate::models::entity::{Severity, TransformSink};
use crate::models::errors::AppError;
use crate::models::types::{CurrencyCode, QueryKind};
use crate::utils::constants::{GATEWAY_TIMEOUT_MARKERS, NOT_FOUND_MARKER};

/// Operator message for a failed lookup. Timeout markers win over not-found.
pub fn format_error(
    currency: CurrencyCode,
    kind: QueryKind,
    identifier: &str,
    error: &str,
) -> String {
    if GATEWAY_TIMEOUT_MARKERS.iter().any(|m| error.contains(m)) {
        return format!(
            "\nGraphSense server 504 error during {} for {} on {}\n",
            kind, currency, identifier
        );
    }

    if error.contains(NOT_FOUND_MARKER) {
        return format!("\nNothing found in {} for: {}\n", currency, identifier);
    }

    format!("Error ({}): {}", currency, error)
}

/// Log the failure and post it to the sink as a partial-failure notice
pub fn report_error<S: TransformSink + ?Sized>(
    sink: &mut S,
    currency: CurrencyCode,
    kind: QueryKind,
    identifier: &str,
    error: &AppError,
) {
    warn!(
        "⚠️ [{}] {} lookup for {} in {} failed: {}",
        error.code_str(),
        kind,
        identifier,
        currency,
        error
    );
    sink.add_message(
        format_error(currency, kind, identifier, &error.to_string()),
        Severity::Partial,
    );
}
