//! Request Classifier
//!
//! Decides whether a request is about a cluster/wallet or a single address
//! and which currencies to query. First match wins:
//! 1. wallet/cluster id present → integer id + mandatory `currency`
//! 2. otherwise an address is required
//! 3. an explicit `currency` overrides detection
//! 4. otherwise currencies are detected from marker keys or the address

use tracing::debug;

use crate::core::detector::detect_from_hint;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{AddressQuery, CurrencyCode, Properties};
use crate::utils::constants::{PROP_ADDRESS, PROP_CLUSTER_ID, PROP_CURRENCY, PROP_WALLET_NAME};

/// Classified subject plus the currencies to query, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRequest {
    pub query: AddressQuery,
    pub currencies: Vec<CurrencyCode>,
}

impl ClassifiedRequest {
    /// Address string or stringified cluster id
    pub fn identifier(&self) -> &str {
        &self.query.raw_identifier
    }

    pub fn is_cluster(&self) -> bool {
        self.query.is_cluster
    }
}

fn non_empty<'a>(properties: &'a Properties, key: &str) -> Option<&'a str> {
    properties
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Classify an inbound property set
pub fn classify(properties: &Properties) -> AppResult<ClassifiedRequest> {
    if properties.contains_key(PROP_WALLET_NAME) || properties.contains_key(PROP_CLUSTER_ID) {
        return classify_cluster(properties);
    }

    let address = non_empty(properties, PROP_ADDRESS).ok_or_else(AppError::missing_address)?;

    let currency_hint = non_empty(properties, PROP_CURRENCY);
    let currencies = match currency_hint {
        Some(hint) => vec![hint.parse::<CurrencyCode>()?],
        None => detect_from_hint(properties)?,
    };

    debug!("Address request {} → {:?}", address, currencies);
    Ok(ClassifiedRequest {
        query: AddressQuery::address(address, currency_hint.map(str::to_string)),
        currencies,
    })
}

fn classify_cluster(properties: &Properties) -> AppResult<ClassifiedRequest> {
    let raw = non_empty(properties, PROP_WALLET_NAME)
        .or_else(|| non_empty(properties, PROP_CLUSTER_ID))
        .unwrap_or_default();
    let cluster_id: u64 = raw.parse().map_err(|_| AppError::invalid_cluster_id())?;

    let hint = non_empty(properties, PROP_CURRENCY).ok_or_else(AppError::cluster_missing_currency)?;
    let currency: CurrencyCode = hint.parse()?;

    debug!("Cluster request {} in {}", cluster_id, currency);
    Ok(ClassifiedRequest {
        query: AddressQuery::cluster(cluster_id, hint),
        currencies: vec![currency],
    })
}
