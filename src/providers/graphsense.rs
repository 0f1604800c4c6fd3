//! GraphSense REST client
//!
//! `Connector` opens a `BackendSession`; a session issues the four REST
//! calls the gateway needs and is dropped as soon as the lookup is done.
//!
//! Endpoints (relative to `api_url`):
//! - `GET /{currency}/addresses/{address}` and `/tags`
//! - `GET /{currency}/entities/{id}` and `/tags`

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

use crate::models::config::GraphSenseConfig;
use crate::models::types::{AddressRecord, CurrencyCode, EntityRecord, TagCollection};
use crate::utils::constants::{
    address_path, address_tags_path, entity_path, entity_tags_path, USER_AGENT as APP_USER_AGENT,
};

// ============================================
// Faults
// ============================================

/// Failure of a single backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendFault {
    /// The backend answered with a non-success status
    Api {
        status: u16,
        reason: String,
        body: String,
    },
    /// Transport, header or decoding failure
    Unexpected(String),
}

impl fmt::Display for BackendFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api {
                status,
                reason,
                body,
            } => write!(
                f,
                "({})\nReason: {}\nHTTP response body: {}",
                status, reason, body
            ),
            Self::Unexpected(detail) => f.write_str(detail),
        }
    }
}

impl std::error::Error for BackendFault {}

impl From<reqwest::Error> for BackendFault {
    fn from(err: reqwest::Error) -> Self {
        Self::Unexpected(err.to_string())
    }
}

// ============================================
// Traits
// ============================================

/// One backend session; dropping it releases the connection
pub trait BackendSession {
    fn get_address(&self, currency: CurrencyCode, address: &str)
        -> Result<AddressRecord, BackendFault>;

    fn list_tags_by_address(
        &self,
        currency: CurrencyCode,
        address: &str,
    ) -> Result<TagCollection, BackendFault>;

    fn get_entity(&self, currency: CurrencyCode, entity_id: u64)
        -> Result<EntityRecord, BackendFault>;

    fn list_address_tags_by_entity(
        &self,
        currency: CurrencyCode,
        entity_id: u64,
    ) -> Result<TagCollection, BackendFault>;
}

/// Opens backend sessions
pub trait Connector {
    type Session: BackendSession;

    fn open(&self) -> Result<Self::Session, BackendFault>;
}

// ============================================
// HTTP implementation
// ============================================

/// Connector for a GraphSense REST deployment
#[derive(Debug, Clone)]
pub struct GraphSenseConnector {
    config: GraphSenseConfig,
}

impl GraphSenseConnector {
    pub fn new(config: GraphSenseConfig) -> Self {
        Self { config }
    }

    /// Base URL that endpoint segments are appended to
    fn base_url(&self) -> Result<Url, BackendFault> {
        let base = self.config.base_url();
        Url::parse(base)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                BackendFault::Unexpected(format!("Invalid GraphSense api_url: {}", base))
            })
    }

    fn default_headers(&self) -> Result<HeaderMap, BackendFault> {
        let mut api_key = HeaderValue::from_str(self.config.api_key.trim())
            .map_err(|_| BackendFault::Unexpected("api_key is not a valid header value".into()))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(APP_USER_AGENT));
        Ok(headers)
    }
}

impl Connector for GraphSenseConnector {
    type Session = GraphSenseSession;

    fn open(&self) -> Result<GraphSenseSession, BackendFault> {
        let base_url = self.base_url()?;
        let client = Client::builder()
            .default_headers(self.default_headers()?)
            .gzip(true)
            .build()?;

        debug!("Opened GraphSense session to {}", base_url);
        Ok(GraphSenseSession { client, base_url })
    }
}

/// Blocking HTTP session
pub struct GraphSenseSession {
    client: Client,
    base_url: Url,
}

impl GraphSenseSession {
    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendFault> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            debug!("GraphSense answered {} for {}", status, url);
            return Err(BackendFault::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            BackendFault::Unexpected(format!("Failed to parse GraphSense response: {}", e))
        })
    }
}

/// Dot segments are dropped by URL path building, so they never name an address
fn address_segment(address: &str) -> Result<&str, BackendFault> {
    match address {
        "" | "." | ".." => Err(BackendFault::Unexpected(format!("Invalid address: '{}'", address))),
        _ => Ok(address),
    }
}

impl BackendSession for GraphSenseSession {
    fn get_address(
        &self,
        currency: CurrencyCode,
        address: &str,
    ) -> Result<AddressRecord, BackendFault> {
        let address = address_segment(address)?;
        self.get_json(address_path(&self.base_url, currency, address))
    }

    fn list_tags_by_address(
        &self,
        currency: CurrencyCode,
        address: &str,
    ) -> Result<TagCollection, BackendFault> {
        let address = address_segment(address)?;
        self.get_json(address_tags_path(&self.base_url, currency, address))
    }

    fn get_entity(
        &self,
        currency: CurrencyCode,
        entity_id: u64,
    ) -> Result<EntityRecord, BackendFault> {
        self.get_json(entity_path(&self.base_url, currency, entity_id))
    }

    fn list_address_tags_by_entity(
        &self,
        currency: CurrencyCode,
        entity_id: u64,
    ) -> Result<TagCollection, BackendFault> {
        self.get_json(entity_tags_path(&self.base_url, currency, entity_id))
    }
}

impl Drop for GraphSenseSession {
    fn drop(&mut self) {
        debug!("Closing GraphSense session to {}", self.base_url);
    }
}
