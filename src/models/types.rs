//! Core types: currencies, queries and GraphSense records

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{get_currency_profile, get_marker_key, CurrencyProfile};

/// Flat property map of an inbound request
pub type Properties = HashMap<String, String>;

// ============================================
// Currencies
// ============================================

/// Chains supported by the GraphSense backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCode {
    Btc,
    Bch,
    Ltc,
    Zec,
    Eth,
}

impl CurrencyCode {
    /// All currencies, in detection order
    pub const ALL: [CurrencyCode; 5] = [Self::Btc, Self::Bch, Self::Ltc, Self::Zec, Self::Eth];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Btc => "btc",
            Self::Bch => "bch",
            Self::Ltc => "ltc",
            Self::Zec => "zec",
            Self::Eth => "eth",
        }
    }

    /// Static output profile (delegates to constants)
    pub fn profile(&self) -> &'static CurrencyProfile {
        get_currency_profile(*self)
    }

    /// Marker key a host-typed entity carries for this chain (delegates to constants)
    pub fn marker_key(&self) -> &'static str {
        get_marker_key(*self)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "btc" => Ok(Self::Btc),
            "bch" => Ok(Self::Bch),
            "ltc" => Ok(Self::Ltc),
            "zec" => Ok(Self::Zec),
            "eth" => Ok(Self::Eth),
            _ => Err(AppError::unsupported_currency(s)),
        }
    }
}

// ============================================
// Queries
// ============================================

/// Projection branch, matching the backend call that was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Cluster,
    Details,
    Tags,
    EntityTags,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Details => "details",
            Self::Tags => "tags",
            Self::EntityTags => "entity_tags",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which GraphSense resource a lookup targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTarget {
    Address,
    Entity,
}

impl fmt::Display for LookupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("Address"),
            Self::Entity => f.write_str("Entity"),
        }
    }
}

/// Subject of a request, derived once by the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressQuery {
    /// Address string, or the stringified cluster id
    pub raw_identifier: String,
    /// Explicit `currency` property, if any
    pub currency_hint: Option<String>,
    /// Set only when `raw_identifier` is a non-negative integer
    pub is_cluster: bool,
}

impl AddressQuery {
    pub fn address(raw_identifier: impl Into<String>, currency_hint: Option<String>) -> Self {
        Self {
            raw_identifier: raw_identifier.into(),
            currency_hint,
            is_cluster: false,
        }
    }

    pub fn cluster(cluster_id: u64, currency_hint: impl Into<String>) -> Self {
        Self {
            raw_identifier: cluster_id.to_string(),
            currency_hint: Some(currency_hint.into()),
            is_cluster: true,
        }
    }

    /// Numeric cluster id for cluster queries
    pub fn cluster_id(&self) -> Option<u64> {
        if !self.is_cluster {
            return None;
        }
        self.raw_identifier.parse().ok()
    }
}

// ============================================
// GraphSense records
// ============================================

/// Fiat valuation of an amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiatValue {
    pub code: String,
    pub value: f64,
}

/// Amount in the smallest unit, plus fiat valuations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Values {
    pub value: i128,
    #[serde(default)]
    pub fiat_values: Vec<FiatValue>,
}

/// Reference to a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxSummary {
    #[serde(default)]
    pub height: Option<u64>,
    pub timestamp: i64,
    #[serde(default)]
    pub tx_hash: Option<String>,
}

/// `GET /{currency}/addresses/{address}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub address: String,
    /// Owning cluster, when the backend reports it
    #[serde(default)]
    pub entity: Option<u64>,
    pub balance: Values,
    pub total_received: Values,
    pub total_spent: Values,
    #[serde(default)]
    pub no_incoming_txs: u64,
    #[serde(default)]
    pub no_outgoing_txs: u64,
    #[serde(default)]
    pub first_tx: Option<TxSummary>,
    #[serde(default)]
    pub last_tx: Option<TxSummary>,
}

/// `GET /{currency}/entities/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity: u64,
    #[serde(default)]
    pub no_addresses: u64,
    pub balance: Values,
    pub total_received: Values,
    pub total_spent: Values,
    #[serde(default)]
    pub no_incoming_txs: u64,
    #[serde(default)]
    pub no_outgoing_txs: u64,
    #[serde(default)]
    pub first_tx: Option<TxSummary>,
    #[serde(default)]
    pub last_tx: Option<TxSummary>,
}

/// Balance and transaction figures shared by address and cluster records
#[derive(Debug, Clone, Copy)]
pub struct Activity<'a> {
    pub balance: &'a Values,
    pub total_received: &'a Values,
    pub total_spent: &'a Values,
    pub no_incoming_txs: u64,
    pub no_outgoing_txs: u64,
    pub first_tx: Option<&'a TxSummary>,
    pub last_tx: Option<&'a TxSummary>,
}

impl AddressRecord {
    pub fn activity(&self) -> Activity<'_> {
        Activity {
            balance: &self.balance,
            total_received: &self.total_received,
            total_spent: &self.total_spent,
            no_incoming_txs: self.no_incoming_txs,
            no_outgoing_txs: self.no_outgoing_txs,
            first_tx: self.first_tx.as_ref(),
            last_tx: self.last_tx.as_ref(),
        }
    }
}

impl EntityRecord {
    pub fn activity(&self) -> Activity<'_> {
        Activity {
            balance: &self.balance,
            total_received: &self.total_received,
            total_spent: &self.total_spent,
            no_incoming_txs: self.no_incoming_txs,
            no_outgoing_txs: self.no_outgoing_txs,
            first_tx: self.first_tx.as_ref(),
            last_tx: self.last_tx.as_ref(),
        }
    }
}

/// Primary object of a lookup, discriminated when it is decoded
#[derive(Debug, Clone, PartialEq)]
pub enum BackendRecord {
    Address(AddressRecord),
    Cluster(EntityRecord),
}

impl BackendRecord {
    pub fn activity(&self) -> Activity<'_> {
        match self {
            Self::Address(address) => address.activity(),
            Self::Cluster(cluster) => cluster.activity(),
        }
    }
}

// ============================================
// Tags
// ============================================

/// Attribution tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tagpack_creator: Option<String>,
    #[serde(default)]
    pub tagpack_title: Option<String>,
    #[serde(default)]
    pub abuse: Option<String>,
    /// Kept raw: some deployments send strings
    #[serde(default)]
    pub confidence_level: Option<serde_json::Value>,
}

impl Tag {
    /// Confidence level as an integer weight, if it coerces
    pub fn confidence_weight(&self) -> Option<i64> {
        match self.confidence_level.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Tag payload as sent by the different tag endpoints
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagPayload {
    List(Vec<Tag>),
    Page {
        #[serde(default)]
        address_tags: Option<Vec<Tag>>,
        #[serde(default)]
        entity_tags: Option<Vec<Tag>>,
    },
}

/// Tag collection returned next to the primary record
#[derive(Debug, Clone, PartialEq)]
pub enum TagCollection {
    AddressTags(Vec<Tag>),
    EntityTags(Vec<Tag>),
    List(Vec<Tag>),
}

impl<'de> Deserialize<'de> for TagCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match TagPayload::deserialize(deserializer)? {
            TagPayload::List(tags) => Self::List(tags),
            TagPayload::Page {
                address_tags: Some(tags),
                ..
            } => Self::AddressTags(tags),
            TagPayload::Page {
                entity_tags: Some(tags),
                ..
            } => Self::EntityTags(tags),
            TagPayload::Page { .. } => {
                return Err(serde::de::Error::custom("expected address_tags or entity_tags"))
            }
        })
    }
}

impl Default for TagCollection {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl TagCollection {
    pub fn tags(&self) -> &[Tag] {
        match self {
            Self::AddressTags(tags) | Self::EntityTags(tags) | Self::List(tags) => tags,
        }
    }

    pub fn has_tags(&self) -> bool {
        !self.tags().is_empty()
    }
}

// ============================================
// Lookup results
// ============================================

/// Successful lookup: primary record plus its tags
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub primary: BackendRecord,
    pub tags: TagCollection,
}

/// Outcome of one gateway call; the error carries the operator message
pub type LookupResult = AppResult<Lookup>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_currency_parsing() {
        assert_eq!("BTC".parse::<CurrencyCode>().unwrap(), CurrencyCode::Btc);
        assert_eq!(" eth ".parse::<CurrencyCode>().unwrap(), CurrencyCode::Eth);

        let err = "doge".parse::<CurrencyCode>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported currency: doge");
    }

    #[test]
    fn test_cluster_query_id() {
        let query = AddressQuery::cluster(12345, "btc");
        assert_eq!(query.raw_identifier, "12345");
        assert_eq!(query.cluster_id(), Some(12345));

        let address = AddressQuery::address("12345", None);
        assert_eq!(address.cluster_id(), None);
    }

    #[test]
    fn test_tag_collection_shapes() {
        let page: TagCollection = serde_json::from_value(json!({
            "address_tags": [{"label": "Exchange"}],
            "next_page": null
        }))
        .unwrap();
        assert!(matches!(page, TagCollection::AddressTags(ref t) if t.len() == 1));

        let entity: TagCollection =
            serde_json::from_value(json!({"entity_tags": [{"label": "Mixer"}]})).unwrap();
        assert!(matches!(entity, TagCollection::EntityTags(_)));

        let list: TagCollection = serde_json::from_value(json!([{"label": "a"}, {}])).unwrap();
        assert_eq!(list.tags().len(), 2);

        let empty: TagCollection = serde_json::from_value(json!([])).unwrap();
        assert!(!empty.has_tags());
    }

    #[test]
    fn test_tag_collection_rejects_other_objects() {
        for raw in [json!({"next_page": null}), json!({"address": "x"})] {
            let err = serde_json::from_value::<TagCollection>(raw).unwrap_err();
            assert!(err.to_string().contains("expected address_tags or entity_tags"));
        }
    }

    #[test]
    fn test_confidence_weight_coercion() {
        let numeric = Tag {
            confidence_level: Some(json!(80)),
            ..Tag::default()
        };
        assert_eq!(numeric.confidence_weight(), Some(80));

        let text = Tag {
            confidence_level: Some(json!("55")),
            ..Tag::default()
        };
        assert_eq!(text.confidence_weight(), Some(55));

        let junk = Tag {
            confidence_level: Some(json!("high")),
            ..Tag::default()
        };
        assert_eq!(junk.confidence_weight(), None);
    }
}
