//! Constants Module - Single Source of Truth
//!
//! Entity types, property names, overlay icons, request property keys and
//! backend endpoints used across the transforms. No other module hardcodes
//! these strings.

use reqwest::Url;

use crate::models::types::CurrencyCode;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "GraphSenseTRX";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for GraphSense requests
pub const USER_AGENT: &str = concat!("GraphSenseTRX/", env!("CARGO_PKG_VERSION"));

/// Config file looked up in the working directory when nothing else is given
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Environment variable pointing at the config file
pub const CONFIG_PATH_ENV: &str = "GRAPHSENSE_CONFIG";

// ============================================
// INBOUND REQUEST PROPERTIES
// ============================================

pub const PROP_ADDRESS: &str = "properties.cryptocurrencyaddress";
pub const PROP_CURRENCY: &str = "currency";
pub const PROP_WALLET_NAME: &str = "cryptocurrency.wallet.name";
pub const PROP_CLUSTER_ID: &str = "cluster_ID";

// ============================================
// OUTPUT ENTITY TYPES
// ============================================

pub const INPUT_ENTITY_TYPE: &str = "maltego.Cryptocurrency";
pub const WALLET_ENTITY_TYPE: &str = "maltego.CryptocurrencyWallet";
pub const OWNER_ENTITY_TYPE: &str = "maltego.CryptocurrencyOwner";

/// Prefix stripped from a currency entity type to get its icon name
pub const ENTITY_TYPE_PREFIX: &str = "maltego.";

// ============================================
// OVERLAYS & ICONS
// ============================================

/// Overlay shown on anything carrying attribution tags
pub const TAGGED_OVERLAY_ICON: &str = "Businessman";

/// ZEC has no `ZECAddress` icon shipped with the host
pub const ZEC_ICON: &str = "zcash_icon_fullcolor";

/// Icon for owners whose label is not disclosed
pub const UNKNOWN_ICON: &str = "Unknown";

// ============================================
// CURRENCY PROFILES
// ============================================

/// Static per-currency output settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyProfile {
    /// Entity type emitted for addresses of this currency
    pub entity_type: &'static str,
    /// Smallest units per display unit
    pub factor: f64,
    /// Name of the smallest unit
    pub unit_label: &'static str,
}

const BTC_PROFILE: CurrencyProfile = CurrencyProfile {
    entity_type: "maltego.BTCAddress",
    factor: 1e8,
    unit_label: "Satoshi",
};

const BCH_PROFILE: CurrencyProfile = CurrencyProfile {
    entity_type: "maltego.BCHAddress",
    factor: 1e8,
    unit_label: "Satoshi",
};

const LTC_PROFILE: CurrencyProfile = CurrencyProfile {
    entity_type: "maltego.LTCAddress",
    factor: 1e8,
    unit_label: "Litoshi",
};

const ZEC_PROFILE: CurrencyProfile = CurrencyProfile {
    entity_type: "maltego.ZECAddress",
    factor: 1e8,
    unit_label: "Zatoshi",
};

// GraphSense reports ETH values in Wei. Override through `unit_factors`
// in the config if a backend deployment reports another unit.
const ETH_PROFILE: CurrencyProfile = CurrencyProfile {
    entity_type: "maltego.ETHAddress",
    factor: 1e18,
    unit_label: "Wei",
};

/// Get the output profile for a currency
pub fn get_currency_profile(currency: CurrencyCode) -> &'static CurrencyProfile {
    match currency {
        CurrencyCode::Btc => &BTC_PROFILE,
        CurrencyCode::Bch => &BCH_PROFILE,
        CurrencyCode::Ltc => &LTC_PROFILE,
        CurrencyCode::Zec => &ZEC_PROFILE,
        CurrencyCode::Eth => &ETH_PROFILE,
    }
}

/// Host-typed entities carry one of these keys when their chain is known
pub fn get_marker_key(currency: CurrencyCode) -> &'static str {
    match currency {
        CurrencyCode::Btc => "BTCAddress",
        CurrencyCode::Bch => "BCHAddress",
        CurrencyCode::Ltc => "LTCAddress",
        CurrencyCode::Zec => "ZECAddress",
        CurrencyCode::Eth => "ETHAddress",
    }
}

/// Icon overlay name for a currency (entity type without the `maltego.` prefix)
pub fn get_currency_icon(currency: CurrencyCode) -> &'static str {
    if currency == CurrencyCode::Zec {
        return ZEC_ICON;
    }
    let entity_type = get_currency_profile(currency).entity_type;
    entity_type
        .strip_prefix(ENTITY_TYPE_PREFIX)
        .unwrap_or(entity_type)
}

// ============================================
// ERROR MARKERS
// ============================================

/// Substrings identifying a gateway timeout in a backend error
pub const GATEWAY_TIMEOUT_MARKERS: [&str; 3] = ["504 Bad Gateway", "(504)", "504 Gateway Time"];

/// Substring identifying a not-found backend error
pub const NOT_FOUND_MARKER: &str = "(404)";

// ============================================
// GRAPHSENSE ENDPOINTS
// ============================================

/// Append path segments to `base`; each segment is percent-encoded on its own,
/// so `/`, `?` and `#` inside an address never change the endpoint.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// `{base}/{currency}/addresses/{address}`
pub fn address_path(base: &Url, currency: CurrencyCode, address: &str) -> Url {
    endpoint(base, &[currency.as_str(), "addresses", address])
}

/// `{base}/{currency}/addresses/{address}/tags`
pub fn address_tags_path(base: &Url, currency: CurrencyCode, address: &str) -> Url {
    endpoint(base, &[currency.as_str(), "addresses", address, "tags"])
}

/// `{base}/{currency}/entities/{id}`
pub fn entity_path(base: &Url, currency: CurrencyCode, entity_id: u64) -> Url {
    endpoint(base, &[currency.as_str(), "entities", &entity_id.to_string()])
}

/// `{base}/{currency}/entities/{id}/tags`
pub fn entity_tags_path(base: &Url, currency: CurrencyCode, entity_id: u64) -> Url {
    endpoint(base, &[currency.as_str(), "entities", &entity_id.to_string(), "tags"])
}
