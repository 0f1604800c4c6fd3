//! Currency Detector
//!
//! Matches an address against each chain's address grammar. The predicates
//! are independent: a legacy base58 `3...` address is valid on BTC, BCH and
//! LTC alike and every match is returned, in the fixed order btc, bch, ltc,
//! zec, eth.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{CurrencyCode, Properties};
use crate::utils::constants::PROP_ADDRESS;

lazy_static! {
    // Legacy base58 P2PKH/P2SH, bech32/bech32m segwit
    static ref BTC_PATTERN: Regex = Regex::new(
        r"^(?:[13][a-km-zA-HJ-NP-Z1-9]{25,34}|bc1[ac-hj-np-z02-9]{8,87}|BC1[AC-HJ-NP-Z02-9]{8,87})$"
    )
    .expect("btc pattern");

    // Legacy base58 (shared with BTC), CashAddr with optional prefix
    static ref BCH_PATTERN: Regex = Regex::new(
        r"^(?:[13][a-km-zA-HJ-NP-Z1-9]{25,34}|(?:bitcoincash:|bchtest:)?[qp][ac-hj-np-z02-9]{41}|(?:BITCOINCASH:|BCHTEST:)?[QP][AC-HJ-NP-Z02-9]{41})$"
    )
    .expect("bch pattern");

    // Legacy L/M/3, bech32 ltc1
    static ref LTC_PATTERN: Regex = Regex::new(
        r"^(?:[LM3][a-km-zA-HJ-NP-Z1-9]{25,33}|ltc1[ac-hj-np-z02-9]{8,87}|LTC1[AC-HJ-NP-Z02-9]{8,87})$"
    )
    .expect("ltc pattern");

    // Transparent t1/t3 only; GraphSense does not index shielded pools
    static ref ZEC_PATTERN: Regex =
        Regex::new(r"^t[13][a-km-zA-HJ-NP-Z1-9]{33}$").expect("zec pattern");

    static ref ETH_PATTERN: Regex = Regex::new(r"^(?:0x)?[0-9a-fA-F]{40}$").expect("eth pattern");
}

fn pattern(currency: CurrencyCode) -> &'static Regex {
    match currency {
        CurrencyCode::Btc => &*BTC_PATTERN,
        CurrencyCode::Bch => &*BCH_PATTERN,
        CurrencyCode::Ltc => &*LTC_PATTERN,
        CurrencyCode::Zec => &*ZEC_PATTERN,
        CurrencyCode::Eth => &*ETH_PATTERN,
    }
}

/// Whether `address` is well-formed for `currency`
pub fn matches_currency(address: &str, currency: CurrencyCode) -> bool {
    pattern(currency).is_match(address)
}

/// Every currency whose address grammar accepts `address`
pub fn detect(address: &str) -> AppResult<Vec<CurrencyCode>> {
    let address = address.trim();
    let candidates: Vec<CurrencyCode> = CurrencyCode::ALL
        .into_iter()
        .filter(|c| matches_currency(address, *c))
        .collect();

    if candidates.is_empty() {
        debug!("No currency grammar matches {}", address);
        return Err(AppError::currency_not_supported());
    }

    debug!("Detected {:?} for {}", candidates, address);
    Ok(candidates)
}

/// Marker keys first (a typed host entity already knows its chain), then the address
pub fn detect_from_hint(properties: &Properties) -> AppResult<Vec<CurrencyCode>> {
    if let Some(currency) = CurrencyCode::ALL
        .into_iter()
        .find(|c| properties.contains_key(c.marker_key()))
    {
        return Ok(vec![currency]);
    }

    match properties.get(PROP_ADDRESS).map(|a| a.trim()) {
        Some(address) if !address.is_empty() => detect(address),
        _ => Err(AppError::no_address_or_currency()),
    }
}
