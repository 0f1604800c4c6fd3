//! Integration tests for GraphSense transforms (public API, no backend)

use graphsense_trx::models::{
    AddressRecord, BackendRecord, Lookup, PropertyValue, TagCollection,
};
use graphsense_trx::utils::constants::{PROP_ADDRESS, PROP_CLUSTER_ID, PROP_CURRENCY};
use graphsense_trx::{
    classify, detect, format_error, AppError, CurrencyCode, EntityProjector, ErrorCode,
    Properties, QueryKind, TransformResponse,
};
use serde_json::json;

fn props(pairs: &[(&str, &str)]) -> Properties {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn address_record(balance: i128) -> AddressRecord {
    let raw = json!({
        "address": "LM2WMpR1Rp6j3Sa59cMXMs1SPzj9eXpGc1",
        "entity": 314,
        "balance": {"value": balance, "fiat_values": [{"code": "usd", "value": 190.5}]},
        "total_received": {"value": balance, "fiat_values": []},
        "total_spent": {"value": 0, "fiat_values": []},
        "no_incoming_txs": 2,
        "no_outgoing_txs": 0,
        "first_tx": {"height": 10, "timestamp": 1_500_000_000, "tx_hash": "ab"},
        "last_tx": {"height": 11, "timestamp": 1_600_000_000, "tx_hash": "cd"}
    });
    serde_json::from_str(&raw.to_string()).unwrap()
}

#[test]
fn test_detect_single_and_ambiguous() {
    assert_eq!(
        detect("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq").unwrap(),
        vec![CurrencyCode::Btc]
    );
    assert_eq!(
        detect("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy").unwrap(),
        vec![CurrencyCode::Btc, CurrencyCode::Bch, CurrencyCode::Ltc]
    );
    assert!(detect("definitely not an address").is_err());
}

#[test]
fn test_classify_cluster_request() {
    let request = classify(&props(&[(PROP_CLUSTER_ID, "12345"), (PROP_CURRENCY, "btc")])).unwrap();
    assert_eq!(request.identifier(), "12345");
    assert_eq!(request.currencies, vec![CurrencyCode::Btc]);

    let err = classify(&props(&[(PROP_CLUSTER_ID, "abc")])).unwrap_err();
    assert_eq!(err.code, ErrorCode::InputInvalidClusterId);
}

#[test]
fn test_classify_detects_eth() {
    let address = format!("0x{}", "0123456789".repeat(4));
    let request = classify(&props(&[(PROP_ADDRESS, address.as_str())])).unwrap();
    assert_eq!(request.identifier(), address);
    assert_eq!(request.currencies, vec![CurrencyCode::Eth]);
}

#[test]
fn test_project_propagates_errors_for_every_kind() {
    let projector = EntityProjector::new();
    let mut sink = TransformResponse::new();
    for kind in [QueryKind::Cluster, QueryKind::Details, QueryKind::Tags, QueryKind::EntityTags] {
        let err = projector
            .project(Err(AppError::no_tags(CurrencyCode::Ltc)), CurrencyCode::Ltc, kind, &mut sink)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NoDataTags);
        assert_eq!(err.to_string(), "No attribution tags found for this query in ltc");
    }
    assert!(sink.entities.is_empty());
    assert!(sink.messages.is_empty());
}

#[test]
fn test_project_empty_tags() {
    let lookup = Lookup {
        primary: BackendRecord::Address(address_record(1)),
        tags: TagCollection::AddressTags(vec![]),
    };
    let mut sink = TransformResponse::new();
    let err = EntityProjector::new()
        .project(Ok(lookup), CurrencyCode::Ltc, QueryKind::Tags, &mut sink)
        .unwrap_err();
    assert_eq!(err.to_string(), "No attribution tags found for this query in ltc");
}

#[test]
fn test_balance_in_display_units() {
    let lookup = Lookup {
        primary: BackendRecord::Address(address_record(250_000_000)),
        tags: TagCollection::default(),
    };
    let mut sink = TransformResponse::new();
    let id = EntityProjector::new()
        .project(Ok(lookup), CurrencyCode::Ltc, QueryKind::Details, &mut sink)
        .unwrap()
        .unwrap();

    let entity = sink.entity(id).unwrap();
    assert_eq!(entity.entity_type, "maltego.LTCAddress");
    assert_eq!(entity.property("final_balance").unwrap().value, PropertyValue::Float(2.5));
    assert_eq!(
        entity.property("final_balance_fiat").unwrap().display_name,
        "Final balance (usd)"
    );
    assert_eq!(
        entity.property("Last_tx").unwrap().value.to_string(),
        "2020-09-13 12:26:40"
    );
}

#[test]
fn test_timeout_and_not_found_messages_differ() {
    let identifier = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
    let timeout = format_error(
        CurrencyCode::Btc,
        QueryKind::Details,
        identifier,
        "GraphSense API error (Address): (504)\nReason: Gateway Timeout",
    );
    let not_found = format_error(
        CurrencyCode::Btc,
        QueryKind::Details,
        identifier,
        "GraphSense API error (Address): (404)\nReason: Not Found",
    );

    assert_ne!(timeout, not_found);
    assert_eq!(
        timeout,
        format_error(CurrencyCode::Btc, QueryKind::Details, identifier, "(504)")
    );
    assert!(timeout.contains(identifier) && not_found.contains(identifier));
}

#[test]
fn test_response_serializes() {
    let lookup = Lookup {
        primary: BackendRecord::Address(address_record(100_000_000)),
        tags: TagCollection::default(),
    };
    let mut sink = TransformResponse::new();
    EntityProjector::new()
        .project(Ok(lookup), CurrencyCode::Btc, QueryKind::Cluster, &mut sink)
        .unwrap();

    let value = serde_json::to_value(&sink).unwrap();
    assert_eq!(value["entities"][0]["entity_type"], "maltego.CryptocurrencyWallet");
    assert_eq!(value["entities"][0]["value"], "314");
    assert_eq!(value["entities"][0]["overlays"][0]["position"], "west");
}
