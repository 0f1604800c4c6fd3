//! Gateway tests against a local mock GraphSense server

use graphsense_trx::models::{BackendRecord, TagCollection};
use graphsense_trx::{
    CurrencyCode, ErrorCode, Gateway, GraphSenseConfig, GraphSenseConnector, QueryKind,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const API_KEY: &str = "test-key";
const ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

fn gateway_for(server: &ServerGuard) -> Gateway<GraphSenseConnector> {
    let raw = json!({"api_url": format!("{}/", server.url()), "api_key": API_KEY}).to_string();
    let config = GraphSenseConfig::from_json(&raw).unwrap();
    Gateway::new(GraphSenseConnector::new(config))
}

fn values(value: u64) -> serde_json::Value {
    json!({"value": value, "fiat_values": [{"code": "eur", "value": 1.0}]})
}

fn address_body() -> String {
    json!({
        "address": ADDRESS,
        "entity": 17,
        "balance": values(5_000_000_000),
        "total_received": values(5_000_000_000),
        "total_spent": values(0),
        "no_incoming_txs": 1,
        "no_outgoing_txs": 0,
        "first_tx": {"height": 0, "timestamp": 1_231_006_505, "tx_hash": "4a5e"},
        "last_tx": {"height": 0, "timestamp": 1_231_006_505, "tx_hash": "4a5e"}
    })
    .to_string()
}

fn entity_body() -> String {
    json!({
        "entity": 17,
        "no_addresses": 2,
        "balance": values(7_000_000_000),
        "total_received": values(7_000_000_000),
        "total_spent": values(0),
        "no_incoming_txs": 4,
        "no_outgoing_txs": 0
    })
    .to_string()
}

#[test]
fn test_lookup_address_sends_auth_and_decodes() {
    let mut server = Server::new();
    let details = server
        .mock("GET", format!("/btc/addresses/{}", ADDRESS).as_str())
        .match_header("authorization", API_KEY)
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(address_body())
        .expect(1)
        .create();
    let tags = server
        .mock("GET", format!("/btc/addresses/{}/tags", ADDRESS).as_str())
        .match_header("authorization", API_KEY)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"address_tags": [{"label": "Satoshi", "confidence_level": 100}]}).to_string(),
        )
        .expect(1)
        .create();

    let lookup = gateway_for(&server)
        .lookup_address(CurrencyCode::Btc, ADDRESS)
        .unwrap();

    details.assert();
    tags.assert();
    match &lookup.primary {
        BackendRecord::Address(record) => {
            assert_eq!(record.entity, Some(17));
            assert_eq!(record.balance.value, 5_000_000_000);
        }
        other => panic!("expected address record, got {:?}", other),
    }
    assert!(matches!(lookup.tags, TagCollection::AddressTags(ref t) if t.len() == 1));
}

#[test]
fn test_lookup_entity_uses_entity_endpoints() {
    let mut server = Server::new();
    let details = server
        .mock("GET", "/ltc/entities/17")
        .with_status(200)
        .with_body(entity_body())
        .create();
    let tags = server
        .mock("GET", "/ltc/entities/17/tags")
        .with_status(200)
        .with_body(json!({"address_tags": [], "next_page": null}).to_string())
        .create();

    let lookup = gateway_for(&server).lookup_entity(CurrencyCode::Ltc, 17).unwrap();

    details.assert();
    tags.assert();
    assert!(matches!(lookup.primary, BackendRecord::Cluster(ref c) if c.no_addresses == 2));
    assert!(!lookup.tags.has_tags());
}

#[test]
fn test_not_found_is_api_fault() {
    let mut server = Server::new();
    let _not_found = server
        .mock("GET", Matcher::Regex(r"^/btc/addresses/.*$".to_string()))
        .with_status(404)
        .with_body(r#"{"detail":"not found"}"#)
        .create();

    let err = gateway_for(&server)
        .lookup_address(CurrencyCode::Btc, ADDRESS)
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::BackendApiFault);
    assert_eq!(
        err.to_string(),
        concat!(
            "GraphSense API error (Address): (404)\nReason: Not Found\n",
            "HTTP response body: {\"detail\":\"not found\"}"
        )
    );

    let message = graphsense_trx::format_error(
        CurrencyCode::Btc,
        QueryKind::Details,
        ADDRESS,
        &err.to_string(),
    );
    assert_eq!(message, format!("\nNothing found in btc for: {}\n", ADDRESS));
}

#[test]
fn test_gateway_timeout_on_tags() {
    let mut server = Server::new();
    let _details = server
        .mock("GET", "/zec/entities/5")
        .with_status(200)
        .with_body(entity_body())
        .create();
    let _tags = server
        .mock("GET", "/zec/entities/5/tags")
        .with_status(504)
        .with_body("upstream timed out")
        .create();

    let err = gateway_for(&server).lookup_entity(CurrencyCode::Zec, 5).unwrap_err();
    assert!(err.to_string().starts_with("GraphSense API error (Entity): (504)"));
}

#[test]
fn test_malformed_body_is_unexpected() {
    let mut server = Server::new();
    let _maintenance = server
        .mock("GET", "/eth/entities/1")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create();

    let err = gateway_for(&server).lookup_entity(CurrencyCode::Eth, 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::BackendUnexpected);
    assert!(err.to_string().starts_with("Unexpected error: Failed to parse GraphSense response"));
}

#[test]
fn test_cluster_resolution_over_http() {
    let mut server = Server::new();
    let _address = server
        .mock("GET", format!("/btc/addresses/{}", ADDRESS).as_str())
        .with_status(200)
        .with_body(address_body())
        .create();
    let _address_tags = server
        .mock("GET", format!("/btc/addresses/{}/tags", ADDRESS).as_str())
        .with_status(200)
        .with_body("[]")
        .create();
    let entity = server
        .mock("GET", "/btc/entities/17")
        .with_status(200)
        .with_body(entity_body())
        .expect(1)
        .create();
    let _entity_tags = server
        .mock("GET", "/btc/entities/17/tags")
        .with_status(200)
        .with_body("[]")
        .create();

    let lookup = gateway_for(&server)
        .lookup_address_cluster(CurrencyCode::Btc, ADDRESS)
        .unwrap();

    entity.assert();
    assert!(matches!(lookup.primary, BackendRecord::Cluster(ref c) if c.entity == 17));
}

#[test]
fn test_address_is_sent_as_one_path_segment() {
    let mut server = Server::new();
    let details = server
        .mock("GET", "/btc/addresses/foo%23frag%2Fx")
        .with_status(200)
        .with_body(address_body())
        .expect(1)
        .create();
    let tags = server
        .mock("GET", "/btc/addresses/foo%23frag%2Fx/tags")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create();

    gateway_for(&server)
        .lookup_address(CurrencyCode::Btc, "foo#frag/x")
        .unwrap();

    details.assert();
    tags.assert();
}

#[test]
fn test_dot_segments_do_not_escape_the_address() {
    let mut server = Server::new();
    let entity = server
        .mock("GET", "/btc/entities/5")
        .with_status(200)
        .with_body(entity_body())
        .expect(0)
        .create();
    let address = server
        .mock("GET", "/btc/addresses/..%2Fentities%2F5")
        .with_status(404)
        .with_body(r#"{"detail":"not found"}"#)
        .expect(1)
        .create();

    let err = gateway_for(&server)
        .lookup_address(CurrencyCode::Btc, "../entities/5")
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::BackendApiFault);
    entity.assert();
    address.assert();
}

#[test]
fn test_tags_endpoint_returning_a_record_is_unexpected() {
    let mut server = Server::new();
    let _details = server
        .mock("GET", format!("/btc/addresses/{}", ADDRESS).as_str())
        .with_status(200)
        .with_body(address_body())
        .create();
    let _tags = server
        .mock("GET", format!("/btc/addresses/{}/tags", ADDRESS).as_str())
        .with_status(200)
        .with_body(address_body())
        .create();

    let err = gateway_for(&server)
        .lookup_address(CurrencyCode::Btc, ADDRESS)
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::BackendUnexpected);
    assert!(err.to_string().starts_with("Unexpected error: Failed to parse GraphSense response"));
}
