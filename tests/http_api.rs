//! # HTTP tests for checkout-ledger
//!
//! Drives the router in-process: chain reads, checkout writes (including the
//! always-200 echo), certificate id derivation, and the audit endpoints.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use checkout_ledger::crypto::md5_hex;
use checkout_ledger::{AppState, Block, CheckoutPayload};

fn test_app(state: &AppState) -> axum::Router {
    checkout_ledger::app(state.clone())
}

async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn get(state: &AppState, uri: &str) -> (StatusCode, String) {
    let response = test_app(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_string(response).await)
}

async fn post(state: &AppState, uri: &str, body: &str) -> (StatusCode, String) {
    let response = test_app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_string(response).await)
}

const ALICE: &str = concat!(
    r#"{"certificate_id":"c1","user":"alice","#,
    r#""checkout_date":"2024-01-01","is_genesis":false}"#
);

// -- Chain read ---------------------------------------------------------------

#[tokio::test]
async fn fresh_chain_holds_only_genesis() {
    let state = AppState::default();
    let (status, body) = get(&state, "/").await;
    assert_eq!(status, StatusCode::OK);

    let blocks: Vec<Block> = serde_json::from_str(&body).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].position, 0);
    assert!(blocks[0].payload.is_genesis);
    assert!(blocks[0].has_valid_hash());
}

#[tokio::test]
async fn chain_is_pretty_printed_with_expected_fields() {
    let state = AppState::default();
    let (_, body) = get(&state, "/").await;
    assert!(body.starts_with("[\n {\n  \"position\": 0,"), "{body}");

    let v: Value = serde_json::from_str(&body).unwrap();
    let genesis = &v[0];
    for field in ["position", "payload", "timestamp", "hash", "prev_hash"] {
        assert!(genesis.get(field).is_some(), "missing {field}");
    }
    for field in ["certificate_id", "user", "checkout_date", "is_genesis"] {
        assert!(genesis["payload"].get(field).is_some(), "missing {field}");
    }
}

// -- Checkout write -----------------------------------------------------------

#[tokio::test]
async fn posting_a_checkout_appends_a_linked_block() {
    let state = AppState::default();
    let (status, body) = post(&state, "/", ALICE).await;
    assert_eq!(status, StatusCode::OK);

    let echoed: CheckoutPayload = serde_json::from_str(&body).unwrap();
    assert_eq!(echoed.certificate_id, "c1");
    assert_eq!(echoed.user, "alice");

    let (_, body) = get(&state, "/").await;
    let blocks: Vec<Block> = serde_json::from_str(&body).unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1].position, blocks[0].position + 1);
    assert_eq!(blocks[1].prev_hash, blocks[0].hash);
    assert_eq!(blocks[1].compute_hash(), blocks[1].hash);
    assert_eq!(blocks[1].payload, echoed);
}

#[tokio::test]
async fn malformed_checkout_is_a_500_with_plain_message() {
    let state = AppState::default();
    let (status, body) = post(&state, "/", "{not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "could not write block");
    assert_eq!(state.chain.len(), 1);
}

#[tokio::test]
async fn checkout_echo_is_the_pretty_printed_payload() {
    let state = AppState::default();
    let (status, body) = post(&state, "/", ALICE).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("{\n \"certificate_id\""), "{body}");

    let expected = concat!(
        "{\n",
        " \"certificate_id\": \"c1\",\n",
        " \"user\": \"alice\",\n",
        " \"checkout_date\": \"2024-01-01\",\n",
        " \"is_genesis\": false\n",
        "}"
    );
    assert_eq!(body, expected);
}

#[tokio::test]
async fn checkout_decode_is_strict() {
    let state = AppState::default();

    // A bare null or a trailing second document is refused outright.
    for bad in ["null", r#"{"user":"a"}{"user":"b"}"#] {
        let (status, body) = post(&state, "/", bad).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{bad}");
        assert_eq!(body, "could not write block");
    }
    assert_eq!(state.chain.len(), 1);

    // Keys match exactly; an unknown casing leaves the field at its default.
    let (status, _) = post(&state, "/", r#"{"User":"alice"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.chain.tip().payload.user, "");
}

#[tokio::test]
async fn checkout_without_content_type_is_accepted() {
    let state = AppState::default();
    let response = test_app(&state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::from(ALICE))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.chain.len(), 2);
}

#[tokio::test]
async fn payload_content_is_not_constrained() {
    let state = AppState::default();
    let (status, body) = post(&state, "/", r#"{"is_genesis":true}"#).await;
    assert_eq!(status, StatusCode::OK);

    let echoed: CheckoutPayload = serde_json::from_str(&body).unwrap();
    assert_eq!(echoed, CheckoutPayload::genesis());

    let tip = state.chain.tip();
    assert_eq!(tip.position, 1);
    assert!(tip.payload.is_genesis);
    assert_eq!(state.chain.audit(), Vec::<String>::new());
}

#[tokio::test]
async fn sequential_posts_keep_positions_contiguous() {
    let state = AppState::default();
    for i in 0..5 {
        let body = format!(
            r#"{{"certificate_id":"c{i}","user":"u{i}","checkout_date":"2024-01-0{}"}}"#,
            i + 1
        );
        let (status, _) = post(&state, "/", &body).await;
        assert_eq!(status, StatusCode::OK);
    }
    let blocks = state.chain.snapshot();
    assert_eq!(blocks.len(), 6);
    for (i, b) in blocks.iter().enumerate() {
        assert_eq!(b.position, i as u64);
    }

    let (status, body) = get(&state, "/validate").await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["ok"], true);
    assert_eq!(v["length"], 6);
    assert_eq!(v["errors"].as_array().unwrap().len(), 0);
}

// -- Certificates -------------------------------------------------------------

#[tokio::test]
async fn new_certificate_gets_md5_of_isbn_and_publish_date() {
    let state = AppState::default();
    let record = r#"{"title":"Rust","author":"Ferris",
        "publish_date":"2020-05-01","isbn":"1234567890"}"#;
    let (status, body) = post(&state, "/new", record).await;
    assert_eq!(status, StatusCode::OK);

    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["id"], md5_hex(&[b"12345678902020-05-01"]));
    assert_eq!(v["title"], "Rust");

    let other = r#"{"id":"x","title":"Other","author":"Someone",
        "publish_date":"2020-05-01","isbn":"1234567890"}"#;
    let (_, body2) = post(&state, "/new", other).await;
    let v2: Value = serde_json::from_str(&body2).unwrap();
    assert_eq!(v2["id"], v["id"]);

    // Unrelated to the chain.
    assert_eq!(state.chain.len(), 1);
}

#[tokio::test]
async fn malformed_certificate_is_a_500() {
    let state = AppState::default();
    let (status, body) = post(&state, "/new", "isbn=123").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "could not create new certificate");
}

// -- Block lookup, health ------------------------------------------------------

#[tokio::test]
async fn block_lookup_by_position() {
    let state = AppState::default();
    post(&state, "/", ALICE).await;

    let (status, body) = get(&state, "/blocks/1").await;
    assert_eq!(status, StatusCode::OK);
    let block: Block = serde_json::from_str(&body).unwrap();
    assert_eq!(block.payload.user, "alice");

    let (status, body) = get(&state, "/blocks/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["error"]["code"], 404);
}

#[tokio::test]
async fn health_reports_chain_head() {
    let state = AppState::default();
    let (status, body) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok","length":1,"tip_position":0}"#);

    post(&state, "/", ALICE).await;
    post(&state, "/", ALICE).await;
    let (_, body) = get(&state, "/health").await;
    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["length"], 3);
    assert_eq!(v["tip_position"], 2);
}

#[tokio::test]
async fn version_route_is_not_served() {
    let state = AppState::default();
    let (status, _) = get(&state, "/version").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
