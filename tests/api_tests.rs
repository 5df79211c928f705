//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module contains integration tests for the API.
// It tests all endpoints and verifies the responses.
//--------------------------------------------------------------------------------------------------

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode};
use serde_json::{Value, from_slice, json};
use std::net::SocketAddr;
use tower::ServiceExt;

use darkpool_worker::{
    Api, DarkPoolEngine, JsonFileStore, QuoteLadder, SettlementSigner, verify_settlement,
};

const TEST_SEED: &str = "0202020202020202020202020202020202020202020202020202020202020202";

/// Sets up a test router over a temporary data directory.
///
/// Synthetic liquidity is disabled so tests observe user orders only. The
/// TempDir guard is returned to keep the directory alive.
async fn setup_test_router() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();

    let store = Box::new(JsonFileStore::new(dir.path()).unwrap());
    let signer = SettlementSigner::from_hex_seed(TEST_SEED).unwrap();
    let ladder = QuoteLadder {
        levels: 0,
        ensure_cross: false,
        ..QuoteLadder::default()
    };

    let engine = DarkPoolEngine::new(store, signer, ladder);
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let app = Api::new(addr, engine).routes();

    (app, dir)
}

/// Helper to parse JSON responses
async fn parse_json_response(response: Response<Body>) -> Value {
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024) // 1MB limit
        .await
        .unwrap();

    from_slice(&body_bytes).unwrap()
}

/// Helper to submit an order draft
async fn post_order(app: &Router, body: Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::post("/orders")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

fn buy_order(price: f64) -> Value {
    json!({
        "owner": "0xBuyer",
        "side": "buy",
        "tokenIn": "0xBaseToken",
        "tokenOut": "0xQuoteToken",
        "amountIn": "1000000000000000000",
        "amountOut": "2000000000000000000000",
        "price": price
    })
}

fn sell_order(price: f64) -> Value {
    json!({
        "owner": "0xSeller",
        "side": "sell",
        "tokenIn": "0xQuoteToken",
        "tokenOut": "0xBaseToken",
        "amountIn": "2000000000000000000000",
        "amountOut": "1000000000000000000",
        "price": price
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    // Setup
    let (app, _guard) = setup_test_router().await;

    // Execute
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Verify
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_order() {
    // Setup
    let (app, _guard) = setup_test_router().await;

    // Execute - submit a limit buy order
    let response = post_order(&app, buy_order(2001.0)).await;

    // Verify
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_json_response(response).await;
    assert_eq!(body["status"], "added");
    assert_eq!(body["order"]["owner"], "0xBuyer");
    assert_eq!(body["order"]["side"], "buy");
    assert_eq!(body["order"]["price"], 2001.0);
    // The book assigned an insertion timestamp
    assert!(body["order"]["ts"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_create_order_rejects_invalid_side() {
    // Setup
    let (app, _guard) = setup_test_router().await;

    let mut bad = buy_order(2001.0);
    bad["side"] = json!("hold");

    // Execute
    let response = post_order(&app, bad).await;

    // Verify - rejected and the book stays empty
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_json_response(response).await;
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid side")
    );

    let book = app
        .clone()
        .oneshot(Request::get("/orderbook").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let book_body = parse_json_response(book).await;
    assert_eq!(book_body["buy"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_get_orderbook() {
    // Setup
    let (app, _guard) = setup_test_router().await;

    post_order(&app, buy_order(1995.0)).await;
    post_order(&app, buy_order(1990.0)).await;
    post_order(&app, sell_order(2010.0)).await;

    // Execute
    let response = app
        .clone()
        .oneshot(Request::get("/orderbook").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Verify - bids sorted best-first, asks present
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;

    let bids = body["buy"].as_array().unwrap();
    assert_eq!(bids.len(), 2);
    assert_eq!(bids[0]["price"], 1995.0);
    assert_eq!(bids[1]["price"], 1990.0);
    assert_eq!(body["sell"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_match_cycle_end_to_end() {
    // Setup - a crossing pair: sell at 1999, buy at 2001
    let (app, _guard) = setup_test_router().await;

    post_order(&app, sell_order(1999.0)).await;
    post_order(&app, buy_order(2001.0)).await;

    // Execute
    let response = app
        .clone()
        .oneshot(Request::post("/match").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Verify - matched at the midpoint, settlement verifiable
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;

    assert_eq!(body["status"], "matched");
    assert_eq!(body["price"], 2000.0);
    assert_eq!(body["trade"]["maker"], "0xSeller");
    assert_eq!(body["trade"]["taker"], "0xBuyer");
    assert_eq!(body["trade"]["tokenA"], "0xBaseToken");
    assert_eq!(body["trade"]["tokenB"], "0xQuoteToken");
    // The attesting key travels under the `enclave` field
    assert!(body["enclave"].is_string());
    assert!(body.get("signer").is_none());

    // The match result carries a verifiable settlement
    let signed: darkpool_worker::SignedSettlement = serde_json::from_value(body.clone()).unwrap();
    assert!(verify_settlement(&signed).is_ok());

    // Both sides were consumed
    let book = app
        .clone()
        .oneshot(Request::get("/orderbook").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let book_body = parse_json_response(book).await;
    assert_eq!(book_body["buy"].as_array().unwrap().len(), 0);
    assert_eq!(book_body["sell"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_match_cycle_no_match() {
    // Setup - a wide, uncrossed book
    let (app, _guard) = setup_test_router().await;

    post_order(&app, sell_order(2010.0)).await;
    post_order(&app, buy_order(1990.0)).await;

    // Execute
    let response = app
        .clone()
        .oneshot(Request::post("/match").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Verify - no match, and the resting orders survive
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["status"], "no_match");
    assert_eq!(body["reason"], "no crossing quotes");

    let book = app
        .clone()
        .oneshot(Request::get("/orderbook").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let book_body = parse_json_response(book).await;
    assert_eq!(book_body["buy"].as_array().unwrap().len(), 1);
    assert_eq!(book_body["sell"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_latest_trade_lifecycle() {
    // Setup
    let (app, _guard) = setup_test_router().await;

    // Execute - no cycle has run yet
    let response = app
        .clone()
        .oneshot(Request::get("/trades/latest").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Verify
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Run a matching cycle
    post_order(&app, sell_order(1999.0)).await;
    post_order(&app, buy_order(2001.0)).await;
    let match_response = app
        .clone()
        .oneshot(Request::post("/match").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(match_response.status(), StatusCode::OK);

    // The latest result is now served
    let response = app
        .clone()
        .oneshot(Request::get("/trades/latest").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_response(response).await;
    assert_eq!(body["status"], "matched");
    assert_eq!(body["price"], 2000.0);
}
