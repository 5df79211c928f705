//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                  | Description                            | Return Type         |
// |-----------------------|----------------------------------------|---------------------|
// | health                | Health check endpoint                  | Response            |
// | create_order          | Validate and insert a new order        | ApiResult<Response> |
// | get_orderbook         | Get the current order book             | ApiResult<Response> |
// | run_match             | Run one full match cycle               | ApiResult<Response> |
// | latest_trade          | Get the most recent match result       | ApiResult<Response> |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{ApiError, ApiResult, AppState, OrderAck};
use crate::types::OrderDraft;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

/// Validate and insert a new order
pub async fn create_order(
    Extension(state): Extension<Arc<AppState>>,
    Json(draft): Json<OrderDraft>,
) -> ApiResult<Response> {
    let mut engine = state.engine.lock().await;
    let mut inserted = engine.submit(vec![draft]).await?;

    // submit echoes exactly the orders it was given
    let order = inserted
        .pop()
        .ok_or_else(|| ApiError::Internal("order insertion produced no echo".to_string()))?;

    Ok((StatusCode::CREATED, Json(OrderAck::accepted(order))).into_response())
}

/// Get the current order book, pruned and sorted
pub async fn get_orderbook(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Response> {
    let mut engine = state.engine.lock().await;
    let snapshot = engine.book_view();

    Ok((StatusCode::OK, Json(snapshot)).into_response())
}

/// Run one full match cycle and return its result
pub async fn run_match(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Response> {
    let mut engine = state.engine.lock().await;
    let outcome = engine.run_match_cycle().await?;

    Ok((StatusCode::OK, Json(outcome)).into_response())
}

/// Get the most recent match result
pub async fn latest_trade(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Response> {
    let engine = state.engine.lock().await;
    let outcome = engine
        .latest_result()
        .await
        .ok_or_else(|| ApiError::NotFound("no match result yet".to_string()))?;

    Ok((StatusCode::OK, Json(outcome)).into_response())
}
