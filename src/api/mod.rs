//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements a REST API using Axum for the dark pool worker.
// It provides endpoints for order submission, book viewing and match cycles.
//
// | Component      | Description                                                |
// |----------------|-----------------------------------------------------------|
// | API            | Main API structure coordinating routes                     |
// | Routes         | Handler functions for API endpoints                        |
// | States         | Shared application state                                   |
// | DTOs           | Data transfer objects for API requests/responses           |
//
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name           | Description                                       | Key Methods       |
// |----------------|---------------------------------------------------|-------------------|
// | AppState       | Shared application state                          | new               |
// | Api            | Main API structure                                | serve             |
// | ApiError       | API error types                                   | from              |
//--------------------------------------------------------------------------------------------------

mod dto;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::engine::DarkPoolEngine;

pub use dto::*;
pub use error::{ApiError, ApiResult};

/// Shared application state accessible by all handlers.
pub struct AppState {
    /// The worker core behind a single lock. Every handler runs under it,
    /// so a match cycle is never observed half-applied.
    pub engine: Arc<Mutex<DarkPoolEngine>>,
}

impl AppState {
    /// Creates a new application state around an engine.
    pub fn new(engine: DarkPoolEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }
}

/// Main API structure
pub struct Api {
    /// API address
    addr: SocketAddr,
    /// Shared application state
    state: Arc<AppState>,
}

impl Api {
    /// Creates a new API instance
    pub fn new(addr: SocketAddr, engine: DarkPoolEngine) -> Self {
        let state = Arc::new(AppState::new(engine));
        Self { addr, state }
    }

    /// Creates all routes for the API
    pub fn routes(&self) -> Router {
        // Create a CORS layer that allows requests from specific origins
        let cors = CorsLayer::new()
            // Allow requests from localhost origins
            .allow_origin([
                "http://localhost:3000".parse::<HeaderValue>().unwrap(),
                "http://127.0.0.1:3000".parse::<HeaderValue>().unwrap(),
            ])
            // Allow standard methods
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            // Allow specific headers
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            // Allow credentials
            .allow_credentials(true);

        Router::new()
            // Health check
            .route("/health", get(routes::health))
            // Order submission
            .route("/orders", post(routes::create_order))
            // Market data
            .route("/orderbook", get(routes::get_orderbook))
            .route("/trades/latest", get(routes::latest_trade))
            // Match cycle trigger
            .route("/match", post(routes::run_match))
            // Attach application state
            .layer(Extension(self.state.clone()))
            // Add CORS and request tracing layers
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Starts the API server and runs until shutdown
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.routes();

        println!("API listening on {}", self.addr);
        let listener = TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
