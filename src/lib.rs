//! # checkout-ledger
//!
//! Append-only, tamper-evident ledger of certificate checkouts, served over
//! HTTP. Each checkout becomes a block hash-linked to its predecessor; a block
//! is appended only if linkage, hash integrity and position contiguity hold.
//!
//! ## Routes
//!
//! - `GET /`: the whole chain as pretty JSON
//! - `POST /`: record a checkout (always echoes the payload)
//! - `POST /new`: derive a certificate id from ISBN + publish date
//! - `GET /blocks/:position`, `GET /validate`, `GET /health`
//!
//! State lives in memory only and is lost on restart.

pub mod chain;
pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use chain::{Chain, SharedChain};
pub use config::NodeConfig;
pub use error::{AppError, ChainError, ConfigError};
pub use model::{Block, Certificate, CheckoutPayload};

/// Shared application state passed to Axum handlers.
#[derive(Clone, Default)]
pub struct AppState {
    pub chain: SharedChain,
}

impl AppState {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain: SharedChain::new(chain),
        }
    }
}

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::get_chain).post(routes::write_block))
        .route("/new", post(routes::new_certificate))
        .route("/blocks/:position", get(routes::get_block))
        .route("/validate", get(routes::validate_chain))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
