//! # storefront-server
//!
//! axum gateway in front of the payment provider:
//!
//! - `POST /create-checkout-session` - cart snapshot in, hosted checkout URL out
//! - `POST /webhook` - signed Stripe events, fanned out to sale notifications
//! - `GET /health` - liveness

pub mod config;
pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::ServerConfig;
pub use state::AppState;

use crate::handlers::{create_checkout_session, health_check, stripe_webhook};

/// Build the application router
pub fn router(state: AppState) -> Router {
    // The storefront is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/webhook", post(stripe_webhook))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
