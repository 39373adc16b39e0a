//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use storefront_payments::CheckoutRequest;

use crate::state::AppState;

/// Header Stripe signs webhook deliveries with
pub const SIGNATURE_HEADER: &str = "stripe-signature";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub url: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Create a hosted checkout session for a cart snapshot
pub async fn create_checkout_session(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Unreadable checkout request");
        api_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
    })?;

    let request = payload.into_session_request().map_err(|e| {
        tracing::warn!(error = %e, "Rejected checkout request");
        api_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", e.to_string())
    })?;

    let provider = state.checkout.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "PAYMENTS_DISABLED",
            "Payments not configured",
        )
    })?;

    let session = provider.create_session(&request).await.map_err(|e| {
        tracing::error!(provider = provider.name(), error = %e, "Error creating checkout session");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "CHECKOUT_ERROR", e.to_string())
    })?;

    Ok(Json(CheckoutResponse {
        url: session.url,
        session_id: session.id,
    }))
}

/// Stripe webhook receiver.
///
/// Takes the body as raw bytes: the signature covers the exact payload.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(verifier) = state.verifier.as_ref() else {
        tracing::warn!("⚠ Webhook rejected: STRIPE_WEBHOOK_SECRET not set");
        return webhook_error("Webhook signing secret not configured");
    };

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!("⚠ Webhook rejected: missing Stripe signature");
        return webhook_error("Missing Stripe signature");
    };

    let event = match verifier.construct_event(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "⚠ Webhook signature verification failed");
            return webhook_error(&e.to_string());
        }
    };

    // Sink failures are logged by the fan-out; delivery is still acknowledged
    state.webhooks.handle(&event).await;

    Json(WebhookAck { received: true }).into_response()
}

fn webhook_error(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, format!("Webhook Error: {message}")).into_response()
}
