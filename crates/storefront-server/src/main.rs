//! Storefront checkout gateway
//!
//! Creates Stripe Checkout sessions for the storefront and relays completed
//! payments to the shop owner's email and Discord channel.

use std::sync::Arc;

use storefront_payments::{
    CheckoutProvider, NotificationConfig, NotificationFanout, StripeClient, WebhookHandler,
    WebhookVerifier,
};
use storefront_server::{AppState, ServerConfig, router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize payments
    let checkout: Option<Arc<dyn CheckoutProvider>> = match StripeClient::from_env() {
        Ok(stripe) => {
            tracing::info!(success_url = %stripe.redirects().success_url, "✓ Stripe configured");
            Some(Arc::new(stripe))
        }
        Err(e) => {
            tracing::warn!("⚠ {e} - checkout disabled");
            None
        }
    };

    let verifier = match WebhookVerifier::from_env() {
        Ok(verifier) => Some(Arc::new(verifier)),
        Err(e) => {
            tracing::warn!("⚠ {e} - webhooks disabled");
            None
        }
    };

    // Initialize notification sinks
    let notifications = NotificationConfig::from_env();
    let fanout = NotificationFanout::from_config(&notifications, reqwest::Client::new());

    if fanout.is_empty() {
        tracing::warn!("⚠ No notification sinks configured - sales will only be logged");
        tracing::warn!("  Set NOTIFICATION_EMAIL and/or DISCORD_WEBHOOK_URL in .env");
    } else {
        tracing::info!(sinks = ?fanout.sink_names(), "✓ Notifications configured");
    }
    if notifications.notification_email.is_some() && notifications.resend_api_key.is_none() {
        tracing::info!("  RESEND_API_KEY not set - sale emails will be logged, not sent");
    }

    // Build application state
    let state = AppState {
        checkout,
        verifier,
        webhooks: Arc::new(WebhookHandler::new(Arc::new(fanout))),
    };

    let app = router(state);

    // Start server
    let config = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 storefront-server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                  - Health check");
    tracing::info!("  POST /create-checkout-session - Create Stripe checkout");
    tracing::info!("  POST /webhook                 - Stripe webhook");

    axum::serve(listener, app).await?;

    Ok(())
}
