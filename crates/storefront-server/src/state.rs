//! Application State

use std::sync::Arc;

use storefront_payments::{CheckoutProvider, WebhookHandler, WebhookVerifier};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout provider (optional - None if Stripe is not configured)
    pub checkout: Option<Arc<dyn CheckoutProvider>>,

    /// Webhook signature verifier (optional - None without a signing secret)
    pub verifier: Option<Arc<WebhookVerifier>>,

    /// Acts on verified webhook events
    pub webhooks: Arc<WebhookHandler>,
}
