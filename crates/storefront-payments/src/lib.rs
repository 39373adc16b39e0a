//! # storefront-payments
//!
//! Checkout sessions and payment webhooks for the storefront.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐  cart   ┌─────────────┐  session  ┌─────────────────┐
//! │  Storefront │────────▶│   Gateway   │──────────▶│  Stripe Hosted  │
//! │   (cart)    │◀────────│             │           │  Checkout Page  │
//! └─────────────┘   url   └─────────────┘           └────────┬────────┘
//!                               ▲                            │
//!                               │ checkout.session.completed │
//!                               └────────────────────────────┘
//!                               │
//!                               ▼
//!                   ┌───────────────────────┐
//!                   │  NotificationFanout   │──▶ email (Resend)
//!                   │                       │──▶ chat (Discord)
//!                   └───────────────────────┘
//! ```
//!
//! Only the session creation is visible to the customer. Webhook-side
//! failures (bad signatures, sink errors) end up in the logs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_payments::{CheckoutProvider, CheckoutRequest, StripeClient};
//!
//! let stripe = StripeClient::from_env()?;
//! let request: CheckoutRequest = serde_json::from_slice(&body)?;
//! let session = stripe.create_session(&request.into_session_request()?).await?;
//!
//! // Redirect customer to: session.url
//! ```

mod checkout;
mod error;
mod notify;
mod webhook;

pub use checkout::{
    CheckoutProvider, CheckoutRequest, CheckoutSession, CustomerInfo, LineItem, RedirectUrls,
    SESSION_ID_PLACEHOLDER, SessionRequest, StripeClient, to_minor_units,
};
pub use error::{PaymentError, Result};
pub use notify::{
    DeliveryReport, DiscordNotifier, EmailNotifier, NotificationConfig, NotificationFanout,
    Notifier,
};
pub use webhook::{
    CHECKOUT_SESSION_COMPLETED, DEFAULT_TOLERANCE_SECS, PaymentEvent, WebhookEvent,
    WebhookHandler, WebhookVerifier,
};
