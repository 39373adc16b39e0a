//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Checkout, webhook and notification errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Request rejected before reaching the provider (e.g. empty cart)
    #[error("{0}")]
    Validation(String),

    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Webhook signature verification failed
    #[error("Webhook signature invalid: {0}")]
    WebhookSignature(String),

    /// Webhook payload parsing failed
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Notification sink responded with an error
    #[error("Notification failed: {0}")]
    Notification(String),

    /// Transport error talking to a notification sink
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Email template failed to render
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Whether the caller sent something we refuse to act on
    ///
    /// These map to 4xx responses; everything else is on our side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PaymentError::Validation(_)
                | PaymentError::WebhookSignature(_)
                | PaymentError::WebhookParse(_)
        )
    }
}
