//! Stripe Webhook Handling
//!
//! Verifies `stripe-signature` headers against the raw request body and turns
//! verified payloads into [`WebhookEvent`]s. Completed checkouts are handed to
//! the notification fan-out.
//!
//! Header format: `t=<unix seconds>,v1=<hex hmac>[,v1=<hex hmac>...]`, where
//! each `v1` is HMAC-SHA256 of `"<t>.<raw body>"` keyed with the endpoint's
//! signing secret.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;

use crate::error::{PaymentError, Result};
use crate::notify::{DeliveryReport, NotificationFanout};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload before it is refused
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Event type Stripe sends once a hosted checkout is paid
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Checks webhook signatures for one signing secret.
///
/// Verification is done here rather than through `stripe::Webhook`, whose
/// typed `Event` deserialization rejects minimal payloads and event shapes
/// newer than the pinned API version. Only the fields the fan-out needs are
/// read from the verified body.
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .map_err(|_| PaymentError::Config("STRIPE_WEBHOOK_SECRET not set".into()))?;
        Ok(Self::new(secret))
    }

    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verify the signature and parse the event.
    ///
    /// Nothing in the payload is looked at until the signature checks out.
    pub fn construct_event(&self, payload: &[u8], signature_header: &str) -> Result<WebhookEvent> {
        self.verify(payload, signature_header)?;
        WebhookEvent::parse(payload)
    }

    /// Verify a signature header against the raw payload
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<()> {
        self.verify_at(payload, signature_header, Utc::now().timestamp())
    }

    fn verify_at(&self, payload: &[u8], signature_header: &str, now: i64) -> Result<()> {
        let header = SignatureHeader::parse(signature_header)?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| PaymentError::WebhookSignature(e.to_string()))?;
        mac.update(header.timestamp_raw.as_bytes());
        mac.update(b".");
        mac.update(payload);

        let matched = header
            .signatures
            .iter()
            .filter_map(|sig| hex::decode(sig).ok())
            .any(|sig| mac.clone().verify_slice(&sig).is_ok());

        if !matched {
            return Err(PaymentError::WebhookSignature(
                "No signatures found matching the expected signature for payload".into(),
            ));
        }

        if self.tolerance_secs > 0 && now - header.timestamp > self.tolerance_secs {
            return Err(PaymentError::WebhookSignature(
                "Timestamp outside the tolerance zone".into(),
            ));
        }

        Ok(())
    }
}

struct SignatureHeader {
    timestamp: i64,
    timestamp_raw: String,
    signatures: Vec<String>,
}

impl SignatureHeader {
    fn parse(header: &str) -> Result<Self> {
        let mut timestamp_raw = None;
        let mut signatures = Vec::new();

        for (key, value) in header.split(',').filter_map(|part| part.trim().split_once('=')) {
            match key {
                "t" => timestamp_raw = Some(value.to_string()),
                "v1" => signatures.push(value.to_string()),
                _ => {}
            }
        }

        let (timestamp_raw, timestamp) = timestamp_raw
            .and_then(|raw| raw.parse::<i64>().ok().map(|t| (raw, t)))
            .ok_or_else(|| {
                PaymentError::WebhookSignature(
                    "Unable to extract timestamp and signatures from header".into(),
                )
            })?;

        if signatures.is_empty() {
            return Err(PaymentError::WebhookSignature(
                "No signatures found with expected scheme".into(),
            ));
        }

        Ok(Self {
            timestamp,
            timestamp_raw,
            signatures,
        })
    }
}

/// Parsed webhook event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Checkout paid - notify the shop owner
    CheckoutCompleted(PaymentEvent),

    /// Anything else; acknowledged and ignored
    Other { event_type: String },
}

impl WebhookEvent {
    /// Parse a (verified) Stripe event payload
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let raw: RawEvent = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::WebhookParse(e.to_string()))?;

        if raw.event_type != CHECKOUT_SESSION_COMPLETED {
            return Ok(Self::Other {
                event_type: raw.event_type,
            });
        }

        let session: RawCheckoutSession = serde_json::from_value(raw.data.object)
            .map_err(|e| PaymentError::WebhookParse(format!("Invalid checkout session data: {e}")))?;

        let customer_email = session
            .customer_email
            .or_else(|| session.customer_details.and_then(|d| d.email));

        Ok(Self::CheckoutCompleted(PaymentEvent {
            event_id: raw.id,
            event_type: raw.event_type,
            session_id: session.id,
            amount_total: session.amount_total,
            currency: session.currency,
            customer_email,
            metadata: session.metadata.unwrap_or_default(),
        }))
    }

    pub fn event_type(&self) -> &str {
        match self {
            Self::CheckoutCompleted(payment) => &payment.event_type,
            Self::Other { event_type } => event_type,
        }
    }
}

/// A completed checkout, as reported by the provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentEvent {
    pub event_id: Option<String>,
    pub event_type: String,
    pub session_id: String,
    /// Amount charged in centavos
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl PaymentEvent {
    /// Amount in major units with two decimals (25050 -> 250.50)
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.amount_total.unwrap_or(0), 2)
    }

    /// Upper-case ISO currency, MXN when the provider omitted it
    pub fn currency_code(&self) -> String {
        self.currency
            .as_deref()
            .map_or_else(|| "MXN".to_string(), str::to_uppercase)
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.metadata_field("customer_name")
    }

    pub fn customer_phone(&self) -> Option<&str> {
        self.metadata_field("customer_phone")
    }

    pub fn customer_address(&self) -> Option<&str> {
        self.metadata_field("customer_address")
    }

    fn metadata_field(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

#[derive(Deserialize)]
struct RawCheckoutSession {
    id: String,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    customer_details: Option<RawCustomerDetails>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

#[derive(Deserialize)]
struct RawCustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

/// Webhook handler
pub struct WebhookHandler {
    fanout: Arc<NotificationFanout>,
}

impl WebhookHandler {
    pub fn new(fanout: Arc<NotificationFanout>) -> Self {
        Self { fanout }
    }

    /// Act on a verified event.
    ///
    /// Returns the delivery report when a completed checkout triggered the
    /// fan-out. Sink failures are logged inside the report, never returned.
    pub async fn handle(&self, event: &WebhookEvent) -> Option<DeliveryReport> {
        tracing::info!(event_type = %event.event_type(), "Processing Stripe webhook");

        match event {
            WebhookEvent::CheckoutCompleted(payment) => {
                tracing::info!(
                    session_id = %payment.session_id,
                    amount = %payment.amount(),
                    currency = %payment.currency_code(),
                    email = payment.customer_email.as_deref().unwrap_or("-"),
                    customer = payment.customer_name().unwrap_or("-"),
                    "💰 New sale received"
                );

                Some(self.fanout.dispatch(payment).await)
            }

            WebhookEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "Unhandled webhook event");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::tests::RecordingNotifier;

    const SECRET: &str = "whsec_test123secret456";

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn completed_payload() -> Vec<u8> {
        serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_test_123",
                "object": "checkout.session",
                "amount_total": 50100,
                "currency": "mxn",
                "customer_email": "ana@example.com",
                "metadata": {
                    "customer_name": "Ana",
                    "customer_phone": "",
                    "customer_address": "Calle 1"
                }
            }}
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_valid_signature_parses_event() {
        let payload = completed_payload();
        let header = sign(&payload, SECRET, Utc::now().timestamp());

        let event = WebhookVerifier::new(SECRET)
            .construct_event(&payload, &header)
            .unwrap();

        let WebhookEvent::CheckoutCompleted(payment) = event else {
            panic!("expected completed checkout");
        };
        assert_eq!(payment.session_id, "cs_test_123");
        assert_eq!(payment.amount().to_string(), "501.00");
        assert_eq!(payment.currency_code(), "MXN");
        assert_eq!(payment.customer_email.as_deref(), Some("ana@example.com"));
        assert_eq!(payment.customer_name(), Some("Ana"));
        assert_eq!(payment.customer_phone(), None);
        assert_eq!(payment.customer_address(), Some("Calle 1"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = completed_payload();
        let header = sign(&payload, "wrong_secret", Utc::now().timestamp());

        let err = WebhookVerifier::new(SECRET).verify(&payload, &header).unwrap_err();
        assert!(matches!(err, PaymentError::WebhookSignature(_)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let payload = completed_payload();
        let header = sign(&payload, SECRET, Utc::now().timestamp());

        let mut tampered = payload.clone();
        tampered.extend_from_slice(b" ");
        assert!(WebhookVerifier::new(SECRET).verify(&tampered, &header).is_err());
    }

    #[test]
    fn test_old_timestamp_rejected() {
        let payload = completed_payload();
        let timestamp = Utc::now().timestamp() - 600;
        let header = sign(&payload, SECRET, timestamp);

        assert!(WebhookVerifier::new(SECRET).verify(&payload, &header).is_err());
        assert!(
            WebhookVerifier::new(SECRET)
                .with_tolerance(0)
                .verify(&payload, &header)
                .is_ok()
        );
    }

    #[test]
    fn test_malformed_headers_rejected() {
        let verifier = WebhookVerifier::new(SECRET);
        for header in ["", "garbage", "v1=abcdef", "t=1234567890", "t=abc,v1=00"] {
            assert!(verifier.verify(b"{}", header).is_err(), "accepted {header:?}");
        }
    }

    #[test]
    fn test_any_matching_v1_accepted() {
        let payload = completed_payload();
        let now = Utc::now().timestamp();
        let good = sign(&payload, SECRET, now);
        let good_sig = good.split_once(",v1=").unwrap().1;
        let header = format!("t={now},v1=deadbeef,v0=ignored,v1={good_sig}");

        assert!(WebhookVerifier::new(SECRET).verify(&payload, &header).is_ok());
    }

    #[test]
    fn test_unknown_event_type() {
        let payload = br#"{"id":"evt_2","type":"payment_intent.created","data":{"object":{"id":"pi_1"}}}"#;
        let event = WebhookEvent::parse(payload).unwrap();
        assert_eq!(
            event,
            WebhookEvent::Other {
                event_type: "payment_intent.created".into()
            }
        );
    }

    #[test]
    fn test_customer_details_email_fallback() {
        let payload = br#"{"type":"checkout.session.completed","data":{"object":{
            "id":"cs_1","amount_total":100,"customer_email":null,
            "customer_details":{"email":"luis@example.com"},"metadata":null}}}"#;

        let WebhookEvent::CheckoutCompleted(payment) = WebhookEvent::parse(payload).unwrap() else {
            panic!("expected completed checkout");
        };
        assert_eq!(payment.customer_email.as_deref(), Some("luis@example.com"));
        assert!(payment.metadata.is_empty());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = WebhookEvent::parse(b"not json").unwrap_err();
        assert!(matches!(err, PaymentError::WebhookParse(_)));
    }

    #[tokio::test]
    async fn test_handler_fans_out_once_per_completed_event() {
        let sink = Arc::new(RecordingNotifier::new("email", false));
        let fanout = Arc::new(NotificationFanout::new(vec![sink.clone()]));
        let handler = WebhookHandler::new(fanout);

        let event = WebhookEvent::parse(&completed_payload()).unwrap();
        let report = handler.handle(&event).await.unwrap();
        assert_eq!(report.delivered, vec!["email".to_string()]);

        // Replays are not deduplicated
        handler.handle(&event).await;
        assert_eq!(sink.calls(), 2);

        let other = WebhookEvent::Other {
            event_type: "invoice.paid".into(),
        };
        assert!(handler.handle(&other).await.is_none());
        assert_eq!(sink.calls(), 2);
    }
}
