//! Sale Notifications
//!
//! Fans a completed payment out to the configured sinks (owner email via
//! Resend, Discord channel webhook). Sinks are independent and best-effort:
//! each failure is logged and never retried.

use std::sync::Arc;

use askama::Template;
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use serde_json::json;

use crate::error::{PaymentError, Result};
use crate::webhook::PaymentEvent;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_FROM: &str = "Happy & Healthy Pets <ventas@resend.dev>";
const DEFAULT_STORE_NAME: &str = "Happy & Healthy Pets";
const EMBED_COLOR: u32 = 0x0022_c55e;

/// HTML body of the owner's sale email
#[derive(Template)]
#[template(path = "email/sale.html")]
struct SaleEmailHtml<'a> {
    amount: String,
    currency: String,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    address: &'a str,
    session_id: &'a str,
}

/// Notification settings, all optional
#[derive(Clone, Debug, Default)]
pub struct NotificationConfig {
    /// Owner address; enables the email sink
    pub notification_email: Option<String>,

    /// Resend key; without it the email is only logged
    pub resend_api_key: Option<String>,

    /// Sender shown on the email
    pub from_address: Option<String>,

    /// Discord channel webhook; enables the chat sink
    pub discord_webhook_url: Option<String>,

    /// Store name used in message titles
    pub store_name: Option<String>,
}

impl NotificationConfig {
    /// Read from environment variables. Empty values count as unset.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            notification_email: var("NOTIFICATION_EMAIL"),
            resend_api_key: var("RESEND_API_KEY"),
            from_address: var("NOTIFICATION_FROM"),
            discord_webhook_url: var("DISCORD_WEBHOOK_URL"),
            store_name: var("STORE_NAME"),
        }
    }

    fn store_name(&self) -> String {
        self.store_name
            .clone()
            .unwrap_or_else(|| DEFAULT_STORE_NAME.into())
    }
}

/// A notification sink (Strategy pattern)
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a sale notification
    async fn notify(&self, payment: &PaymentEvent) -> Result<()>;

    /// Sink name, used in logs and delivery reports
    fn name(&self) -> &str;
}

/// Outcome of one fan-out
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    /// Sink name and error message
    pub failed: Vec<(String, String)>,
}

/// Dispatches a payment to every configured sink concurrently
#[derive(Default)]
pub struct NotificationFanout {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl NotificationFanout {
    pub fn new(sinks: Vec<Arc<dyn Notifier>>) -> Self {
        Self { sinks }
    }

    /// Build the sinks enabled by `config`
    pub fn from_config(config: &NotificationConfig, client: reqwest::Client) -> Self {
        let mut sinks: Vec<Arc<dyn Notifier>> = Vec::new();
        let store_name = config.store_name();

        if let Some(to) = &config.notification_email {
            sinks.push(Arc::new(EmailNotifier {
                client: client.clone(),
                to: to.clone(),
                from: config
                    .from_address
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FROM.into()),
                api_key: config.resend_api_key.clone(),
            }));
        }

        if let Some(url) = &config.discord_webhook_url {
            sinks.push(Arc::new(DiscordNotifier {
                client,
                webhook_url: url.clone(),
                store_name,
            }));
        }

        Self { sinks }
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Notify every sink; failures are logged and collected, never returned
    pub async fn dispatch(&self, payment: &PaymentEvent) -> DeliveryReport {
        let results = join_all(self.sinks.iter().map(|sink| async move {
            (sink.name().to_string(), sink.notify(payment).await)
        }))
        .await;

        let mut report = DeliveryReport::default();
        for (name, result) in results {
            match result {
                Ok(()) => {
                    tracing::info!(sink = %name, session_id = %payment.session_id, "✓ Notification sent");
                    report.delivered.push(name);
                }
                Err(e) => {
                    tracing::error!(sink = %name, session_id = %payment.session_id, error = %e, "Notification failed");
                    report.failed.push((name, e.to_string()));
                }
            }
        }
        report
    }
}

/// Owner email via the Resend API, or a log line when no key is configured
pub struct EmailNotifier {
    client: reqwest::Client,
    to: String,
    from: String,
    api_key: Option<String>,
}

impl EmailNotifier {
    fn subject(payment: &PaymentEvent) -> String {
        format!(
            "🎉 ¡Nueva Venta! ${} {} - {}",
            payment.amount(),
            payment.currency_code(),
            payment.customer_name().unwrap_or("Cliente")
        )
    }

    fn html(payment: &PaymentEvent) -> Result<String> {
        let html = SaleEmailHtml {
            amount: payment.amount().to_string(),
            currency: payment.currency_code(),
            name: payment.customer_name().unwrap_or("Cliente"),
            email: payment.customer_email.as_deref().unwrap_or("No especificado"),
            phone: payment.customer_phone().unwrap_or("No especificado"),
            address: payment.customer_address().unwrap_or("No especificada"),
            session_id: &payment.session_id,
        }
        .render()?;
        Ok(html)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, payment: &PaymentEvent) -> Result<()> {
        let subject = Self::subject(payment);

        let Some(api_key) = &self.api_key else {
            tracing::info!(
                to = %self.to,
                subject = %subject,
                "📧 Email notification (configure RESEND_API_KEY to send)"
            );
            return Ok(());
        };

        let body = json!({
            "from": self.from,
            "to": self.to,
            "subject": subject,
            "html": Self::html(payment)?,
        });

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PaymentError::Notification(format!(
                "Resend returned {status}: {text}"
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }
}

/// Discord channel message with a sale embed
pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook_url: String,
    store_name: String,
}

impl DiscordNotifier {
    fn payload(&self, payment: &PaymentEvent) -> serde_json::Value {
        json!({
            "embeds": [{
                "title": format!("🎉 ¡Nueva Venta en {}!", self.store_name),
                "color": EMBED_COLOR,
                "fields": [
                    {
                        "name": "💵 Monto",
                        "value": format!("${} {}", payment.amount(), payment.currency_code()),
                        "inline": true
                    },
                    {
                        "name": "📧 Email",
                        "value": payment.customer_email.as_deref().unwrap_or("N/A"),
                        "inline": true
                    },
                    {
                        "name": "👤 Cliente",
                        "value": payment.customer_name().unwrap_or("N/A"),
                        "inline": false
                    }
                ],
                "timestamp": Utc::now().to_rfc3339(),
            }]
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, payment: &PaymentEvent) -> Result<()> {
        self.client
            .post(&self.webhook_url)
            .json(&self.payload(payment))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "discord"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and optionally fails
    pub(crate) struct RecordingNotifier {
        name: String,
        fail: bool,
        calls: AtomicUsize,
    }

    impl RecordingNotifier {
        pub(crate) fn new(name: &str, fail: bool) -> Self {
            Self {
                name: name.into(),
                fail,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, _payment: &PaymentEvent) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PaymentError::Notification("sink down".into()));
            }
            Ok(())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    fn payment() -> PaymentEvent {
        PaymentEvent {
            event_id: Some("evt_1".into()),
            event_type: "checkout.session.completed".into(),
            session_id: "cs_test_1".into(),
            amount_total: Some(25050),
            currency: Some("mxn".into()),
            customer_email: Some("ana@example.com".into()),
            metadata: HashMap::from([("customer_name".to_string(), "Ana <b>".to_string())]),
        }
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_block_other() {
        let failing = Arc::new(RecordingNotifier::new("email", true));
        let working = Arc::new(RecordingNotifier::new("discord", false));
        let fanout = NotificationFanout::new(vec![failing.clone(), working.clone()]);

        let report = fanout.dispatch(&payment()).await;

        assert_eq!(failing.calls(), 1);
        assert_eq!(working.calls(), 1);
        assert_eq!(report.delivered, vec!["discord".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "email");
    }

    #[tokio::test]
    async fn test_empty_fanout() {
        let report = NotificationFanout::default().dispatch(&payment()).await;
        assert_eq!(report, DeliveryReport::default());
    }

    #[test]
    fn test_sinks_follow_config() {
        let client = reqwest::Client::new();

        let none = NotificationFanout::from_config(&NotificationConfig::default(), client.clone());
        assert!(none.is_empty());

        let email_only = NotificationConfig {
            notification_email: Some("owner@example.com".into()),
            ..Default::default()
        };
        let fanout = NotificationFanout::from_config(&email_only, client.clone());
        assert_eq!(fanout.sink_names(), vec!["email"]);

        let both = NotificationConfig {
            notification_email: Some("owner@example.com".into()),
            discord_webhook_url: Some("https://discord.example/api/webhooks/1".into()),
            ..Default::default()
        };
        let fanout = NotificationFanout::from_config(&both, client);
        assert_eq!(fanout.sink_names(), vec!["email", "discord"]);
    }

    #[tokio::test]
    async fn test_email_without_key_only_logs() {
        let notifier = EmailNotifier {
            client: reqwest::Client::new(),
            to: "owner@example.com".into(),
            from: DEFAULT_FROM.into(),
            api_key: None,
        };
        assert!(notifier.notify(&payment()).await.is_ok());
    }

    #[test]
    fn test_email_content() {
        let p = payment();
        assert_eq!(
            EmailNotifier::subject(&p),
            "🎉 ¡Nueva Venta! $250.50 MXN - Ana <b>"
        );

        let html = EmailNotifier::html(&p).unwrap();
        assert!(html.contains("Ana &#60;b&#62;") || html.contains("Ana &lt;b&gt;"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("No especificado"));
        assert!(html.contains("cs_test_1"));
    }

    #[test]
    fn test_discord_payload() {
        let notifier = DiscordNotifier {
            client: reqwest::Client::new(),
            webhook_url: "https://discord.example/api/webhooks/1".into(),
            store_name: DEFAULT_STORE_NAME.into(),
        };

        let payload = notifier.payload(&payment());
        let embed = &payload["embeds"][0];
        assert_eq!(embed["color"], EMBED_COLOR);
        assert_eq!(embed["fields"][0]["value"], "$250.50 MXN");
        assert_eq!(embed["fields"][1]["value"], "ana@example.com");
    }
}
