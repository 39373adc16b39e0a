//! Stripe Checkout Integration
//!
//! Turns a cart snapshot into a hosted Stripe Checkout session. Everything up
//! to the provider call (validation, minor-unit conversion, metadata) is plain
//! data so it can be checked without talking to Stripe.

use std::collections::HashMap;

use async_trait::async_trait;
use cart_core::CartItem;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionLocale, CheckoutSessionMode, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData, CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionPaymentMethodTypes, CreateCheckoutSessionShippingAddressCollection,
    CreateCheckoutSessionShippingAddressCollectionAllowedCountries, Currency,
};

use crate::error::{PaymentError, Result};

/// Placeholder Stripe substitutes with the real session id on redirect
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Description attached to every product line
const PRODUCT_DESCRIPTION: &str = "Suplemento natural para mascotas";

const DEFAULT_FRONTEND_URL: &str = "http://localhost:8080";

/// Customer contact details, carried through to the webhook as metadata
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl CustomerInfo {
    /// Session metadata; absent fields are stored as empty strings
    pub fn metadata(&self) -> HashMap<String, String> {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        HashMap::from([
            ("customer_name".to_string(), field(&self.name)),
            ("customer_phone".to_string(), field(&self.phone)),
            ("customer_address".to_string(), field(&self.address)),
        ])
    }

    /// Email to prefill on the hosted page, if one was given
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// Body of `POST /create-checkout-session`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Cart snapshot; `null` is read as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<CartItem>,

    /// Optional contact details
    #[serde(default)]
    pub customer_info: Option<CustomerInfo>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<CartItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CartItem>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CheckoutRequest {
    /// Validate the cart and convert it into provider line items
    pub fn into_session_request(self) -> Result<SessionRequest> {
        if self.items.is_empty() {
            return Err(PaymentError::Validation("No items provided".into()));
        }

        let line_items = self
            .items
            .iter()
            .map(LineItem::from_cart_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(SessionRequest {
            line_items,
            customer: self.customer_info.unwrap_or_default(),
        })
    }
}

/// A priced product line in the provider's minor-unit convention
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub description: String,
    /// Unit price in centavos
    pub unit_amount: i64,
    pub quantity: u64,
}

impl LineItem {
    pub fn from_cart_item(item: &CartItem) -> Result<Self> {
        if item.qty == 0 {
            return Err(PaymentError::Validation(format!(
                "Item {} has no quantity",
                item.id
            )));
        }

        Ok(Self {
            name: item.name.clone(),
            description: PRODUCT_DESCRIPTION.to_string(),
            unit_amount: to_minor_units(item.price)?,
            quantity: u64::from(item.qty),
        })
    }
}

/// Convert a decimal price to integer centavos, rounding half away from zero
pub fn to_minor_units(price: Decimal) -> Result<i64> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(PaymentError::Validation(format!("Invalid price: {price}")));
    }

    (price * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| PaymentError::Validation(format!("Price out of range: {price}")))
}

/// Validated input for a provider session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRequest {
    pub line_items: Vec<LineItem>,
    pub customer: CustomerInfo,
}

/// Result of creating a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Stripe session ID
    pub id: String,

    /// Hosted checkout page to redirect the customer to
    pub url: String,
}

/// Where Stripe sends the customer after paying or cancelling
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl RedirectUrls {
    /// Build redirects under the storefront's base URL
    pub fn for_frontend(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            success_url: format!("{base}/success?session_id={SESSION_ID_PLACEHOLDER}"),
            cancel_url: format!("{base}/checkout"),
        }
    }
}

/// Hosted checkout provider (Strategy pattern)
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Create a hosted session for the given line items
    async fn create_session(&self, request: &SessionRequest) -> Result<CheckoutSession>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
    redirects: RedirectUrls,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(secret_key: &str, redirects: RedirectUrls) -> Self {
        Self {
            client: Client::new(secret_key),
            redirects,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;
        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| DEFAULT_FRONTEND_URL.into());

        Ok(Self::new(&secret_key, RedirectUrls::for_frontend(&frontend_url)))
    }

    pub fn redirects(&self) -> &RedirectUrls {
        &self.redirects
    }
}

#[async_trait]
impl CheckoutProvider for StripeClient {
    async fn create_session(&self, request: &SessionRequest) -> Result<CheckoutSession> {
        let mut params = CreateCheckoutSession::new();
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.mode = Some(CheckoutSessionMode::Payment);
        params.success_url = Some(&self.redirects.success_url);
        params.cancel_url = Some(&self.redirects.cancel_url);
        params.customer_email = request.customer.email();
        params.metadata = Some(request.customer.metadata());
        params.locale = Some(CheckoutSessionLocale::Es);
        params.shipping_address_collection = Some(CreateCheckoutSessionShippingAddressCollection {
            allowed_countries: vec![
                CreateCheckoutSessionShippingAddressCollectionAllowedCountries::Mx,
            ],
        });

        params.line_items = Some(
            request
                .line_items
                .iter()
                .map(|item| CreateCheckoutSessionLineItems {
                    quantity: Some(item.quantity),
                    price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                        currency: Currency::MXN,
                        unit_amount: Some(item.unit_amount),
                        product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                            name: item.name.clone(),
                            description: Some(item.description.clone()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .collect(),
        );

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::Stripe("No checkout URL returned".into()))?;

        tracing::info!(
            session_id = %session.id,
            lines = request.line_items.len(),
            "Created checkout session"
        );

        Ok(CheckoutSession {
            id: session.id.to_string(),
            url,
        })
    }

    fn name(&self) -> &str {
        "stripe"
    }
}
