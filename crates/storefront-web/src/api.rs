//! API client for the storefront server

use cart_core::CartItem;
use serde::{Deserialize, Serialize};

/// Contact details entered on the checkout page
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CustomerForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl CustomerForm {
    /// Build from raw input values; blank fields are omitted
    pub fn from_fields(email: &str, name: &str, phone: &str, address: &str) -> Self {
        let field = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Self {
            email: field(email),
            name: field(name),
            phone: field(phone),
            address: field(address),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutBody<'a> {
    items: &'a [CartItem],
    customer_info: &'a CustomerForm,
}

/// Hosted checkout page returned by the server
#[derive(Clone, Debug, Deserialize)]
pub struct CheckoutRedirect {
    pub url: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: String,
}

/// Server base URL: build-time `STOREFRONT_API_URL`, else the page origin
fn api_base() -> String {
    option_env!("STOREFRONT_API_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .or_else(|| web_sys::window().and_then(|w| w.location().origin().ok()))
        .unwrap_or_default()
}

/// Ask the server for a hosted checkout session
pub async fn create_checkout_session(
    items: &[CartItem],
    customer: &CustomerForm,
) -> Result<CheckoutRedirect, String> {
    let client = reqwest::Client::new();
    let body = CheckoutBody {
        items,
        customer_info: customer,
    };

    let response = client
        .post(format!("{}/create-checkout-session", api_base()))
        .json(&body)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response
            .json::<CheckoutRedirect>()
            .await
            .map_err(|e| e.to_string())
    } else {
        let status = response.status();
        let message = response
            .json::<ApiError>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("Request failed: {status}"));
        Err(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_customer_form_blank_fields_omitted() {
        let form = CustomerForm::from_fields(" ana@example.com ", "Ana", "", "   ");
        assert_eq!(form.email.as_deref(), Some("ana@example.com"));
        assert_eq!(form.phone, None);
        assert_eq!(form.address, None);
    }

    #[test]
    fn test_checkout_body_shape() {
        let items = vec![CartItem {
            qty: 2,
            ..CartItem::new("A", "Food", dec!(250.5))
        }];
        let form = CustomerForm::from_fields("", "Ana", "", "");
        let body = CheckoutBody {
            items: &items,
            customer_info: &form,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["items"][0]["price"], 250.5);
        assert_eq!(json["items"][0]["qty"], 2);
        assert_eq!(json["customerInfo"], serde_json::json!({"name": "Ana"}));
    }

    #[test]
    fn test_redirect_parse() {
        let redirect: CheckoutRedirect =
            serde_json::from_str(r#"{"url":"https://checkout.stripe.com/c/pay/cs_1","sessionId":"cs_1"}"#)
                .unwrap();
        assert_eq!(redirect.url, "https://checkout.stripe.com/c/pay/cs_1");
    }
}
