/// Razorpay orders client
///
/// Creates orders with `POST {base_url}/v1/orders` using HTTP basic auth
/// (`key_id:key_secret`). Credentials are optional at construction so the
/// server can start without them; their absence surfaces per request as
/// [`GatewayError::NotConfigured`].

use super::gateway::{GatewayError, GatewayOrder, PaymentGateway};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Gateway backed by the Razorpay HTTP API
#[derive(Clone)]
pub struct RazorpayGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: Option<String>,
    key_secret: Option<String>,
}

impl std::fmt::Debug for RazorpayGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayGateway")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &self.key_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: u64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    description: String,
}

impl RazorpayGateway {
    pub fn new(
        base_url: impl Into<String>,
        key_id: Option<String>,
        key_secret: Option<String>,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id: key_id.filter(|k| !k.is_empty()),
            key_secret: key_secret.filter(|k| !k.is_empty()),
        })
    }

    fn credentials(&self) -> Result<(&str, &str), GatewayError> {
        let key_id = self
            .key_id
            .as_deref()
            .ok_or(GatewayError::NotConfigured("RAZORPAY_KEY_ID"))?;
        let key_secret = self
            .key_secret
            .as_deref()
            .ok_or(GatewayError::NotConfigured("RAZORPAY_KEY_SECRET"))?;
        Ok((key_id, key_secret))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let (key_id, key_secret) = self.credentials()?;

        debug!(amount, currency, receipt, "Creating gateway order");

        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(key_id, Some(key_secret))
            .json(&json!({
                "amount": amount,
                "currency": currency,
                "receipt": receipt,
                "payment_capture": 1,
            }))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => GatewayError::Rejected {
                    code: envelope.error.code,
                    message: envelope.error.description,
                },
                Err(_) => GatewayError::Rejected {
                    code: status.as_u16().to_string(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string(),
                },
            };
            warn!(status = status.as_u16(), error = %error, "Gateway order failed");
            return Err(error);
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_are_reported_by_name() {
        let gateway = RazorpayGateway::new(DEFAULT_BASE_URL, Some("rzp_test".to_string()), None).unwrap();

        let err = gateway.create_order(100, "INR", "receipt_1").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotConfigured("RAZORPAY_KEY_SECRET")));
    }

    #[test]
    fn test_empty_credentials_count_as_missing() {
        let gateway = RazorpayGateway::new(DEFAULT_BASE_URL, Some(String::new()), Some(String::new())).unwrap();
        assert!(matches!(
            gateway.credentials(),
            Err(GatewayError::NotConfigured("RAZORPAY_KEY_ID"))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let gateway = RazorpayGateway::new(
            "https://api.example.test/",
            Some("rzp_test".to_string()),
            Some("super-secret-value".to_string()),
        )
        .unwrap();

        let debug = format!("{:?}", gateway);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("https://api.example.test\""));
    }

    #[test]
    fn test_error_envelope_parses() {
        let body = r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"amount is invalid"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.code, "BAD_REQUEST_ERROR");
        assert_eq!(envelope.error.description, "amount is invalid");
    }
}
