/// Payment gateway abstraction
///
/// The handshake only needs one call from the gateway: create an order for
/// an amount in currency subunits. Everything else about the provider's
/// protocol stays behind this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An order created by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order reference
    pub id: String,

    /// Amount in currency subunits
    pub amount: u64,

    pub currency: String,
}

/// Gateway failure
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Credentials are not configured; carries the variable name only
    #[error("Payment gateway is not configured: {0} is missing")]
    NotConfigured(&'static str),

    /// The gateway answered with an error
    #[error("Gateway rejected the order ({code}): {message}")]
    Rejected { code: String, message: String },

    /// The gateway could not be reached or answered with garbage
    #[error("Gateway request failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates an order for `amount` subunits of `currency`
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError>;
}
