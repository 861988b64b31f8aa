/// Payment confirmation handshake
///
/// Upgrading to premium is a two-step exchange with the payment gateway:
///
/// ```text
/// create_order(amount)  → gateway order, pending transaction
/// client pays           → gateway returns (order_id, payment_id, signature)
/// verify_payment(...)   → signature checked, transaction success, premium granted
/// ```
///
/// The signature is recomputed server-side with the merchant secret and is
/// the only thing that authenticates the verify call.
///
/// # Modules
///
/// - [`gateway`]: the `PaymentGateway` trait
/// - [`razorpay`]: HTTP implementation of the trait
/// - [`mock`]: in-process implementation for tests
/// - [`signature`]: HMAC-SHA256 signatures
/// - [`handshake`]: the two handshake operations

pub mod gateway;
pub mod handshake;
pub mod mock;
pub mod razorpay;
pub mod signature;

pub use gateway::{GatewayError, GatewayOrder, PaymentGateway};
pub use handshake::{Checkout, Verification};

use crate::store::StoreError;
use uuid::Uuid;

/// Currency used when none is configured
pub const DEFAULT_CURRENCY: &str = "INR";

/// Payment error
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Carries the name of the missing setting, never its value
    #[error("Payment is not configured: {0} is missing")]
    ConfigMissing(&'static str),

    #[error("Gateway error ({code}): {message}")]
    Gateway { code: String, message: String },

    #[error("Signature computation failed: {0}")]
    Signature(String),

    #[error("Payment verification failed: invalid signature")]
    BadSignature,

    #[error("Transaction not found for order {0}")]
    TransactionNotFound(String),

    /// The payment is verified but the entitlement was not granted
    #[error("Payment verified, but failed to update premium status. Please contact support.")]
    EntitlementUpdateFailed { user_id: Uuid, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<GatewayError> for PaymentError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotConfigured(setting) => PaymentError::ConfigMissing(setting),
            GatewayError::Rejected { code, message } => PaymentError::Gateway { code, message },
            GatewayError::Transport(message) => PaymentError::Gateway {
                code: "transport_error".to_string(),
                message,
            },
        }
    }
}

/// Payment result type alias
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Converts a base-unit amount to currency subunits (`round(amount × 100)`)
///
/// # Errors
///
/// `InvalidAmount` if the amount is not finite, not positive, or rounds to
/// less than one subunit.
pub fn to_subunits(amount: f64) -> PaymentResult<u64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentError::InvalidAmount(format!(
            "amount must be a positive number, got {}",
            amount
        )));
    }

    let subunits = (amount * 100.0).round();
    if subunits < 1.0 {
        return Err(PaymentError::InvalidAmount(format!(
            "amount {} is smaller than one subunit",
            amount
        )));
    }

    Ok(subunits as u64)
}
