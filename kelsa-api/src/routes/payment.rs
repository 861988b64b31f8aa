/// Premium checkout endpoints
///
/// # Endpoints
///
/// - `POST /v1/payment` - Create a gateway order for the caller (JWT)
/// - `POST /v1/payment/verify` - Verify the gateway's payment signature
///
/// Verification is not behind the JWT layer. The HMAC signature, computed by
/// the gateway with the merchant secret, is what authenticates it, and the
/// user to upgrade is taken from the stored transaction.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use kelsa_shared::{auth::middleware::AuthContext, payment::Verification};
use serde::{Deserialize, Serialize};

/// Create order request
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Amount in the base currency unit (e.g. rupees)
    pub amount: f64,
}

/// Create order response
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    /// Gateway order ID, passed to the checkout widget
    pub id: String,

    pub currency: String,

    /// Amount in subunits (e.g. paise)
    pub amount: u64,

    /// Public key ID for the checkout widget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

/// Verify request, as posted back by the checkout widget
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_order_id: String,

    #[serde(default)]
    pub razorpay_payment_id: String,

    #[serde(default)]
    pub razorpay_signature: String,
}

/// Verify response
///
/// The endpoint is unauthenticated, so the response names the outcome but
/// not the account it applied to.
#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,

    pub message: String,

    /// `granted` or `already_verified`
    pub status: &'static str,
}

/// Creates a gateway order and records it as pending
///
/// # Request
///
/// ```json
/// { "amount": 500 }
/// ```
///
/// # Response
///
/// ```json
/// { "id": "order_...", "currency": "INR", "amount": 50000 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: amount is not a positive number
/// - `500 Internal Server Error`: gateway not configured or order not recorded
/// - `502 Bad Gateway`: the gateway rejected the order
pub async fn create_order(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Json<CreateOrderResponse>> {
    let order = state.checkout().create_order(auth.user_id, req.amount).await?;

    Ok(Json(CreateOrderResponse {
        id: order.id,
        currency: order.currency,
        amount: order.amount,
        key_id: state.config.payment.key_id.clone(),
    }))
}

/// Verifies a completed payment and grants premium
///
/// Idempotent: verifying an already verified order succeeds without
/// changing anything.
///
/// # Errors
///
/// - `400 Bad Request` (`bad_request`): a field is missing
/// - `400 Bad Request` (`bad_signature`): signature mismatch
/// - `404 Not Found`: no transaction for the order
/// - `500 Internal Server Error` (`entitlement_update_failed`): payment is
///   verified but premium was not granted
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(req): Json<VerifyPaymentRequest>,
) -> ApiResult<Json<VerifyPaymentResponse>> {
    let verification = state
        .checkout()
        .verify_payment(
            &req.razorpay_order_id,
            &req.razorpay_payment_id,
            &req.razorpay_signature,
        )
        .await?;

    let (status, message) = match verification {
        Verification::Granted { .. } => (
            "granted",
            "Payment verified successfully, user status updated.",
        ),
        Verification::AlreadyVerified { .. } => (
            "already_verified",
            "Payment already verified and processed.",
        ),
    };

    Ok(Json(VerifyPaymentResponse {
        success: true,
        message: message.to_string(),
        status,
    }))
}
