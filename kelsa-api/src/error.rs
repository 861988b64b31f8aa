/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`; the domain errors from
/// `kelsa-shared` convert into it with `?`.
///
/// # Example
///
/// ```
/// use kelsa_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(name: String) -> ApiResult<Json<Value>> {
///     if name.trim().is_empty() {
///         return Err(ApiError::BadRequest("name is required".to_string()));
///     }
///     Ok(Json(json!({ "name": name })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kelsa_shared::{
    auth::{jwt::JwtError, middleware::AuthError, password::PasswordError},
    board::BoardError,
    entitlement::EntitlementError,
    payment::PaymentError,
    reorder::ReorderError,
    store::StoreError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Payment signature mismatch (400)
    BadSignature(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Entitlement required (402)
    UpgradeRequired(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Payment verified but premium was not granted (500)
    EntitlementUpdateFailed(String),

    /// Payment gateway failure (502)
    BadGateway { code: String, message: String },

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::BadSignature(msg) => write!(f, "Bad signature: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::UpgradeRequired(msg) => write!(f, "Upgrade required: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::EntitlementUpdateFailed(msg) => write!(f, "Entitlement update failed: {}", msg),
            ApiError::BadGateway { code, message } => {
                write!(f, "Gateway error ({}): {}", code, message)
            }
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::BadSignature(msg) => (StatusCode::BAD_REQUEST, "bad_signature", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::UpgradeRequired(msg) => {
                (StatusCode::PAYMENT_REQUIRED, "upgrade_required", msg, None)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::EntitlementUpdateFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "entitlement_update_failed",
                msg,
                None,
            ),
            ApiError::BadGateway { code, message } => (
                StatusCode::BAD_GATEWAY,
                "gateway_error",
                format!("Payment gateway error ({}): {}", code, message),
                None,
            ),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg, None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert request body validation failures
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(errors)
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) if constraint.contains("email") => {
                ApiError::Conflict("Email already exists".to_string())
            }
            StoreError::Conflict(constraint) => {
                ApiError::Conflict(format!("Constraint violation: {}", constraint))
            }
            StoreError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

/// Convert entitlement errors to API errors
impl From<EntitlementError> for ApiError {
    fn from(err: EntitlementError) -> Self {
        match err {
            EntitlementError::LimitExceeded { .. } => ApiError::UpgradeRequired(err.to_string()),
            EntitlementError::UserNotFound(_) => ApiError::NotFound("User not found".to_string()),
            EntitlementError::Store(e) => e.into(),
        }
    }
}

/// Convert board errors to API errors
impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::NotFound(_) => ApiError::NotFound(err.to_string()),
            BoardError::Invalid(msg) => ApiError::BadRequest(msg),
            BoardError::Entitlement(e) => e.into(),
            BoardError::Store(e) => e.into(),
        }
    }
}

/// Convert reorder errors to API errors
impl From<ReorderError> for ApiError {
    fn from(err: ReorderError) -> Self {
        match err {
            ReorderError::BoardNotFound(_)
            | ReorderError::ListNotFound(_)
            | ReorderError::CardNotFound(_) => ApiError::NotFound(err.to_string()),
            ReorderError::StaleSource { .. }
            | ReorderError::InvalidDestination(_)
            | ReorderError::InvalidOrder(_) => ApiError::BadRequest(err.to_string()),
            ReorderError::Store(e) => e.into(),
        }
    }
}

/// Convert payment errors to API errors
impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidAmount(_) => ApiError::BadRequest(err.to_string()),
            PaymentError::MissingField(_) => ApiError::BadRequest(
                "Missing required payment verification parameters.".to_string(),
            ),
            PaymentError::ConfigMissing(setting) => {
                // Names the setting only; the value is never part of the error
                tracing::error!(setting, "Payment configuration missing");
                ApiError::InternalError(format!("Payment is not configured ({})", setting))
            }
            PaymentError::Gateway { code, message } => ApiError::BadGateway { code, message },
            PaymentError::Signature(msg) => ApiError::InternalError(msg),
            PaymentError::BadSignature => ApiError::BadSignature(
                "Payment verification failed: Invalid signature.".to_string(),
            ),
            PaymentError::TransactionNotFound(_) => ApiError::NotFound(
                "Transaction record not found for this order ID.".to_string(),
            ),
            PaymentError::EntitlementUpdateFailed { .. } => {
                ApiError::EntitlementUpdateFailed(err.to_string())
            }
            PaymentError::Store(e) => e.into(),
        }
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::Unauthorized("Missing credentials".to_string()),
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::CreateError(msg) => {
                ApiError::InternalError(format!("Token creation failed: {}", msg))
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}
