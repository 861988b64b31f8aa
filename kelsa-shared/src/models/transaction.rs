/// Payment transaction model and database operations
///
/// One row per checkout attempt. A transaction is created `pending` when the
/// gateway order is created and moves to `success` exactly once, when the
/// payment signature has been verified.
///
/// # State Machine
///
/// ```text
/// pending → success
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE transactions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     order_id VARCHAR(255) NOT NULL UNIQUE,
///     payment_id VARCHAR(255),
///     amount DOUBLE PRECISION NOT NULL CHECK (amount > 0),
///     currency VARCHAR(8) NOT NULL,
///     status TEXT NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Order created, payment not yet verified
    Pending,

    /// Signature verified, entitlement granted
    Success,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
        }
    }

    pub fn can_transition_to(&self, target: TransactionStatus) -> bool {
        matches!(
            (self, target),
            (TransactionStatus::Pending, TransactionStatus::Success)
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded payment attempt
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    /// Unique transaction ID
    pub id: Uuid,

    /// User who started the checkout
    pub user_id: Uuid,

    /// Gateway order reference
    pub order_id: String,

    /// Gateway payment reference, set on success
    pub payment_id: Option<String>,

    /// Amount in the base currency unit (not subunits)
    pub amount: f64,

    /// ISO currency code
    pub currency: String,

    /// Current status
    pub status: TransactionStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording a pending transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransaction {
    pub user_id: Uuid,
    pub order_id: String,
    pub amount: f64,
    pub currency: String,
}

impl Transaction {
    /// Records a pending transaction
    pub async fn create(pool: &PgPool, data: CreateTransaction) -> Result<Self, sqlx::Error> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, order_id, amount, currency, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, user_id, order_id, payment_id, amount, currency, status,
                      created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.order_id)
        .bind(data.amount)
        .bind(data.currency)
        .fetch_one(pool)
        .await?;

        Ok(transaction)
    }

    /// Finds a transaction by gateway order reference
    pub async fn find_by_order_id(
        pool: &PgPool,
        order_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, order_id, payment_id, amount, currency, status,
                   created_at, updated_at
            FROM transactions
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(pool)
        .await?;

        Ok(transaction)
    }

    /// Transitions a pending transaction to success
    ///
    /// The update is conditional on the current status, so concurrent
    /// verifiers cannot both perform the transition.
    ///
    /// # Returns
    ///
    /// True if this call performed the transition, false if the transaction
    /// does not exist or was no longer pending
    pub async fn mark_success(
        pool: &PgPool,
        order_id: &str,
        payment_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = 'success', payment_id = $2, updated_at = NOW()
            WHERE order_id = $1 AND status = 'pending'
            "#,
        )
        .bind(order_id)
        .bind(payment_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
