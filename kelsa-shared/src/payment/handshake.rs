/// The two handshake operations
///
/// [`Checkout::create_order`] asks the gateway for an order and records a
/// pending transaction. [`Checkout::verify_payment`] checks the gateway's
/// signature, marks the transaction `success` and grants premium.
///
/// # Example
///
/// ```
/// use kelsa_shared::models::user::CreateUser;
/// use kelsa_shared::payment::{mock::MockGateway, signature::compute_signature, Checkout, Verification};
/// use kelsa_shared::store::{memory::MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let gateway = MockGateway::new();
/// let user = store.create_user(CreateUser {
///     email: "ada@example.com".to_string(),
///     password_hash: "hash".to_string(),
///     name: None,
/// }).await?;
///
/// let checkout = Checkout::new(&store, &gateway, Some("merchant-secret"), "INR");
/// let order = checkout.create_order(user.id, 1.0).await?;
/// assert_eq!(order.amount, 100);
///
/// let signature = compute_signature("merchant-secret", &order.id, "pay_1")?;
/// let outcome = checkout.verify_payment(&order.id, "pay_1", &signature).await?;
/// assert!(matches!(outcome, Verification::Granted { .. }));
/// # Ok(())
/// # }
/// ```

use super::gateway::{GatewayOrder, PaymentGateway};
use super::signature::verify_signature;
use super::{to_subunits, PaymentError, PaymentResult};
use crate::entitlement::grant_premium;
use crate::models::transaction::{CreateTransaction, TransactionStatus};
use crate::store::{BillingStore, UserStore};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Result of a successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    /// This call verified the payment and granted premium
    Granted { user_id: Uuid },

    /// The transaction was already `success`; nothing was changed
    AlreadyVerified { user_id: Uuid },
}

impl Verification {
    pub fn user_id(&self) -> Uuid {
        match self {
            Verification::Granted { user_id } | Verification::AlreadyVerified { user_id } => {
                *user_id
            }
        }
    }
}

/// Handshake bound to a store, a gateway and the merchant secret
pub struct Checkout<'a, S: ?Sized, G: ?Sized> {
    store: &'a S,
    gateway: &'a G,
    key_secret: Option<&'a str>,
    currency: &'a str,
}

impl<'a, S, G> Checkout<'a, S, G>
where
    S: UserStore + BillingStore + ?Sized,
    G: PaymentGateway + ?Sized,
{
    pub fn new(
        store: &'a S,
        gateway: &'a G,
        key_secret: Option<&'a str>,
        currency: &'a str,
    ) -> Self {
        Self {
            store,
            gateway,
            key_secret,
            currency,
        }
    }

    /// Creates a gateway order for `amount` (base currency unit) on behalf of
    /// `user_id` and records it as a pending transaction
    ///
    /// The returned order carries the amount in subunits.
    ///
    /// If the transaction cannot be recorded the gateway order is left
    /// orphaned; its ID is logged at error level for reconciliation.
    pub async fn create_order(&self, user_id: Uuid, amount: f64) -> PaymentResult<GatewayOrder> {
        let subunits = to_subunits(amount)?;
        let receipt = format!("receipt_{}", Uuid::new_v4().simple());

        let order = self
            .gateway
            .create_order(subunits, self.currency, &receipt)
            .await?;

        let recorded = self
            .store
            .create_transaction(CreateTransaction {
                user_id,
                order_id: order.id.clone(),
                amount,
                currency: order.currency.clone(),
            })
            .await;

        if let Err(e) = recorded {
            error!(
                order_id = %order.id,
                user_id = %user_id,
                error = %e,
                "Failed to record pending transaction; gateway order is orphaned"
            );
            return Err(PaymentError::Store(e));
        }

        info!(order_id = %order.id, user_id = %user_id, amount = order.amount, "Payment order created");
        Ok(order)
    }

    /// Verifies a completed payment and grants premium
    ///
    /// Re-verifying an order that is already `success` reports
    /// [`Verification::AlreadyVerified`] without side effects, as does losing
    /// the `pending → success` transition to a concurrent verifier.
    pub async fn verify_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> PaymentResult<Verification> {
        for (field, value) in [
            ("order_id", order_id),
            ("payment_id", payment_id),
            ("signature", signature),
        ] {
            if value.trim().is_empty() {
                return Err(PaymentError::MissingField(field));
            }
        }

        let secret = self
            .key_secret
            .filter(|s| !s.is_empty())
            .ok_or(PaymentError::ConfigMissing("RAZORPAY_KEY_SECRET"))?;

        if !verify_signature(secret, order_id, payment_id, signature)? {
            warn!(order_id, "Payment signature mismatch");
            return Err(PaymentError::BadSignature);
        }

        let transaction = self
            .store
            .find_transaction_by_order(order_id)
            .await?
            .ok_or_else(|| PaymentError::TransactionNotFound(order_id.to_string()))?;
        let user_id = transaction.user_id;

        if transaction.status == TransactionStatus::Success {
            info!(order_id, user_id = %user_id, "Payment already verified");
            return Ok(Verification::AlreadyVerified { user_id });
        }

        match self.store.mark_transaction_success(order_id, payment_id).await {
            Ok(true) => {}
            Ok(false) => {
                info!(order_id, user_id = %user_id, "Payment verified concurrently");
                return Ok(Verification::AlreadyVerified { user_id });
            }
            Err(e) => error!(
                order_id,
                user_id = %user_id,
                error = %e,
                "Failed to mark transaction as success; granting premium anyway"
            ),
        }

        grant_premium(self.store, user_id).await.map_err(|e| {
            error!(
                order_id,
                user_id = %user_id,
                error = %e,
                "Payment verified but premium was not granted"
            );
            PaymentError::EntitlementUpdateFailed {
                user_id,
                reason: e.to_string(),
            }
        })?;

        info!(order_id, payment_id, user_id = %user_id, "Payment verified");
        Ok(Verification::Granted { user_id })
    }
}
