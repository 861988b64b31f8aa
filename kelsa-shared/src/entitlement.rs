/// Premium entitlement and the list quota
///
/// Free accounts may keep [`FREE_LIST_LIMIT`] lists per board; premium
/// accounts are unlimited. The flag lives in `users.is_premium` and is read
/// from the store on every check. Tokens never carry it.
///
/// # Example
///
/// ```
/// use kelsa_shared::entitlement::{check_list_quota, EntitlementError, FREE_LIST_LIMIT};
///
/// assert!(check_list_quota(false, 2).is_ok());
/// assert!(matches!(
///     check_list_quota(false, FREE_LIST_LIMIT),
///     Err(EntitlementError::LimitExceeded { limit: 3, current: 3 })
/// ));
/// assert!(check_list_quota(true, 50).is_ok());
/// ```

use crate::store::{StoreError, UserStore};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Lists per board for accounts without premium
pub const FREE_LIST_LIMIT: usize = 3;

/// Entitlement error
#[derive(Debug, thiserror::Error)]
pub enum EntitlementError {
    #[error("List limit reached ({current}/{limit}); upgrade to premium for unlimited lists")]
    LimitExceeded { limit: usize, current: usize },

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Quota headroom for one board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListQuota {
    pub current: usize,

    /// `None` for premium accounts
    pub limit: Option<usize>,
}

impl ListQuota {
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.current))
    }
}

/// Quota for a board holding `current` lists
pub fn list_quota(premium: bool, current: usize) -> ListQuota {
    ListQuota {
        current,
        limit: (!premium).then_some(FREE_LIST_LIMIT),
    }
}

/// Checks whether one more list may be added to a board holding `current`
pub fn check_list_quota(premium: bool, current: usize) -> Result<ListQuota, EntitlementError> {
    let quota = list_quota(premium, current);

    match quota.limit {
        Some(limit) if current >= limit => Err(EntitlementError::LimitExceeded { limit, current }),
        _ => Ok(quota),
    }
}

/// Reads the authoritative premium flag
pub async fn is_premium<S>(store: &S, user_id: Uuid) -> Result<bool, EntitlementError>
where
    S: UserStore + ?Sized,
{
    store
        .find_user(user_id)
        .await?
        .map(|user| user.is_premium)
        .ok_or(EntitlementError::UserNotFound(user_id))
}

/// Sets the premium flag after a verified payment
pub async fn grant_premium<S>(store: &S, user_id: Uuid) -> Result<(), EntitlementError>
where
    S: UserStore + ?Sized,
{
    set(store, user_id, true).await?;
    info!(user_id = %user_id, "Premium entitlement granted");
    Ok(())
}

/// Clears the premium flag (administrative downgrade)
pub async fn downgrade<S>(store: &S, user_id: Uuid) -> Result<(), EntitlementError>
where
    S: UserStore + ?Sized,
{
    set(store, user_id, false).await?;
    info!(user_id = %user_id, "Premium entitlement revoked");
    Ok(())
}

async fn set<S>(store: &S, user_id: Uuid, premium: bool) -> Result<(), EntitlementError>
where
    S: UserStore + ?Sized,
{
    if store.set_premium(user_id, premium).await? {
        Ok(())
    } else {
        Err(EntitlementError::UserNotFound(user_id))
    }
}
