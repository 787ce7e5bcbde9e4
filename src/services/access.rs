//! Ownership checks for mutating operations.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("user {actor_id} does not own resource owned by {owner_id}")]
pub struct AccessDenied {
    pub actor_id: i64,
    pub owner_id: i64,
}

/// Allow the action only when the acting principal is the recorded owner.
///
/// # Errors
///
/// Returns [`AccessDenied`] when the identifiers differ.
pub fn ensure_owner(actor_id: i64, owner_id: i64) -> Result<(), AccessDenied> {
    if actor_id == owner_id {
        Ok(())
    } else {
        Err(AccessDenied { actor_id, owner_id })
    }
}

#[cfg(test)]
#[path = "access_test.rs"]
mod tests;
