//! Authenticated identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity of the signed-in user.
///
/// Owned by the session manager; the engines hold read-only references
/// through it and never mutate identity state themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Id of the user record this identity belongs to.
    pub user_id: Uuid,
    /// Login name, for display and log context.
    pub username: String,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}
