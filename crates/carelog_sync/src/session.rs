//! Session state.

use carelog_model::Identity;
use parking_lot::RwLock;

/// Holds the current authentication state.
///
/// Constructed once by the process entry point and passed by reference
/// to whoever needs it; there is no ambient singleton. The sync engine
/// treats it as a read-only capability provider: a pass requires a
/// current identity before any network work.
#[derive(Default)]
pub struct SessionManager {
    current: RwLock<Option<Identity>>,
}

impl SessionManager {
    /// Creates a manager with no signed-in user.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager with a signed-in user.
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            current: RwLock::new(Some(identity)),
        }
    }

    /// Records a sign-in.
    pub fn sign_in(&self, identity: Identity) {
        *self.current.write() = Some(identity);
    }

    /// Clears the session.
    pub fn sign_out(&self) {
        *self.current.write() = None;
    }

    /// The current identity, if any.
    pub fn current_identity(&self) -> Option<Identity> {
        self.current.read().clone()
    }

    /// Returns true if a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }
}
