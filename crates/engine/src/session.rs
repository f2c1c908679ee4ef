//! Guest vs authenticated session marker.
//!
//! A fresh session is a guest with a random id; the backend mirrors the
//! guest's cart under that id until login folds it into the real user's
//! cart.

use uuid::Uuid;

use tokri_core::UserId;

/// Who owns the cart right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Unauthenticated session under a temporary guest id.
    Guest { guest_id: Uuid },
    /// Logged-in session; the server-held cart is authoritative.
    Authenticated { user_id: UserId },
}

impl SessionMode {
    /// Start a fresh guest session.
    #[must_use]
    pub fn new_guest() -> Self {
        Self::Guest {
            guest_id: Uuid::new_v4(),
        }
    }

    /// Whether this is a guest session.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest { .. })
    }

    /// The authenticated user id, when there is one.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Guest { .. } => None,
            Self::Authenticated { user_id } => Some(user_id),
        }
    }

    /// The id the backend keys this session's cart under: the user id,
    /// or the temporary guest id.
    #[must_use]
    pub fn cart_owner(&self) -> UserId {
        match self {
            Self::Guest { guest_id } => UserId::new(guest_id.to_string()),
            Self::Authenticated { user_id } => user_id.clone(),
        }
    }
}
