//! Session-related types.
//!
//! The session is the visitor's client-local storage: it holds the signed-in
//! identity, the cart, the language preference and pending notifications.

use serde::{Deserialize, Serialize};

/// Session keys.
pub mod keys {
    /// Key for the signed-in caller identity.
    pub const CALLER: &str = "caller";

    /// Key for the sign-in CSRF state.
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Key for the page to return to after sign-in.
    pub const RETURN_TO: &str = "return_to";

    /// Key for the persisted cart.
    pub const CART: &str = "cart-storage";

    /// Key for the visitor's chosen language code.
    pub const PREFERRED_LANGUAGE: &str = "preferred-language";

    /// Key for pending flash notifications.
    pub const FLASH: &str = "flash";
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    /// CSS modifier class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A one-shot notification shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}
