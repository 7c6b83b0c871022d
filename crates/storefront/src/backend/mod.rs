//! Remote backend access.
//!
//! # Architecture
//!
//! - Every backend operation is `POST {BACKEND_URL}/rpc/{method}` with a JSON
//!   array of positional arguments; the response body is the JSON result
//! - Reads are cached in memory via `moka` (see [`cache`]); writes invalidate
//!   the affected entries after they succeed
//! - Calls made on behalf of a signed-in visitor carry their delegation as a
//!   bearer token
//! - No retries: a failed call is reported to the visitor
//!
//! # Example
//!
//! ```rust,ignore
//! use itsolutions_storefront::backend::BackendClient;
//!
//! let backend = BackendClient::new(&config.backend, &config.cache)?;
//! let products = backend.get_products().await?;
//! let orders = backend.get_caller_orders(&caller).await?;
//! ```

pub mod cache;
mod client;

pub use cache::{QueryCache, QueryKey, QueryValue};
pub use client::BackendClient;

use itsolutions_core::CheckoutSessionError;
use thiserror::Error;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("{method} rejected ({status}): {message}")]
    Rejected {
        method: &'static str,
        status: u16,
        message: String,
    },

    /// The payment processor session could not be used.
    #[error("Checkout session error: {0}")]
    CheckoutSession(#[from] CheckoutSessionError),
}

impl BackendError {
    /// Message suitable for showing to the visitor.
    ///
    /// Rejections carry the backend's own explanation (e.g. "Unauthorized:
    /// Only admins can add products"); transport failures are summarized.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::CheckoutSession(err) => err.to_string(),
            Self::Http(err) if err.is_timeout() => {
                "The service took too long to respond. Please try again.".to_string()
            }
            Self::Http(_) | Self::Parse(_) => {
                "The service is unavailable right now. Please try again.".to_string()
            }
        }
    }

    /// Whether the backend refused the caller's permissions.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }
}
