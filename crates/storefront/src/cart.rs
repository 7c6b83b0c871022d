//! Session-backed cart store.
//!
//! [`CartStore`] loads the visitor's [`Cart`] from the session, applies one
//! operation, and writes the result back under `cart-storage` before the
//! handler responds.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use itsolutions_core::{Cart, Product, ProductId};
use thiserror::Error;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;

/// Errors reading or writing the stored cart.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Session layer missing")]
    NoSession,
}

/// The visitor's cart, bound to their session.
pub struct CartStore {
    session: Session,
    cart: Cart,
}

impl CartStore {
    /// Restore the cart from the session, starting empty if none is stored.
    ///
    /// A stored cart that no longer decodes is discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(session: Session) -> Result<Self, CartError> {
        let cart = match session.get::<Cart>(session_keys::CART).await {
            Ok(cart) => cart.unwrap_or_default(),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable stored cart");
                Cart::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { session, cart })
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    async fn persist(&self) -> Result<(), CartError> {
        self.session.insert(session_keys::CART, &self.cart).await?;
        Ok(())
    }

    /// Add one unit of `product` and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub async fn add_item(&mut self, product: Product) -> Result<(), CartError> {
        self.cart.add_item(product);
        self.persist().await
    }

    /// Remove the line for `id` and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub async fn remove_item(&mut self, id: ProductId) -> Result<(), CartError> {
        self.cart.remove_item(id);
        self.persist().await
    }

    /// Set the quantity for `id` (zero or less removes it) and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub async fn update_quantity(&mut self, id: ProductId, quantity: i64) -> Result<(), CartError> {
        self.cart.update_quantity(id, quantity);
        self.persist().await
    }

    /// Empty the cart and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        self.cart.clear();
        self.persist().await
    }
}

impl<S> FromRequestParts<S> for CartStore
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(CartError::NoSession)?;
        Ok(Self::load(session).await?)
    }
}
