//! Cart route handlers.
//!
//! Every mutation loads the visitor's cart from the session, applies one
//! operation, saves it, and redirects (POST/redirect/GET).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect},
};
use itsolutions_core::{Cart, ProductId, find_product};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::CartStore;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::flash;
use crate::models::Flash;
use crate::routes::{PageContext, local_redirect};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub cart: Cart,
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    /// Page to go back to; defaults to the cart.
    pub return_to: Option<String>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove item form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip_all)]
pub async fn show(ctx: PageContext, store: CartStore) -> impl IntoResponse {
    CartShowTemplate {
        ctx,
        cart: store.cart().clone(),
    }
}

/// Add one unit of a catalog product.
///
/// The product snapshot stored in the cart is taken from the current
/// catalog, never from the form.
#[instrument(skip(state, session, store))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    mut store: CartStore,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    match state.backend().get_products().await {
        Ok(products) => match find_product(&products, form.product_id) {
            Some(product) => {
                let name = product.name.clone();
                store.add_item(product.clone()).await?;
                tracing::debug!(product_id = %form.product_id, "Added to cart");
                let product_id = form.product_id.to_string();
                add_breadcrumb("cart", "Added product", Some(&[("product_id", product_id.as_str())]));
                flash::push(&session, Flash::success(format!("{name} added to cart"))).await;
            }
            None => {
                flash::push(
                    &session,
                    Flash::error("That product is no longer available"),
                )
                .await;
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products for add to cart");
            flash::push(&session, Flash::error(e.user_message())).await;
        }
    }

    Ok(Redirect::to(&local_redirect(form.return_to.as_deref(), "/cart")))
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(store))]
pub async fn update(mut store: CartStore, Form(form): Form<UpdateCartForm>) -> Result<Redirect> {
    store.update_quantity(form.product_id, form.quantity).await?;
    Ok(Redirect::to("/cart"))
}

/// Remove a line.
#[instrument(skip(store))]
pub async fn remove(
    mut store: CartStore,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    store.remove_item(form.product_id).await?;
    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(mut store: CartStore) -> Result<Redirect> {
    store.clear().await?;
    Ok(Redirect::to("/cart"))
}

/// Get cart count badge fragment.
#[instrument(skip_all)]
pub async fn count(store: CartStore) -> impl IntoResponse {
    CartCountTemplate {
        count: store.cart().item_count(),
    }
}
