//! Checkout route handlers.
//!
//! Placing an order is two backend calls: `createOrder` with the cart's
//! products and rounded total, then `createCheckoutSession` with one line per
//! cart item. The visitor is then sent to the payment processor.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use itsolutions_core::{Cart, CheckoutSession};
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::BackendError;
use crate::cart::CartStore;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::flash;
use crate::identity::Caller;
use crate::middleware::RequireAuth;
use crate::models::Flash;
use crate::routes::PageContext;
use crate::state::AppState;

/// Placeholder the payment processor replaces with the session id.
const SUCCESS_PATH: &str = "/payment-success?session_id={CHECKOUT_SESSION_ID}";
const CANCEL_PATH: &str = "/payment-failure";

/// Checkout summary template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub cart: Cart,
}

/// Display the order summary.
#[instrument(skip_all)]
pub async fn show(
    RequireAuth(_caller): RequireAuth,
    ctx: PageContext,
    store: CartStore,
) -> impl IntoResponse {
    CheckoutTemplate {
        ctx,
        cart: store.cart().clone(),
    }
}

/// Create the order and payment session, then redirect to the processor.
///
/// Failures are shown as a notification on the summary page; nothing is
/// retried and the cart is kept.
#[instrument(skip_all, fields(principal = %caller.principal))]
pub async fn start(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    store: CartStore,
) -> Redirect {
    if store.cart().is_empty() {
        flash::push(&session, Flash::error("Your cart is empty")).await;
        return Redirect::to("/cart");
    }

    match place_order(&state, &caller, store.cart()).await {
        Ok(checkout) => {
            tracing::info!(session_id = %checkout.id, "Redirecting to payment processor");
            add_breadcrumb("checkout", "Payment session created", None);
            Redirect::to(&checkout.url)
        }
        Err(e) => {
            tracing::error!(error = %e, "Checkout failed");
            flash::push(&session, Flash::error(e.user_message())).await;
            Redirect::to("/checkout")
        }
    }
}

async fn place_order(
    state: &AppState,
    caller: &Caller,
    cart: &Cart,
) -> Result<CheckoutSession, BackendError> {
    let backend = state.backend();
    let config = state.config();

    let order_id = backend
        .create_order(caller, &cart.ordered_products(), cart.order_total())
        .await?;
    tracing::info!(order_id = %order_id, total = cart.order_total(), "Order created");

    let items = cart.shopping_items(&config.checkout_currency);
    backend
        .create_checkout_session(
            caller,
            &items,
            &config.absolute_url(SUCCESS_PATH),
            &config.absolute_url(CANCEL_PATH),
        )
        .await
}
