//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check
//!
//! # Catalog
//! GET  /services               - Service listing
//! GET  /services/{id}          - Service detail
//! GET  /store                  - Product listing
//! GET  /store/{id}             - Product detail
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add one unit
//! POST /cart/update            - Set quantity (<= 0 removes)
//! POST /cart/remove            - Remove line
//! POST /cart/clear             - Empty cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout (requires sign-in)
//! GET  /checkout               - Order summary
//! POST /checkout               - Create order + payment session, redirect
//! GET  /payment-success        - Processor return, clears cart
//! GET  /payment-failure        - Processor cancel
//!
//! # Account (requires sign-in)
//! GET  /account                - Profile and order history
//! POST /account/profile        - Save display name
//!
//! # Admin (requires admin)
//! GET  /admin                  - Dashboard
//! POST /admin/{services,products,branding,payments}
//!
//! # Auth
//! GET  /auth/login             - Redirect to identity provider
//! GET  /auth/callback          - Provider callback
//! POST /auth/logout            - Sign out
//!
//! POST /language               - Change language preference
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
mod context;
pub mod errors;
pub mod home;
pub mod language;
pub mod payment;
pub mod services;
pub mod store;

pub use context::PageContext;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the service routes router.
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(services::index))
        .route("/{id}", get(services::show))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(store::index))
        .route("/{id}", get(store::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::show))
        .route(
            "/checkout",
            post(checkout::start).layer(checkout_rate_limiter()),
        )
        .route("/payment-success", get(payment::success))
        .route("/payment-failure", get(payment::failure))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::save_profile))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/services", post(admin::create_service))
        .route("/products", post(admin::create_product))
        .route("/branding", post(admin::update_branding))
        .route("/payments", post(admin::update_payments))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/services", service_routes())
        .nest("/store", store_routes())
        .nest("/cart", cart_routes())
        .merge(checkout_routes())
        .nest("/account", account_routes())
        .nest("/admin", admin_routes())
        .nest("/auth", auth_routes())
        .route("/language", post(language::change))
        .fallback(errors::fallback)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// With a session database configured, verifies it is reachable; returns
/// 503 Service Unavailable otherwise.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// A same-site path that is safe to redirect to.
///
/// Only absolute paths are accepted; scheme-relative (`//host`) and
/// backslash tricks are rejected.
#[must_use]
pub fn safe_local_path(candidate: &str) -> Option<&str> {
    let path = candidate.trim();
    let ok = path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.contains(['\r', '\n']);
    ok.then_some(path)
}

/// Redirect target: `candidate` if it is a safe local path, else `default`.
#[must_use]
pub fn local_redirect(candidate: Option<&str>, default: &str) -> String {
    candidate
        .and_then(safe_local_path)
        .unwrap_or(default)
        .to_string()
}
