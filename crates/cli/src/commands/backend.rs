//! Backend inspection and role management.
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Base URL of the backend canister gateway
//! - `BACKEND_TIMEOUT_SECS` - Request timeout (default: 10)

use itsolutions_core::{Principal, UserRole};
use itsolutions_storefront::backend::{BackendClient, BackendError};
use itsolutions_storefront::config::{BackendConfig, CacheConfig, ConfigError};
use itsolutions_storefront::identity::Caller;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Principal must not be empty")]
    EmptyPrincipal,
}

fn client() -> Result<BackendClient, BackendCommandError> {
    dotenvy::dotenv().ok();
    let config = BackendConfig::from_env()?;
    Ok(BackendClient::new(&config, &CacheConfig::default())?)
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), BackendCommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print every store product.
///
/// # Errors
///
/// Returns an error if the backend is unreachable or misconfigured.
pub async fn products() -> Result<(), BackendCommandError> {
    let products = client()?.get_products().await?;
    print_json(products.as_slice())
}

/// Print every service.
///
/// # Errors
///
/// Returns an error if the backend is unreachable or misconfigured.
pub async fn services() -> Result<(), BackendCommandError> {
    let services = client()?.get_services().await?;
    print_json(services.as_slice())
}

/// Print the site branding.
///
/// # Errors
///
/// Returns an error if the backend is unreachable or misconfigured.
pub async fn branding() -> Result<(), BackendCommandError> {
    let branding = client()?.get_site_branding().await?;
    print_json(branding.as_ref())
}

/// Print whether Stripe is configured.
///
/// # Errors
///
/// Returns an error if the backend is unreachable or misconfigured.
#[allow(clippy::print_stdout)]
pub async fn stripe_status() -> Result<(), BackendCommandError> {
    let configured = client()?.is_stripe_configured().await?;
    println!(
        "Stripe is {}",
        if configured { "configured" } else { "not configured" }
    );
    Ok(())
}

/// Assign `role` to `user` using an admin's delegation token.
///
/// # Errors
///
/// Returns an error if a principal is empty, or the backend rejects the call.
pub async fn assign_role(
    user: &str,
    role: UserRole,
    token: String,
    principal: &str,
) -> Result<(), BackendCommandError> {
    if user.trim().is_empty() || principal.trim().is_empty() {
        return Err(BackendCommandError::EmptyPrincipal);
    }

    let caller = Caller {
        principal: Principal::new(principal.trim()),
        delegation: token,
    };
    let user = Principal::new(user.trim());

    client()?.assign_caller_user_role(&caller, &user, role).await?;
    tracing::info!(user = %user, role = %role, "Role assigned");
    Ok(())
}
