//! Authentication extractors.
//!
//! - [`OptionalAuth`]: the signed-in caller, if any
//! - [`RequireAuth`]: renders the sign-in-required page when signed out
//! - [`RequireAdmin`]: additionally renders access-denied unless the backend
//!   confirms the caller is an admin

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::identity::Caller;
use crate::models::session_keys;
use crate::routes::PageContext;
use crate::routes::errors::{access_denied_page, sign_in_page};
use crate::state::AppState;

/// Rejection rendered when a page needs more than the visitor has.
pub enum AuthRejection {
    /// Not signed in.
    SignInRequired(Box<PageContext>),
    /// Signed in, but not an admin.
    AccessDenied(Box<PageContext>),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::SignInRequired(ctx) => sign_in_page(*ctx),
            Self::AccessDenied(ctx) => access_denied_page(*ctx),
        }
    }
}

async fn session_caller(parts: &Parts) -> Option<Caller> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<Caller>(session_keys::CALLER)
        .await
        .ok()
        .flatten()
}

/// Extractor that optionally gets the signed-in caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(caller): OptionalAuth) -> impl IntoResponse {
///     match caller {
///         Some(c) => format!("Hello, {}!", c.principal),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<Caller>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_caller(parts).await))
    }
}

/// Extractor that requires a signed-in caller.
pub struct RequireAuth(pub Caller);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session_caller(parts).await {
            Some(caller) => Ok(Self(caller)),
            None => Err(AuthRejection::SignInRequired(Box::new(
                PageContext::load(parts, state).await,
            ))),
        }
    }
}

/// Extractor that requires a signed-in admin.
///
/// The role check is always the backend's `isCallerAdmin`; a failed check
/// denies access.
pub struct RequireAdmin(pub Caller);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(caller) = RequireAuth::from_request_parts(parts, state).await?;

        let is_admin = state
            .backend()
            .is_caller_admin(&caller)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, principal = %caller.principal, "Admin check failed");
                false
            });

        if is_admin {
            Ok(Self(caller))
        } else {
            tracing::info!(principal = %caller.principal, path = %parts.uri.path(), "Admin access denied");
            Err(AuthRejection::AccessDenied(Box::new(
                PageContext::load(parts, state).await,
            )))
        }
    }
}

/// Store the signed-in caller in the session.
///
/// The session ID is cycled first so a pre-sign-in ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_caller(
    session: &Session,
    caller: &Caller,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CALLER, caller).await
}

/// Remove the signed-in caller from the session (sign out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_caller(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Caller>(session_keys::CALLER).await?;
    Ok(())
}
