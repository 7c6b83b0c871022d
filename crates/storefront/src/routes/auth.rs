//! Sign-in route handlers.
//!
//! Handles the identity provider's authorization-code flow:
//! - Login: stores a CSRF state and redirects to the provider
//! - Callback: validates the state and exchanges the code for the caller
//! - Logout: forgets the caller and their cached data

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::QueryKey;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::flash;
use crate::identity::generate_state;
use crate::middleware::{OptionalAuth, clear_caller, set_caller};
use crate::models::{Flash, session_keys};
use crate::routes::{local_redirect, safe_local_path};
use crate::state::AppState;

const CALLBACK_PATH: &str = "/auth/callback";
const SIGN_IN_FAILED: &str = "Sign-in failed, please try again";

/// Query parameters for `/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Local page to return to after sign-in.
    pub return_to: Option<String>,
}

/// Query parameters from the provider's callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Start sign-in.
///
/// # Route
///
/// `GET /auth/login`
#[instrument(skip(state, session))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> Response {
    let oauth_state = generate_state();

    if let Err(e) = session.insert(session_keys::OAUTH_STATE, &oauth_state).await {
        tracing::error!(error = %e, "Failed to store sign-in state");
        flash::push(&session, Flash::error(SIGN_IN_FAILED)).await;
        return Redirect::to("/").into_response();
    }

    if let Some(path) = query.return_to.as_deref().and_then(safe_local_path)
        && let Err(e) = session.insert(session_keys::RETURN_TO, path).await
    {
        tracing::warn!(error = %e, "Failed to store return path");
    }

    let redirect_uri = state.config().absolute_url(CALLBACK_PATH);
    let auth_url = state
        .identity()
        .authorization_url(&redirect_uri, &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Finish sign-in.
///
/// # Route
///
/// `GET /auth/callback`
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    // One-time use, whatever the outcome
    let stored_state: Option<String> = session
        .remove(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!(%error, %description, "Identity provider returned an error");
        return fail(&session).await;
    }

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        tracing::warn!("Sign-in callback missing code or state");
        return fail(&session).await;
    };

    if stored_state.as_deref() != Some(returned_state.as_str()) {
        tracing::warn!("Sign-in state mismatch");
        return fail(&session).await;
    }

    let redirect_uri = state.config().absolute_url(CALLBACK_PATH);
    let caller = match state.identity().exchange_code(&code, &redirect_uri).await {
        Ok(caller) => caller,
        Err(e) => {
            tracing::error!(error = %e, "Failed to exchange authorization code");
            return fail(&session).await;
        }
    };

    if let Err(e) = set_caller(&session, &caller).await {
        tracing::error!(error = %e, "Failed to store caller in session");
        return fail(&session).await;
    }

    set_sentry_user(&caller.principal);
    tracing::info!(principal = %caller.principal, "Caller signed in");

    let return_to: Option<String> = session
        .remove(session_keys::RETURN_TO)
        .await
        .ok()
        .flatten();

    Redirect::to(&local_redirect(return_to.as_deref(), "/account")).into_response()
}

async fn fail(session: &Session) -> Response {
    flash::push(session, Flash::error(SIGN_IN_FAILED)).await;
    Redirect::to("/").into_response()
}

/// Sign out.
///
/// # Route
///
/// `POST /auth/logout`
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    session: Session,
) -> Response {
    if let Some(caller) = caller {
        state
            .backend()
            .cache()
            .invalidate(&QueryKey::caller_scoped(&caller.principal))
            .await;
        tracing::info!(principal = %caller.principal, "Caller signed out");
    }

    if let Err(e) = clear_caller(&session).await {
        tracing::error!(error = %e, "Failed to clear caller from session");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}
