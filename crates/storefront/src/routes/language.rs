//! Language preference handler.

use axum::{
    extract::{Form, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::flash;
use crate::models::{Flash, session_keys};
use crate::routes::local_redirect;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LanguageForm {
    pub code: String,
    pub return_to: Option<String>,
}

/// Save the visitor's language choice if the branding offers it.
#[instrument(skip(state, session))]
pub async fn change(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LanguageForm>,
) -> Result<Redirect> {
    match state.backend().get_site_branding().await {
        Ok(branding) if branding.language_config.is_available(&form.code) => {
            session
                .insert(session_keys::PREFERRED_LANGUAGE, &form.code)
                .await?;
        }
        Ok(_) => {
            flash::push(&session, Flash::error("That language is not available")).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load branding for language change");
            flash::push(&session, Flash::error(e.user_message())).await;
        }
    }

    Ok(Redirect::to(&local_redirect(form.return_to.as_deref(), "/")))
}
