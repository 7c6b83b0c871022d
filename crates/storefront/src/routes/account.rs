//! Account route handlers (require sign-in).

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect},
};
use itsolutions_core::{OrderItem, UserProfile};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::flash;
use crate::middleware::RequireAuth;
use crate::models::Flash;
use crate::routes::{PageContext, local_redirect};
use crate::state::AppState;

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub ctx: PageContext,
    pub orders: Arc<Vec<OrderItem>>,
}

/// First-visit profile form.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub return_to: Option<String>,
}

/// Display the caller's profile and order history.
#[instrument(skip_all, fields(principal = %caller.principal))]
pub async fn index(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    mut ctx: PageContext,
) -> impl IntoResponse {
    let orders = match state.backend().get_caller_orders(&caller).await {
        Ok(orders) => orders,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load orders");
            ctx.flashes.push(Flash::error(e.user_message()));
            Arc::default()
        }
    };

    AccountTemplate { ctx, orders }
}

/// Save the caller's display name.
#[instrument(skip_all, fields(principal = %caller.principal))]
pub async fn save_profile(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let name = form.name.trim();
    let notice = if name.is_empty() {
        Flash::error("Please enter your name")
    } else {
        let profile = UserProfile {
            name: name.to_string(),
        };
        match state.backend().save_caller_user_profile(&caller, &profile).await {
            Ok(()) => Flash::success("Profile created successfully!"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to save profile");
                Flash::error("Failed to create profile")
            }
        }
    };
    flash::push(&session, notice).await;

    Redirect::to(&local_redirect(form.return_to.as_deref(), "/account"))
}
