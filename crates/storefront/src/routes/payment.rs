//! Payment processor landing pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use itsolutions_core::StripeSessionStatus;
use serde::Deserialize;
use tracing::instrument;

use crate::cart::CartStore;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::PageContext;
use crate::state::AppState;

/// Payment confirmed template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/success.html")]
pub struct PaymentSuccessTemplate {
    pub ctx: PageContext,
}

/// Payment cancelled or declined template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/failure.html")]
pub struct PaymentFailureTemplate {
    pub ctx: PageContext,
    /// Processor's explanation when the session explicitly failed.
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

/// Landing page after the processor redirects back.
///
/// Only an explicit `failed` session status keeps the cart; otherwise the
/// purchase is treated as confirmed and the cart is cleared.
#[instrument(skip(state, caller, store, ctx))]
pub async fn success(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    mut store: CartStore,
    Query(query): Query<SuccessQuery>,
    mut ctx: PageContext,
) -> Result<Response> {
    if let Some(session_id) = query.session_id.as_deref().filter(|id| !id.is_empty()) {
        match state
            .backend()
            .get_stripe_session_status(caller.as_ref(), session_id)
            .await
        {
            Ok(StripeSessionStatus::Failed { error }) => {
                tracing::warn!(session_id, error = %error, "Payment session failed");
                return Ok(PaymentFailureTemplate {
                    ctx,
                    reason: Some(error),
                }
                .into_response());
            }
            Ok(StripeSessionStatus::Completed { .. }) => {
                tracing::info!(session_id, "Payment confirmed");
            }
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Payment status lookup failed");
            }
        }
    }

    store.clear().await?;
    ctx.cart_count = 0;

    Ok(PaymentSuccessTemplate { ctx }.into_response())
}

/// Landing page when the visitor cancels at the processor.
#[instrument(skip_all)]
pub async fn failure(ctx: PageContext) -> impl IntoResponse {
    PaymentFailureTemplate { ctx, reason: None }
}
