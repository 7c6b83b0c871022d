//! Service listing and detail route handlers.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use itsolutions_core::{ServiceId, ServiceItem, find_service};
use tracing::instrument;

use crate::filters;
use crate::models::Flash;
use crate::routes::PageContext;
use crate::routes::errors::{Missing, not_found_page};
use crate::state::AppState;

/// Services listing template.
#[derive(Template, WebTemplate)]
#[template(path = "services/index.html")]
pub struct ServicesIndexTemplate {
    pub ctx: PageContext,
    pub services: Arc<Vec<ServiceItem>>,
}

/// Service detail template.
#[derive(Template, WebTemplate)]
#[template(path = "services/show.html")]
pub struct ServiceShowTemplate {
    pub ctx: PageContext,
    pub service: ServiceItem,
}

async fn load_services(state: &AppState, ctx: &mut PageContext) -> Arc<Vec<ServiceItem>> {
    match state.backend().get_services().await {
        Ok(services) => services,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load services");
            ctx.flashes.push(Flash::error(e.user_message()));
            Arc::default()
        }
    }
}

/// Display all services.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, mut ctx: PageContext) -> impl IntoResponse {
    let services = load_services(&state, &mut ctx).await;

    ServicesIndexTemplate { ctx, services }
}

/// Display one service; an unknown or malformed id renders not-found.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut ctx: PageContext,
) -> Response {
    let Ok(id) = id.parse::<ServiceId>() else {
        return not_found_page(ctx, Missing::Service);
    };

    let services = load_services(&state, &mut ctx).await;
    match find_service(&services, id) {
        Some(service) => ServiceShowTemplate {
            service: service.clone(),
            ctx,
        }
        .into_response(),
        None => not_found_page(ctx, Missing::Service),
    }
}
