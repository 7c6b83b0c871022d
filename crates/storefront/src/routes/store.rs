//! Store listing and product detail route handlers.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use itsolutions_core::{Product, ProductId, find_product};
use tracing::instrument;

use crate::filters;
use crate::models::Flash;
use crate::routes::PageContext;
use crate::routes::errors::{Missing, not_found_page};
use crate::state::AppState;

/// Store listing template.
#[derive(Template, WebTemplate)]
#[template(path = "store/index.html")]
pub struct StoreIndexTemplate {
    pub ctx: PageContext,
    pub products: Arc<Vec<Product>>,
    pub banners: Vec<String>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "store/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: Product,
    pub banners: Vec<String>,
}

async fn load_products(state: &AppState, ctx: &mut PageContext) -> Arc<Vec<Product>> {
    match state.backend().get_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products");
            ctx.flashes.push(Flash::error(e.user_message()));
            Arc::default()
        }
    }
}

/// Display the product grid under the store banners.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, mut ctx: PageContext) -> impl IntoResponse {
    let products = load_products(&state, &mut ctx).await;
    let banners = ctx.branding.store_banners.clone();

    StoreIndexTemplate {
        ctx,
        products,
        banners,
    }
}

/// Display one product; an unknown or malformed id renders not-found.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut ctx: PageContext,
) -> Response {
    let Ok(id) = id.parse::<ProductId>() else {
        return not_found_page(ctx, Missing::Product);
    };

    let products = load_products(&state, &mut ctx).await;
    match find_product(&products, id) {
        Some(product) => ProductShowTemplate {
            product: product.clone(),
            banners: ctx.branding.store_banners.clone(),
            ctx,
        }
        .into_response(),
        None => not_found_page(ctx, Missing::Product),
    }
}
