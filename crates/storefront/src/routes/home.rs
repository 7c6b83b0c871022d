//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::filters;
use crate::routes::PageContext;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    /// Carousel slides from the branding's homepage slider images.
    pub slides: Vec<String>,
    /// Hero background used when there are no slides.
    pub hero_banner: Option<String>,
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(ctx: PageContext) -> impl IntoResponse {
    let slides = ctx.branding.homepage_slider_images.clone();
    let hero_banner = ctx.branding.hero_fallback_banner().map(str::to_string);

    HomeTemplate {
        ctx,
        slides,
        hero_banner,
    }
}
