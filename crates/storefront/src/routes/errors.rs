//! Not-found, sign-in-required and access-denied pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::filters;
use crate::routes::PageContext;

/// What the visitor asked for that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Page,
    Service,
    Product,
}

impl Missing {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Page => "Page Not Found",
            Self::Service => "Service Not Found",
            Self::Product => "Product Not Found",
        }
    }

    #[must_use]
    pub const fn back_href(self) -> &'static str {
        match self {
            Self::Page => "/",
            Self::Service => "/services",
            Self::Product => "/store",
        }
    }

    #[must_use]
    pub const fn back_label(self) -> &'static str {
        match self {
            Self::Page => "Return Home",
            Self::Service => "Back to Services",
            Self::Product => "Back to Store",
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "errors/not_found.html")]
pub struct NotFoundTemplate {
    pub ctx: PageContext,
    pub missing: Missing,
}

#[derive(Template, WebTemplate)]
#[template(path = "errors/sign_in.html")]
pub struct SignInTemplate {
    pub ctx: PageContext,
}

#[derive(Template, WebTemplate)]
#[template(path = "errors/access_denied.html")]
pub struct AccessDeniedTemplate {
    pub ctx: PageContext,
}

/// Render the not-found state with a 404 status.
pub fn not_found_page(ctx: PageContext, missing: Missing) -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate { ctx, missing }).into_response()
}

/// Render the "please sign in" notice with a 401 status.
pub fn sign_in_page(ctx: PageContext) -> Response {
    (StatusCode::UNAUTHORIZED, SignInTemplate { ctx }).into_response()
}

/// Render the admin access-denied notice with a 403 status.
pub fn access_denied_page(ctx: PageContext) -> Response {
    (StatusCode::FORBIDDEN, AccessDeniedTemplate { ctx }).into_response()
}

/// Router fallback for unknown paths.
pub async fn fallback(ctx: PageContext) -> Response {
    not_found_page(ctx, Missing::Page)
}
