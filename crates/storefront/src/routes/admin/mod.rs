//! Admin dashboard route handlers (require an admin caller).
//!
//! ```text
//! GET  /admin?tab=services|products|branding|payments|orders
//! POST /admin/services   - createService
//! POST /admin/products   - createProduct
//! POST /admin/branding   - updateBranding
//! POST /admin/payments   - setStripeConfiguration
//! ```
//!
//! Each POST validates its form first; an invalid form is reported as a
//! notification and never reaches the backend.

pub mod forms;

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use itsolutions_core::{DEFAULT_ALLOWED_COUNTRIES, OrderItem, Product, ServiceItem};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

pub use forms::{BrandingForm, CatalogFormError, PaymentsForm, ProductForm, ServiceForm};

use crate::backend::BackendError;
use crate::error::AppError;
use crate::filters;
use crate::flash;
use crate::identity::Caller;
use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::routes::PageContext;
use crate::state::AppState;

/// Dashboard tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminTab {
    #[default]
    Services,
    Products,
    Branding,
    Payments,
    Orders,
}

impl AdminTab {
    pub const ALL: [Self; 5] = [
        Self::Services,
        Self::Products,
        Self::Branding,
        Self::Payments,
        Self::Orders,
    ];

    /// Parse the `tab` query value; anything unknown shows services.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("products") => Self::Products,
            Some("branding") => Self::Branding,
            Some("payments") => Self::Payments,
            Some("orders") => Self::Orders,
            _ => Self::Services,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Products => "products",
            Self::Branding => "branding",
            Self::Payments => "payments",
            Self::Orders => "orders",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Services => "Services",
            Self::Products => "Products",
            Self::Branding => "Branding",
            Self::Payments => "Payments",
            Self::Orders => "Orders",
        }
    }

    fn redirect(self) -> Redirect {
        Redirect::to(&format!("/admin?tab={}", self.slug()))
    }
}

/// Data for whichever tab is open.
pub enum TabData {
    Services(Arc<Vec<ServiceItem>>),
    Products(Arc<Vec<Product>>),
    Branding(BrandingForm),
    /// Whether payments are configured.
    Payments(bool),
    Orders(Arc<Vec<OrderItem>>),
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub tab: AdminTab,
    pub tabs: [AdminTab; 5],
    pub data: TabData,
    pub default_countries: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
}

async fn load_tab(
    state: &AppState,
    caller: &Caller,
    tab: AdminTab,
) -> Result<TabData, BackendError> {
    let backend = state.backend();
    Ok(match tab {
        AdminTab::Services => TabData::Services(backend.get_services().await?),
        AdminTab::Products => TabData::Products(backend.get_products().await?),
        // Not the layout's branding: that one falls back to defaults on failure.
        AdminTab::Branding => {
            TabData::Branding(BrandingForm::from_branding(&*backend.get_site_branding().await?))
        }
        AdminTab::Payments => TabData::Payments(backend.is_stripe_configured().await?),
        AdminTab::Orders => TabData::Orders(backend.get_all_orders(caller).await?),
    })
}

/// Display the dashboard.
#[instrument(skip(state, caller, ctx))]
pub async fn dashboard(
    RequireAdmin(caller): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
    mut ctx: PageContext,
) -> Result<Response, AppError> {
    let tab = AdminTab::from_query(query.tab.as_deref());

    let data = match load_tab(&state, &caller, tab).await {
        Ok(data) => data,
        // The backend overrules a stale admin check.
        Err(e) if e.is_forbidden() => return Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, tab = tab.slug(), "Failed to load admin tab");
            ctx.flashes.push(Flash::error(e.user_message()));
            match tab {
                AdminTab::Services => TabData::Services(Arc::default()),
                AdminTab::Products => TabData::Products(Arc::default()),
                AdminTab::Branding => TabData::Branding(BrandingForm::default()),
                AdminTab::Payments => TabData::Payments(false),
                AdminTab::Orders => TabData::Orders(Arc::default()),
            }
        }
    };

    Ok(DashboardTemplate {
        ctx,
        tab,
        tabs: AdminTab::ALL,
        data,
        default_countries: DEFAULT_ALLOWED_COUNTRIES,
    }
    .into_response())
}

/// Create a service.
#[instrument(skip_all, fields(principal = %caller.principal))]
pub async fn create_service(
    RequireAdmin(caller): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ServiceForm>,
) -> Redirect {
    let notice = match form.into_service() {
        Err(e) => Flash::error(e.to_string()),
        Ok(service) => match state.backend().create_service(&caller, &service).await {
            Ok(id) => {
                tracing::info!(service_id = %id, "Service created");
                Flash::success("Service created successfully")
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create service");
                Flash::error("Failed to create service")
            }
        },
    };
    flash::push(&session, notice).await;

    AdminTab::Services.redirect()
}

/// Create a product.
#[instrument(skip_all, fields(principal = %caller.principal))]
pub async fn create_product(
    RequireAdmin(caller): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Redirect {
    let notice = match form.into_product() {
        Err(e) => Flash::error(e.to_string()),
        Ok(product) => match state.backend().create_product(&caller, &product).await {
            Ok(id) => {
                tracing::info!(product_id = %id, "Product created");
                Flash::success("Product created successfully")
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create product");
                Flash::error("Failed to create product")
            }
        },
    };
    flash::push(&session, notice).await;

    AdminTab::Products.redirect()
}

/// Replace the site branding.
#[instrument(skip_all, fields(principal = %caller.principal))]
pub async fn update_branding(
    RequireAdmin(caller): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<BrandingForm>,
) -> Redirect {
    let notice = match form.into_branding() {
        Err(e) => Flash::error(e.to_string()),
        Ok(branding) => match state.backend().update_branding(&caller, &branding).await {
            Ok(()) => Flash::success("Branding updated successfully"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to update branding");
                Flash::error("Failed to update branding")
            }
        },
    };
    flash::push(&session, notice).await;

    AdminTab::Branding.redirect()
}

/// Save the payment processor credentials.
#[instrument(skip_all, fields(principal = %caller.principal))]
pub async fn update_payments(
    RequireAdmin(caller): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PaymentsForm>,
) -> Redirect {
    let notice = match form.into_configuration() {
        Err(e) => Flash::error(e.to_string()),
        Ok(config) => match state
            .backend()
            .set_stripe_configuration(&caller, &config)
            .await
        {
            Ok(()) => Flash::success("Stripe configuration saved successfully"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to save payment configuration");
                Flash::error("Failed to save Stripe configuration")
            }
        },
    };
    flash::push(&session, notice).await;

    AdminTab::Payments.redirect()
}
