//! Domain types shared by the storefront and the CLI.
//!
//! These mirror the backend's wire entities (camelCase JSON).

pub mod branding;
pub mod catalog;
pub mod id;
pub mod order;
pub mod payment;
pub mod price;
pub mod user;

pub use branding::{
    BrandingError, Language, LanguageConfig, LanguageSelection, SiteBranding, SocialLinks,
    format_language_lines, parse_language_lines, parse_url_list,
};
pub use catalog::{Product, ServiceItem, find_product, find_service};
pub use id::*;
pub use order::{ORDER_STATUS_COMPLETED, OrderItem};
pub use payment::{
    CheckoutSession, CheckoutSessionError, DEFAULT_ALLOWED_COUNTRIES, ShoppingItem,
    StripeConfiguration, StripeSessionStatus, parse_country_list,
};
pub use price::{Price, format_amount};
pub use user::{Principal, UserProfile, UserRole};
