//! Catalog entities: store products and offered services.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, ServiceId};
use super::price::Price;

/// A physical product sold in the store.
///
/// Cart lines keep a full snapshot of the product as it was when added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A service offering (website development, hosting, repairs, ...).
///
/// Services are not sold through the cart; `pricing` is informational and
/// may be absent for quote-based work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub id: ServiceId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Find a product by ID in a fetched list.
#[must_use]
pub fn find_product(products: &[Product], id: ProductId) -> Option<&Product> {
    products.iter().find(|p| p.id == id)
}

/// Find a service by ID in a fetched list.
#[must_use]
pub fn find_service(services: &[ServiceItem], id: ServiceId) -> Option<&ServiceItem> {
    services.iter().find(|s| s.id == id)
}
