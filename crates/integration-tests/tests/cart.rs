//! Cart flows through the full router.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use itsolutions_integration_tests::{TestApp, product_json};
use serde_json::json;

async fn app_with_catalog() -> TestApp {
    let app = TestApp::spawn().await;
    app.mock_products(json!([
        product_json(1, "Business Laptop", 1200),
        product_json(2, "Wireless Router", 90),
    ]))
    .await;
    app
}

#[tokio::test]
async fn test_add_then_view_cart() {
    let app = app_with_catalog().await;
    let mut visitor = app.visitor();

    let added = visitor.post("/cart/add", &[("product_id", "1")]).await;
    assert!(added.redirects_to("/cart"));

    let page = visitor.get("/cart").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Business Laptop"));
    assert!(page.body.contains("Business Laptop added to cart"));

    // Flash is shown once.
    let again = visitor.get("/cart").await;
    assert!(!again.body.contains("added to cart"));
}

#[tokio::test]
async fn test_add_returns_to_local_page_only() {
    let app = app_with_catalog().await;
    let mut visitor = app.visitor();

    let local = visitor
        .post("/cart/add", &[("product_id", "2"), ("return_to", "/store/2")])
        .await;
    assert!(local.redirects_to("/store/2"));

    let offsite = visitor
        .post(
            "/cart/add",
            &[("product_id", "2"), ("return_to", "//evil.example.com")],
        )
        .await;
    assert!(offsite.redirects_to("/cart"));
}

#[tokio::test]
async fn test_quantity_update_and_remove() {
    let app = app_with_catalog().await;
    let mut visitor = app.visitor();

    visitor.post("/cart/add", &[("product_id", "1")]).await;
    visitor.post("/cart/add", &[("product_id", "2")]).await;
    visitor
        .post("/cart/update", &[("product_id", "2"), ("quantity", "3")])
        .await;

    let count = visitor.get("/cart/count").await;
    assert!(count.body.contains(">4<"), "badge was {:?}", count.body);

    visitor.post("/cart/remove", &[("product_id", "1")]).await;
    let page = visitor.get("/cart").await;
    assert!(!page.body.contains("Business Laptop"));
    assert!(page.body.contains("Wireless Router"));

    visitor.post("/cart/clear", &[]).await;
    let count = visitor.get("/cart/count").await;
    assert!(!count.body.contains("cart-count"));
}

#[tokio::test]
async fn test_unknown_product_is_not_added() {
    let app = app_with_catalog().await;
    let mut visitor = app.visitor();

    let added = visitor.post("/cart/add", &[("product_id", "99")]).await;
    assert!(added.redirects_to("/cart"));

    let page = visitor.get("/cart").await;
    assert!(page.body.contains("That product is no longer available"));
    let count = visitor.get("/cart/count").await;
    assert!(!count.body.contains("cart-count"));
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let app = app_with_catalog().await;
    let mut alice = app.visitor();
    let mut bob = app.visitor();

    alice.post("/cart/add", &[("product_id", "1")]).await;

    assert!(alice.get("/cart/count").await.body.contains(">1<"));
    assert!(!bob.get("/cart/count").await.body.contains("cart-count"));
}

#[tokio::test]
async fn test_overlapping_adds_both_count() {
    let app = app_with_catalog().await;
    let mut visitor = app.visitor();
    // Establish the session first so both tabs share it.
    visitor.post("/cart/add", &[("product_id", "2")]).await;

    let mut first_tab = visitor.fork();
    let mut second_tab = visitor.fork();
    tokio::join!(
        first_tab.post("/cart/add", &[("product_id", "1")]),
        second_tab.post("/cart/add", &[("product_id", "1")]),
    );

    let count = visitor.get("/cart/count").await;
    assert!(count.body.contains(">3<"), "badge was {:?}", count.body);
}
