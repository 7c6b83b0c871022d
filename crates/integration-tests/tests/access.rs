//! Sign-in, admin gating and error pages.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use itsolutions_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;
    let mut visitor = app.visitor();

    let health = visitor.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);

    // No session database configured.
    let ready = visitor.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_paths_are_not_found() {
    let app = TestApp::spawn().await;
    app.mock_rpc("getServices", json!([])).await;
    app.mock_products(json!([])).await;
    let mut visitor = app.visitor();

    let page = visitor.get("/no-such-page").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("Page Not Found"));

    let service = visitor.get("/services/404").await;
    assert_eq!(service.status, StatusCode::NOT_FOUND);
    assert!(service.body.contains("Back to Services"));

    let product = visitor.get("/store/not-a-number").await;
    assert_eq!(product.status, StatusCode::NOT_FOUND);
    assert!(product.body.contains("Back to Store"));
}

#[tokio::test]
async fn test_account_requires_sign_in() {
    let app = TestApp::spawn().await;
    let page = app.visitor().get("/account").await;

    assert_eq!(page.status, StatusCode::UNAUTHORIZED);
    assert!(page.body.contains("/auth/login?return_to="));
}

#[tokio::test]
async fn test_sign_in_returns_to_requested_page() {
    let app = TestApp::spawn().await;
    app.mock_identity("2vxsx-fae").await;
    app.mock_rpc("getCallerOrders", json!([])).await;
    let mut visitor = app.visitor();

    let login = visitor.get("/auth/login?return_to=%2Faccount").await;
    let location = url::Url::parse(login.location.as_deref().unwrap()).unwrap();
    let state = location
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let callback = visitor
        .get(&format!("/auth/callback?code=abc&state={state}"))
        .await;
    assert!(callback.redirects_to("/account"));

    let account = visitor.get("/account").await;
    assert_eq!(account.status, StatusCode::OK);
}

#[tokio::test]
async fn test_callback_with_wrong_state_does_not_sign_in() {
    let app = TestApp::spawn().await;
    app.mock_identity("2vxsx-fae").await;
    let mut visitor = app.visitor();

    visitor.get("/auth/login").await;
    let callback = visitor
        .get("/auth/callback?code=abc&state=forged")
        .await;
    assert!(callback.redirects_to("/"));

    let account = visitor.get("/account").await;
    assert_eq!(account.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_signs_out() {
    let app = TestApp::spawn().await;
    app.mock_rpc("getCallerOrders", json!([])).await;
    let mut visitor = app.visitor();
    visitor.sign_in("2vxsx-fae").await;
    assert_eq!(visitor.get("/account").await.status, StatusCode::OK);

    let logout = visitor.post("/auth/logout", &[]).await;
    assert!(logout.redirects_to("/"));
    assert_eq!(visitor.get("/account").await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_denied_for_regular_user() {
    let app = TestApp::spawn().await;
    app.mock_rpc("isCallerAdmin", json!(false)).await;
    let mut visitor = app.visitor();
    visitor.sign_in("2vxsx-fae").await;

    let page = visitor.get("/admin").await;
    assert_eq!(page.status, StatusCode::FORBIDDEN);
    assert!(page.body.contains("Access Denied"));

    let write = visitor
        .post("/admin/services", &[("title", "Hosting")])
        .await;
    assert_eq!(write.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_denied_when_check_fails() {
    let app = TestApp::spawn().await;
    app.mock_rpc_error("isCallerAdmin", 500, "canister trapped").await;
    let mut visitor = app.visitor();
    visitor.sign_in("2vxsx-fae").await;

    assert_eq!(visitor.get("/admin").await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_dashboard_and_create_service() {
    let app = TestApp::spawn().await;
    app.mock_rpc("isCallerAdmin", json!(true)).await;
    app.mock_rpc("getServices", json!([])).await;
    app.mock_rpc("createService", json!(1)).await;
    let mut visitor = app.visitor();
    visitor.sign_in("aaaaa-admin").await;

    let dashboard = visitor.get("/admin").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains("Services"));

    let created = visitor
        .post(
            "/admin/services",
            &[
                ("title", "Managed Hosting"),
                ("description", "Fully managed servers"),
                ("category", "Hosting"),
                ("pricing", "49"),
            ],
        )
        .await;
    assert!(created.redirects_to("/admin?tab=services"));
    assert!(
        visitor
            .get("/admin?tab=services")
            .await
            .body
            .contains("Service created successfully")
    );
}

#[tokio::test]
async fn test_branding_tab_reports_load_failure() {
    let app = TestApp::spawn().await;
    app.mock_rpc("isCallerAdmin", json!(true)).await;
    app.mock_rpc_error("getSiteBranding", 500, "canister trapped").await;
    let mut visitor = app.visitor();
    visitor.sign_in("aaaaa-admin").await;

    let page = visitor.get("/admin?tab=branding").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("flash-error"));
    assert!(page.body.contains("canister trapped"));
}

#[tokio::test]
async fn test_branding_tab_shows_saved_branding() {
    let app = TestApp::spawn().await;
    app.mock_rpc("isCallerAdmin", json!(true)).await;
    app.mock_rpc(
        "getSiteBranding",
        json!({
            "logo": "https://cdn.example.com/logo.png",
            "homepageSliderImages": [],
            "storeBanners": [],
            "socialLinks": { "facebook": "", "whatsapp": "", "youtube": "" },
            "languageConfig": { "defaultLanguage": "", "availableLanguages": [] },
        }),
    )
    .await;
    let mut visitor = app.visitor();
    visitor.sign_in("aaaaa-admin").await;

    let page = visitor.get("/admin?tab=branding").await;
    assert!(page.body.contains("https://cdn.example.com/logo.png"));
    assert!(!page.body.contains("flash-error"));
}
