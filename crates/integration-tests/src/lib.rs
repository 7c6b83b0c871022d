//! End-to-end test harness for the storefront.
//!
//! Each [`TestApp`] builds the full router in-process, with the backend and
//! the identity provider replaced by `wiremock` servers. Requests go through
//! `tower::ServiceExt::oneshot`, so no port is bound.
//!
//! ```rust,ignore
//! let app = TestApp::spawn().await;
//! app.mock_products(json!([...])).await;
//!
//! let mut visitor = app.visitor();
//! visitor.post("/cart/add", &[("product_id", "1")]).await;
//! assert!(visitor.get("/cart").await.body.contains("Laptop"));
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use itsolutions_storefront::config::{
    BackendConfig, CacheConfig, IdentityConfig, StorefrontConfig,
};
use itsolutions_storefront::middleware::session::SESSION_COOKIE_NAME;
use itsolutions_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Public URL the test storefront believes it is served from.
pub const BASE_URL: &str = "http://shop.test";

/// A storefront wired to mock collaborators.
pub struct TestApp {
    pub router: Router,
    pub backend: MockServer,
    pub identity: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let backend = MockServer::start().await;
        let identity = MockServer::start().await;

        let state = AppState::new(test_config(&backend.uri(), &identity.uri()), None).unwrap();

        Self {
            router: itsolutions_storefront::app(state),
            backend,
            identity,
        }
    }

    /// A fresh visitor with no session.
    #[must_use]
    pub const fn visitor(&self) -> Visitor<'_> {
        Visitor {
            app: self,
            cookie: None,
        }
    }

    /// Answer backend `method` with `result`.
    pub async fn mock_rpc(&self, rpc: &str, result: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/rpc/{rpc}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(result))
            .mount(&self.backend)
            .await;
    }

    /// Reject backend `method` with `status` and an error message.
    pub async fn mock_rpc_error(&self, rpc: &str, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/rpc/{rpc}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "error": message })))
            .mount(&self.backend)
            .await;
    }

    pub async fn mock_products(&self, products: Value) {
        self.mock_rpc("getProducts", products).await;
    }

    /// Make the identity provider accept any code as `principal`.
    pub async fn mock_identity(&self, principal: &str) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "principal": principal,
                "delegation": format!("delegation-for-{principal}"),
            })))
            .mount(&self.identity)
            .await;
    }
}

/// Configuration pointing at the two mock servers.
#[must_use]
pub fn test_config(backend_url: &str, identity_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: Url::parse(BASE_URL).unwrap(),
        database_url: None,
        backend: BackendConfig {
            url: Url::parse(backend_url).unwrap(),
            timeout: Duration::from_secs(5),
        },
        cache: CacheConfig::default(),
        identity: IdentityConfig {
            provider_url: Url::parse(identity_url).unwrap(),
            client_id: "storefront-tests".to_string(),
            client_secret: SecretString::from("t3st-Cl!ent-S3cr3t-9xQ"),
        },
        checkout_currency: "usd".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A collected response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Whether this is a redirect to `target`.
    #[must_use]
    pub fn redirects_to(&self, target: &str) -> bool {
        self.status.is_redirection() && self.location.as_deref() == Some(target)
    }
}

/// A browser-like client that carries the session cookie between requests.
pub struct Visitor<'a> {
    app: &'a TestApp,
    cookie: Option<String>,
}

impl<'a> Visitor<'a> {
    /// A second tab of the same browser, sharing the session cookie.
    #[must_use]
    pub fn fork(&self) -> Visitor<'a> {
        Visitor {
            app: self.app,
            cookie: self.cookie.clone(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Walk through the identity provider sign-in as `principal`.
    pub async fn sign_in(&mut self, principal: &str) {
        self.app.mock_identity(principal).await;

        let login = self.get("/auth/login").await;
        assert_eq!(login.status, StatusCode::SEE_OTHER, "login should redirect");
        let authorize = Url::parse(login.location.as_deref().unwrap()).unwrap();
        let state = authorize
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        let callback = self
            .get(&format!("/auth/callback?code=test-code&state={state}"))
            .await;
        assert!(
            callback.status.is_redirection(),
            "callback should redirect, got {}",
            callback.status
        );
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.app.router.clone().oneshot(request).await.unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Some(pair) = value.split(';').next() else { continue };
            if let Some((name, cookie_value)) = pair.split_once('=')
                && name == SESSION_COOKIE_NAME
            {
                self.cookie = (!cookie_value.is_empty()).then(|| pair.to_string());
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// A catalog product as the backend returns it.
#[must_use]
pub fn product_json(id: u64, name: &str, price: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "category": "Hardware",
        "price": price,
    })
}
