//! JSON RPC client for the remote backend.

use std::sync::Arc;

use itsolutions_core::{
    CheckoutSession, OrderId, OrderItem, Principal, Product, ProductId, ServiceId, ServiceItem,
    ShoppingItem, SiteBranding, StripeConfiguration, StripeSessionStatus, UserProfile, UserRole,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::BackendError;
use super::cache::{QueryCache, QueryKey, QueryValue};
use crate::config::{BackendConfig, CacheConfig};
use crate::identity::Caller;

/// Error payload of a rejected call.
#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    error: String,
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the remote backend.
///
/// The single access point for catalog, order, profile, role, branding and
/// payment operations. Reads are cached (see [`QueryCache`]).
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    endpoint: String,
    cache: QueryCache,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig, cache: &CacheConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                endpoint: config.url.as_str().trim_end_matches('/').to_string(),
                cache: QueryCache::new(cache),
            }),
        })
    }

    /// The read cache, shared by all clones of this client.
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Invoke one backend method with positional arguments.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        caller: Option<&Caller>,
        args: Value,
    ) -> Result<T, BackendError> {
        let url = format!("{}/rpc/{method}", self.inner.endpoint);

        let mut request = self.inner.client.post(&url).json(&args);
        if let Some(caller) = caller {
            request = request.bearer_auth(&caller.delegation);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = rejection_message(&body, status);
            tracing::warn!(method, status = %status, message = %message, "Backend rejected call");
            return Err(BackendError::Rejected {
                method,
                status: status.as_u16(),
                message,
            });
        }

        // Methods without a result may answer with an empty body.
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };

        serde_json::from_str(body).map_err(|e| {
            tracing::error!(
                method,
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        if let Some(QueryValue::Products(products)) = self.cache().get(&QueryKey::Products).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Arc<Vec<Product>> = Arc::new(self.call("getProducts", None, json!([])).await?);
        self.cache()
            .insert(QueryKey::Products, QueryValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// List all services.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self))]
    pub async fn get_services(&self) -> Result<Arc<Vec<ServiceItem>>, BackendError> {
        if let Some(QueryValue::Services(services)) = self.cache().get(&QueryKey::Services).await {
            debug!("Cache hit for services");
            return Ok(services);
        }

        let services: Arc<Vec<ServiceItem>> =
            Arc::new(self.call("getServices", None, json!([])).await?);
        self.cache()
            .insert(QueryKey::Services, QueryValue::Services(Arc::clone(&services)))
            .await;
        Ok(services)
    }

    /// Add a product. The backend assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the call fails.
    #[instrument(skip(self, caller, product), fields(name = %product.name))]
    pub async fn create_product(
        &self,
        caller: &Caller,
        product: &Product,
    ) -> Result<ProductId, BackendError> {
        let id = self
            .call("createProduct", Some(caller), json!([product]))
            .await?;
        self.cache().invalidate(&[QueryKey::Products]).await;
        Ok(id)
    }

    /// Add a service. The backend assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the call fails.
    #[instrument(skip(self, caller, service), fields(title = %service.title))]
    pub async fn create_service(
        &self,
        caller: &Caller,
        service: &ServiceItem,
    ) -> Result<ServiceId, BackendError> {
        let id = self
            .call("createService", Some(caller), json!([service]))
            .await?;
        self.cache().invalidate(&[QueryKey::Services]).await;
        Ok(id)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Record an order for the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, caller, products), fields(principal = %caller.principal, lines = products.len()))]
    pub async fn create_order(
        &self,
        caller: &Caller,
        products: &[Product],
        total_amount: u64,
    ) -> Result<OrderId, BackendError> {
        let id = self
            .call("createOrder", Some(caller), json!([products, total_amount]))
            .await?;
        self.cache()
            .invalidate(&[
                QueryKey::CallerOrders(caller.principal.clone()),
                QueryKey::AllOrders,
            ])
            .await;
        Ok(id)
    }

    /// Orders placed by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, caller), fields(principal = %caller.principal))]
    pub async fn get_caller_orders(
        &self,
        caller: &Caller,
    ) -> Result<Arc<Vec<OrderItem>>, BackendError> {
        let key = QueryKey::CallerOrders(caller.principal.clone());
        if let Some(QueryValue::Orders(orders)) = self.cache().get(&key).await {
            debug!("Cache hit for caller orders");
            return Ok(orders);
        }

        let orders: Arc<Vec<OrderItem>> =
            Arc::new(self.call("getCallerOrders", Some(caller), json!([])).await?);
        self.cache()
            .insert(key, QueryValue::Orders(Arc::clone(&orders)))
            .await;
        Ok(orders)
    }

    /// Every order in the system (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the call fails.
    #[instrument(skip(self, caller))]
    pub async fn get_all_orders(&self, caller: &Caller) -> Result<Arc<Vec<OrderItem>>, BackendError> {
        if let Some(QueryValue::Orders(orders)) = self.cache().get(&QueryKey::AllOrders).await {
            debug!("Cache hit for all orders");
            return Ok(orders);
        }

        let orders: Arc<Vec<OrderItem>> =
            Arc::new(self.call("getAllOrders", Some(caller), json!([])).await?);
        self.cache()
            .insert(QueryKey::AllOrders, QueryValue::Orders(Arc::clone(&orders)))
            .await;
        Ok(orders)
    }

    // =========================================================================
    // Profiles and Roles
    // =========================================================================

    /// The caller's profile, if they have created one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, caller), fields(principal = %caller.principal))]
    pub async fn get_caller_user_profile(
        &self,
        caller: &Caller,
    ) -> Result<Option<UserProfile>, BackendError> {
        let key = QueryKey::CallerProfile(caller.principal.clone());
        if let Some(QueryValue::Profile(profile)) = self.cache().get(&key).await {
            debug!("Cache hit for caller profile");
            return Ok(profile);
        }

        let profile: Option<UserProfile> =
            self.call("getCallerUserProfile", Some(caller), json!([])).await?;
        self.cache()
            .insert(key, QueryValue::Profile(profile.clone()))
            .await;
        Ok(profile)
    }

    /// Create or replace the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, caller, profile), fields(principal = %caller.principal))]
    pub async fn save_caller_user_profile(
        &self,
        caller: &Caller,
        profile: &UserProfile,
    ) -> Result<(), BackendError> {
        self.call::<()>("saveCallerUserProfile", Some(caller), json!([profile]))
            .await?;
        self.cache()
            .invalidate(&[QueryKey::CallerProfile(caller.principal.clone())])
            .await;
        Ok(())
    }

    /// Another user's profile (admin only). Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, caller))]
    pub async fn get_user_profile(
        &self,
        caller: &Caller,
        user: &Principal,
    ) -> Result<Option<UserProfile>, BackendError> {
        self.call("getUserProfile", Some(caller), json!([user])).await
    }

    /// The caller's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, caller), fields(principal = %caller.principal))]
    pub async fn get_caller_user_role(&self, caller: &Caller) -> Result<UserRole, BackendError> {
        let key = QueryKey::CallerRole(caller.principal.clone());
        if let Some(QueryValue::Role(role)) = self.cache().get(&key).await {
            return Ok(role);
        }

        let role: UserRole = self.call("getCallerUserRole", Some(caller), json!([])).await?;
        self.cache().insert(key, QueryValue::Role(role)).await;
        Ok(role)
    }

    /// Whether the caller is an admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, caller), fields(principal = %caller.principal))]
    pub async fn is_caller_admin(&self, caller: &Caller) -> Result<bool, BackendError> {
        let key = QueryKey::CallerIsAdmin(caller.principal.clone());
        if let Some(QueryValue::Flag(is_admin)) = self.cache().get(&key).await {
            return Ok(is_admin);
        }

        let is_admin: bool = self.call("isCallerAdmin", Some(caller), json!([])).await?;
        self.cache().insert(key, QueryValue::Flag(is_admin)).await;
        Ok(is_admin)
    }

    /// Assign a role to `user` (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the call fails.
    #[instrument(skip(self, caller))]
    pub async fn assign_caller_user_role(
        &self,
        caller: &Caller,
        user: &Principal,
        role: UserRole,
    ) -> Result<(), BackendError> {
        self.call::<()>("assignCallerUserRole", Some(caller), json!([user, role]))
            .await?;
        self.cache()
            .invalidate(&[
                QueryKey::CallerIsAdmin(user.clone()),
                QueryKey::CallerRole(user.clone()),
            ])
            .await;
        Ok(())
    }

    // =========================================================================
    // Branding
    // =========================================================================

    /// Site branding.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self))]
    pub async fn get_site_branding(&self) -> Result<Arc<SiteBranding>, BackendError> {
        if let Some(QueryValue::Branding(branding)) = self.cache().get(&QueryKey::Branding).await {
            return Ok(branding);
        }

        let branding: Arc<SiteBranding> =
            Arc::new(self.call("getSiteBranding", None, json!([])).await?);
        self.cache()
            .insert(QueryKey::Branding, QueryValue::Branding(Arc::clone(&branding)))
            .await;
        Ok(branding)
    }

    /// Replace the site branding (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the call fails.
    #[instrument(skip(self, caller, branding))]
    pub async fn update_branding(
        &self,
        caller: &Caller,
        branding: &SiteBranding,
    ) -> Result<(), BackendError> {
        self.call::<()>("updateBranding", Some(caller), json!([branding]))
            .await?;
        self.cache().invalidate(&[QueryKey::Branding]).await;
        Ok(())
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Whether payment processing has been configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self))]
    pub async fn is_stripe_configured(&self) -> Result<bool, BackendError> {
        if let Some(QueryValue::Flag(configured)) =
            self.cache().get(&QueryKey::StripeConfigured).await
        {
            return Ok(configured);
        }

        let configured: bool = self.call("isStripeConfigured", None, json!([])).await?;
        self.cache()
            .insert(QueryKey::StripeConfigured, QueryValue::Flag(configured))
            .await;
        Ok(configured)
    }

    /// Store the payment processor credentials (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the call fails.
    #[instrument(skip(self, caller, config), fields(countries = config.allowed_countries.len()))]
    pub async fn set_stripe_configuration(
        &self,
        caller: &Caller,
        config: &StripeConfiguration,
    ) -> Result<(), BackendError> {
        self.call::<()>("setStripeConfiguration", Some(caller), json!([config]))
            .await?;
        self.cache().invalidate(&[QueryKey::StripeConfigured]).await;
        Ok(())
    }

    /// Open a hosted checkout session for `items`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the returned session has no
    /// redirect URL.
    #[instrument(skip(self, caller, items), fields(lines = items.len()))]
    pub async fn create_checkout_session(
        &self,
        caller: &Caller,
        items: &[ShoppingItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, BackendError> {
        let payload: String = self
            .call(
                "createCheckoutSession",
                Some(caller),
                json!([items, success_url, cancel_url]),
            )
            .await?;
        Ok(CheckoutSession::from_payload(&payload)?)
    }

    /// Look up the outcome of a checkout session. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, caller))]
    pub async fn get_stripe_session_status(
        &self,
        caller: Option<&Caller>,
        session_id: &str,
    ) -> Result<StripeSessionStatus, BackendError> {
        self.call("getStripeSessionStatus", caller, json!([session_id]))
            .await
    }
}

/// Extract the explanation from a rejected call's body.
fn rejection_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(RpcErrorBody { error }) = serde_json::from_str(body) {
        return error;
    }
    let text = body.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        text.chars().take(200).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use itsolutions_core::Price;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(
            &BackendConfig {
                url: Url::parse(&server.uri()).unwrap(),
                timeout: Duration::from_secs(5),
            },
            &CacheConfig::default(),
        )
        .unwrap()
    }

    fn caller(name: &str) -> Caller {
        Caller {
            principal: Principal::new(name),
            delegation: format!("{name}-token"),
        }
    }

    fn product_json(id: u64, price: u64) -> Value {
        json!({
            "id": id,
            "name": format!("Product {id}"),
            "description": "Refurbished laptop",
            "category": "Hardware",
            "price": price
        })
    }

    #[tokio::test]
    async fn test_get_products_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getProducts"))
            .and(body_json(json!([])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, 10)])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let first = client.get_products().await.unwrap();
        let second = client.get_products().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].price, Price::new(10));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_create_product_invalidates_products() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getProducts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/createProduct"))
            .and(header("authorization", "Bearer admin-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(7)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.get_products().await.unwrap();

        let product: Product = serde_json::from_value(product_json(0, 99)).unwrap();
        let id = client.create_product(&caller("admin"), &product).await.unwrap();
        assert_eq!(id, ProductId::new(7));
        assert!(!client.cache().contains(&QueryKey::Products).await);

        client.get_products().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getServices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/createService"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": "Unauthorized: Only admins can add services"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.get_services().await.unwrap();

        let service: ServiceItem = serde_json::from_value(json!({
            "id": 0, "title": "Repairs", "description": "d", "category": "Support"
        }))
        .unwrap();
        let err = client
            .create_service(&caller("someone"), &service)
            .await
            .unwrap_err();

        match err {
            BackendError::Rejected { method, status, message } => {
                assert_eq!(method, "createService");
                assert_eq!(status, 403);
                assert_eq!(message, "Unauthorized: Only admins can add services");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(client.cache().contains(&QueryKey::Services).await);
    }

    #[tokio::test]
    async fn test_failed_read_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getSiteBranding"))
            .respond_with(ResponseTemplate::new(500).set_body_string("canister trapped"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get_site_branding().await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { status: 500, ref message, .. } if message == "canister trapped"));
        assert!(!client.cache().contains(&QueryKey::Branding).await);
    }

    #[tokio::test]
    async fn test_create_order_invalidates_caller_and_all_orders() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getCallerOrders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/getAllOrders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/createOrder"))
            .and(body_json(json!([[product_json(1, 10)], 20])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(3)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let alice = caller("alice");
        let bob = caller("bob");
        client.get_caller_orders(&alice).await.unwrap();
        client.get_caller_orders(&bob).await.unwrap();
        client.get_all_orders(&alice).await.unwrap();

        let products: Vec<Product> = vec![serde_json::from_value(product_json(1, 10)).unwrap()];
        let id = client.create_order(&alice, &products, 20).await.unwrap();
        assert_eq!(id, OrderId::new(3));

        let cache = client.cache();
        assert!(!cache.contains(&QueryKey::CallerOrders(alice.principal.clone())).await);
        assert!(!cache.contains(&QueryKey::AllOrders).await);
        assert!(cache.contains(&QueryKey::CallerOrders(bob.principal.clone())).await);
    }

    #[tokio::test]
    async fn test_admin_flag_is_per_caller() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/isCallerAdmin"))
            .and(header("authorization", "Bearer alice-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/isCallerAdmin"))
            .and(header("authorization", "Bearer bob-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.is_caller_admin(&caller("alice")).await.unwrap());
        assert!(!client.is_caller_admin(&caller("bob")).await.unwrap());
        assert!(client.is_caller_admin(&caller("alice")).await.unwrap());
    }

    #[tokio::test]
    async fn test_assign_role_invalidates_target_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/isCallerAdmin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/assignCallerUserRole"))
            .and(body_json(json!(["bob", "admin"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let bob = caller("bob");
        client.is_caller_admin(&bob).await.unwrap();

        client
            .assign_caller_user_role(&caller("alice"), &bob.principal, UserRole::Admin)
            .await
            .unwrap();
        assert!(!client.cache().contains(&QueryKey::CallerIsAdmin(bob.principal.clone())).await);
    }

    #[tokio::test]
    async fn test_caller_role_cached_until_reassigned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getCallerUserRole"))
            .and(header("authorization", "Bearer bob-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("user")))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/assignCallerUserRole"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let bob = caller("bob");
        assert_eq!(client.get_caller_user_role(&bob).await.unwrap(), UserRole::User);
        assert_eq!(client.get_caller_user_role(&bob).await.unwrap(), UserRole::User);
        assert!(client.cache().contains(&QueryKey::CallerRole(bob.principal.clone())).await);

        client
            .assign_caller_user_role(&caller("alice"), &bob.principal, UserRole::Admin)
            .await
            .unwrap();
        assert!(!client.cache().contains(&QueryKey::CallerRole(bob.principal.clone())).await);

        // Refetched after invalidation; the mock's `expect(2)` checks the count.
        client.get_caller_user_role(&bob).await.unwrap();
    }

    #[tokio::test]
    async fn test_user_profile_lookup_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getUserProfile"))
            .and(header("authorization", "Bearer alice-token"))
            .and(body_json(json!(["bob"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Bob" })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let alice = caller("alice");
        let bob = Principal::new("bob");
        for _ in 0..2 {
            let profile = client.get_user_profile(&alice, &bob).await.unwrap();
            assert_eq!(profile, Some(UserProfile { name: "Bob".to_string() }));
        }
        assert!(!client.cache().contains(&QueryKey::CallerProfile(bob)).await);
    }

    #[tokio::test]
    async fn test_save_profile_with_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getCallerUserProfile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rpc/saveCallerUserProfile"))
            .and(body_json(json!([{ "name": "Amina" }])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let alice = caller("alice");
        assert_eq!(client.get_caller_user_profile(&alice).await.unwrap(), None);
        client
            .save_caller_user_profile(&alice, &UserProfile { name: "Amina".to_string() })
            .await
            .unwrap();
        client.get_caller_user_profile(&alice).await.unwrap();
    }

    #[tokio::test]
    async fn test_checkout_session_requires_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/createCheckoutSession"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(r#"{"id":"cs_1"}"#)))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .create_checkout_session(&caller("alice"), &[], "https://s/ok", "https://s/cancel")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Stripe session missing url");
    }

    #[tokio::test]
    async fn test_session_status_decodes_variants() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc/getStripeSessionStatus"))
            .and(body_json(json!(["cs_1"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "failed": { "error": "card declined" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let status = client.get_stripe_session_status(None, "cs_1").await.unwrap();
        assert!(status.is_failed());
    }

    #[test]
    fn test_rejection_message_fallbacks() {
        assert_eq!(
            rejection_message(r#"{"error":"nope"}"#, reqwest::StatusCode::FORBIDDEN),
            "nope"
        );
        assert_eq!(
            rejection_message("  ", reqwest::StatusCode::BAD_GATEWAY),
            "Bad Gateway"
        );
        assert_eq!(
            rejection_message("plain failure", reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            "plain failure"
        );
    }
}
