//! Query cache for backend reads.

use std::sync::Arc;

use itsolutions_core::{OrderItem, Principal, Product, ServiceItem, SiteBranding, UserProfile, UserRole};
use moka::future::Cache;

use crate::config::CacheConfig;

/// Cache key for backend reads. Caller-scoped data is keyed by principal.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum QueryKey {
    Products,
    Services,
    Branding,
    StripeConfigured,
    AllOrders,
    CallerOrders(Principal),
    CallerProfile(Principal),
    CallerIsAdmin(Principal),
    CallerRole(Principal),
}

impl QueryKey {
    /// Every key holding data about `principal`.
    #[must_use]
    pub fn caller_scoped(principal: &Principal) -> [Self; 4] {
        [
            Self::CallerOrders(principal.clone()),
            Self::CallerProfile(principal.clone()),
            Self::CallerIsAdmin(principal.clone()),
            Self::CallerRole(principal.clone()),
        ]
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum QueryValue {
    Products(Arc<Vec<Product>>),
    Services(Arc<Vec<ServiceItem>>),
    Branding(Arc<SiteBranding>),
    Orders(Arc<Vec<OrderItem>>),
    Profile(Option<UserProfile>),
    Role(UserRole),
    Flag(bool),
}

/// In-memory cache of successful backend reads.
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<QueryKey, QueryValue>,
}

impl QueryCache {
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(config.ttl)
                .build(),
        }
    }

    pub async fn get(&self, key: &QueryKey) -> Option<QueryValue> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: QueryKey, value: QueryValue) {
        self.inner.insert(key, value).await;
    }

    /// Drop every listed key.
    pub async fn invalidate(&self, keys: &[QueryKey]) {
        for key in keys {
            self.inner.invalidate(key).await;
        }
    }

    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.inner.get(key).await.is_some()
    }
}
