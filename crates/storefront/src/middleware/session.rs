//! Session middleware configuration.
//!
//! Sessions are kept in memory unless a database URL is configured, in which
//! case they are persisted in `PostgreSQL` and survive restarts.

use async_trait::async_trait;
use sqlx::PgPool;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "its_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session store selected at startup.
#[derive(Debug, Clone)]
pub enum SiteSessionStore {
    Memory(MemoryStore),
    Postgres(PostgresStore),
}

impl SiteSessionStore {
    /// Postgres-backed store when a pool is available, in-memory otherwise.
    #[must_use]
    pub fn new(pool: Option<&PgPool>) -> Self {
        // Note: the sessions table must be created via `its-cli migrate sessions`
        pool.map_or_else(
            || Self::Memory(MemoryStore::default()),
            |pool| Self::Postgres(PostgresStore::new(pool.clone())),
        )
    }
}

#[async_trait]
impl SessionStore for SiteSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        match self {
            Self::Memory(store) => store.create(record).await,
            Self::Postgres(store) => store.create(record).await,
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        match self {
            Self::Memory(store) => store.save(record).await,
            Self::Postgres(store) => store.save(record).await,
        }
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self {
            Self::Memory(store) => store.load(session_id).await,
            Self::Postgres(store) => store.load(session_id).await,
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        match self {
            Self::Memory(store) => store.delete(session_id).await,
            Self::Postgres(store) => store.delete(session_id).await,
        }
    }
}

/// Create the session layer.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool, if sessions should be persisted
/// * `config` - Storefront configuration (for the `Secure` cookie flag)
#[must_use]
pub fn create_session_layer(
    pool: Option<&PgPool>,
    config: &StorefrontConfig,
) -> SessionManagerLayer<SiteSessionStore> {
    SessionManagerLayer::new(SiteSessionStore::new(pool))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
