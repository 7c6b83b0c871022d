//! Per-session request serialization.
//!
//! tower-sessions loads a session record once per request and writes the
//! whole record back when the response is produced. Two overlapping requests
//! from one visitor (a double-submitted "add to cart", or a page load taking
//! a flash while a cart update runs) would each save their own copy, and the
//! later save drops the other's change. Requests carrying the same session
//! cookie therefore run one at a time. Cookie-less requests and static
//! assets are never held.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use moka::future::Cache;
use tokio::sync::Mutex;

use super::session::SESSION_COOKIE_NAME;

/// One lock per active session id.
#[derive(Clone)]
pub struct SessionLocks {
    inner: Cache<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(Duration::from_secs(300))
                .build(),
        }
    }

    async fn lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.inner
            .get_with(session_id.to_string(), async { Arc::default() })
            .await
    }
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

fn session_cookie(request: &Request) -> Option<&str> {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value)
}

/// Run requests of the same session sequentially.
pub async fn session_lock_middleware(
    State(locks): State<SessionLocks>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path().starts_with("/static/") {
        return next.run(request).await;
    }
    let Some(session_id) = session_cookie(&request).map(str::to_string) else {
        return next.run(request).await;
    };

    let lock = locks.lock_for(&session_id).await;
    let _guard = lock.lock().await;
    next.run(request).await
}
