//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and referrer policy)
//! 5. CSP nonce (generate per-request nonce for inline scripts)
//! 6. Session lock (one request at a time per session cookie)
//! 7. Session layer (tower-sessions, memory or `PostgreSQL` store)
//! 8. Rate limiting on sign-in and checkout routes (governor)

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_lock;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth, clear_caller, set_caller};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{auth_rate_limiter, checkout_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SiteSessionStore, create_session_layer};
pub use session_lock::{SessionLocks, session_lock_middleware};
