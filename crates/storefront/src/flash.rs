//! Flash notifications stored in the session.
//!
//! Handlers push a [`Flash`] before redirecting; the next page render takes
//! and displays them once.

use tower_sessions::Session;

use crate::models::{Flash, session_keys};

/// Queue a notification for the next page.
///
/// Failures are logged and otherwise ignored; a lost notification never
/// fails the request.
pub async fn push(session: &Session, flash: Flash) {
    let mut pending: Vec<Flash> = session
        .get(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    pending.push(flash);

    if let Err(e) = session.insert(session_keys::FLASH, pending).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return all pending notifications.
pub async fn take(session: &Session) -> Vec<Flash> {
    match session.remove::<Vec<Flash>>(session_keys::FLASH).await {
        Ok(pending) => pending.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash messages");
            Vec::new()
        }
    }
}
