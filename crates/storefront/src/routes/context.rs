//! Per-page layout context.
//!
//! Every full page renders inside `base.html`, which needs the branding, the
//! cart badge, the signed-in identity, pending notifications and the CSP
//! nonce. [`PageContext`] gathers all of that in one extractor.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use itsolutions_core::{Cart, Language, SiteBranding};
use tower_sessions::Session;

use crate::flash;
use crate::identity::Caller;
use crate::middleware::CspNonce;
use crate::models::{Flash, session_keys};
use crate::state::AppState;

/// Layout data shared by every page.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub branding: Arc<SiteBranding>,
    pub cart_count: u64,
    pub caller: Option<Caller>,
    /// Profile name of the signed-in caller, once they have set one.
    pub display_name: Option<String>,
    pub is_admin: bool,
    /// Signed in but no profile yet; the layout shows the setup form.
    pub needs_profile: bool,
    pub flashes: Vec<Flash>,
    pub nonce: String,
    pub language: Option<String>,
    pub path: String,
}

impl PageContext {
    /// Build the context for the current request.
    pub async fn load(parts: &Parts, state: &AppState) -> Self {
        let session = parts.extensions.get::<Session>().cloned();
        let nonce = parts
            .extensions
            .get::<CspNonce>()
            .map(|n| n.value().to_string())
            .unwrap_or_default();

        let caller = match &session {
            Some(session) => session
                .get::<Caller>(session_keys::CALLER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        let backend = state.backend();
        let (branding, is_admin, profile) = tokio::join!(
            backend.get_site_branding(),
            async {
                match &caller {
                    Some(caller) => backend.is_caller_admin(caller).await.map(Some),
                    None => Ok(None),
                }
            },
            async {
                match &caller {
                    Some(caller) => backend.get_caller_user_profile(caller).await.map(Some),
                    None => Ok(None),
                }
            },
        );

        let branding = branding.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load branding, using defaults");
            Arc::default()
        });
        let is_admin = is_admin.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Admin check failed");
            None
        });
        // A failed lookup must not nag the visitor to create a profile.
        let (display_name, needs_profile) = match profile {
            Ok(Some(Some(profile))) => (Some(profile.name), false),
            Ok(Some(None)) => (None, true),
            Ok(None) => (None, false),
            Err(e) => {
                tracing::warn!(error = %e, "Profile lookup failed");
                (None, false)
            }
        };

        let mut ctx = Self {
            branding,
            caller,
            display_name,
            is_admin: is_admin.unwrap_or(false),
            needs_profile,
            nonce,
            path: parts.uri.path().to_string(),
            ..Self::default()
        };

        if let Some(session) = session {
            ctx.cart_count = session
                .get::<Cart>(session_keys::CART)
                .await
                .ok()
                .flatten()
                .map_or(0, |cart| cart.item_count());
            ctx.language = resolve_language(&session, &ctx.branding).await;
            ctx.flashes = flash::take(&session).await;
        }

        ctx
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.caller.is_some()
    }

    /// Name shown in the header: profile name, else shortened principal.
    #[must_use]
    pub fn caller_label(&self) -> String {
        match (&self.display_name, &self.caller) {
            (Some(name), _) => name.clone(),
            (None, Some(caller)) => caller.principal.abbreviated(),
            (None, None) => String::new(),
        }
    }

    #[must_use]
    pub fn languages(&self) -> &[Language] {
        &self.branding.language_config.available_languages
    }

    #[must_use]
    pub fn is_language(&self, code: &str) -> bool {
        self.language.as_deref() == Some(code)
    }

    /// Whether the nav entry for `prefix` should be highlighted.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.path == "/"
        } else {
            self.path.starts_with(prefix)
        }
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::load(parts, state).await)
    }
}

/// Resolve the saved language against the branding, forgetting a stale one.
async fn resolve_language(session: &Session, branding: &SiteBranding) -> Option<String> {
    let saved: Option<String> = session
        .get(session_keys::PREFERRED_LANGUAGE)
        .await
        .ok()
        .flatten();
    let selection = branding.language_config.resolve(saved.as_deref());

    if selection.clear_saved
        && let Err(e) = session
            .remove::<String>(session_keys::PREFERRED_LANGUAGE)
            .await
    {
        tracing::warn!(error = %e, "Failed to clear stale language preference");
    }

    selection.selected
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use itsolutions_core::{LanguageConfig, Principal};
    use tower_sessions::MemoryStore;

    use super::*;

    fn branding(default: &str, codes: &[&str]) -> SiteBranding {
        SiteBranding {
            language_config: LanguageConfig {
                default_language: default.to_string(),
                available_languages: codes
                    .iter()
                    .map(|c| Language {
                        code: (*c).to_string(),
                        name: c.to_uppercase(),
                    })
                    .collect(),
            },
            ..SiteBranding::default()
        }
    }

    #[tokio::test]
    async fn test_stale_language_is_cleared() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session
            .insert(session_keys::PREFERRED_LANGUAGE, "fr")
            .await
            .unwrap();

        let selected = resolve_language(&session, &branding("en", &["en", "sw"])).await;
        assert_eq!(selected.as_deref(), Some("en"));
        let saved: Option<String> = session.get(session_keys::PREFERRED_LANGUAGE).await.unwrap();
        assert_eq!(saved, None);
    }

    #[tokio::test]
    async fn test_valid_language_is_kept() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session
            .insert(session_keys::PREFERRED_LANGUAGE, "sw")
            .await
            .unwrap();

        let selected = resolve_language(&session, &branding("en", &["en", "sw"])).await;
        assert_eq!(selected.as_deref(), Some("sw"));
    }

    #[test]
    fn test_caller_label_and_nav() {
        let mut ctx = PageContext {
            path: "/store/4".to_string(),
            ..PageContext::default()
        };
        assert_eq!(ctx.caller_label(), "");
        assert!(ctx.is_active("/store"));
        assert!(!ctx.is_active("/"));

        ctx.caller = Some(Caller {
            principal: Principal::new("rrkah-fqaaa-aaaaa-aaaaq-cai"),
            delegation: String::new(),
        });
        assert_eq!(ctx.caller_label(), "rrkah…q-cai");

        ctx.display_name = Some("Amina".to_string());
        assert_eq!(ctx.caller_label(), "Amina");
    }
}
