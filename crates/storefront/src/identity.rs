//! Identity provider client.
//!
//! Sign-in is delegated to an external identity provider using an
//! authorization-code flow:
//!
//! 1. Generate a CSRF `state` and redirect to [`IdentityClient::authorization_url`]
//! 2. The provider redirects back to `/auth/callback` with `code` and `state`
//! 3. Exchange the code with [`IdentityClient::exchange_code`] for a [`Caller`]
//! 4. Send the caller's delegation token on every backend call

use std::sync::Arc;

use itsolutions_core::Principal;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::IdentityConfig;

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider refused to exchange the code.
    #[error("Token exchange failed ({status}): {message}")]
    Exchange { status: u16, message: String },

    /// The provider returned an unusable identity.
    #[error("Invalid identity: {0}")]
    Invalid(String),
}

/// A signed-in visitor, as stored in the session.
///
/// Implements `Debug` manually to redact the delegation token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub principal: Principal,
    /// Bearer token proving the principal to the backend.
    pub delegation: String,
}

impl std::fmt::Debug for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Caller")
            .field("principal", &self.principal)
            .field("delegation", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    principal: String,
    delegation: String,
}

/// Client for the identity provider's authorize and token endpoints.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    provider_url: Url,
    client_id: String,
    client_secret: SecretString,
}

impl IdentityClient {
    /// Create a new identity provider client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                provider_url: config.provider_url.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{path}",
            self.inner.provider_url.as_str().trim_end_matches('/')
        )
    }

    /// Build the URL the visitor is sent to for sign-in.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL to return to after sign-in
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        let base = self.endpoint("authorize");
        match Url::parse(&base) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("client_id", &self.inner.client_id)
                    .append_pair("response_type", "code")
                    .append_pair("redirect_uri", redirect_uri)
                    .append_pair("state", state);
                url.into()
            }
            Err(_) => base,
        }
    }

    /// Exchange an authorization code for the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the provider rejects the code,
    /// or the returned principal is empty.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Caller, IdentityError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(self.endpoint("token"))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IdentityError::Exchange {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }

        let token: TokenResponse = response.json().await?;
        if token.principal.trim().is_empty() {
            return Err(IdentityError::Invalid("empty principal".to_string()));
        }

        Ok(Caller {
            principal: Principal::new(token.principal),
            delegation: token.delegation,
        })
    }
}

/// Generate a random alphanumeric string for the OAuth `state` parameter.
#[must_use]
pub fn generate_state() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..32)
        .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
        .map(|&b| char::from(b))
        .collect()
}
