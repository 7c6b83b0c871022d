//! Payment processor (Stripe) types exchanged with the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default list of countries offered when configuring the processor.
pub const DEFAULT_ALLOWED_COUNTRIES: &str = "US,CA,GB";

/// Payment processor configuration written by admins.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeConfiguration {
    pub secret_key: String,
    pub allowed_countries: Vec<String>,
}

impl std::fmt::Debug for StripeConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfiguration")
            .field("secret_key", &"[REDACTED]")
            .field("allowed_countries", &self.allowed_countries)
            .finish()
    }
}

/// One line item of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    pub product_name: String,
    pub product_description: String,
    pub price_in_cents: u64,
    pub quantity: u64,
    pub currency: String,
}

/// Outcome of a checkout session as reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StripeSessionStatus {
    Completed {
        #[serde(
            rename = "userPrincipal",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        user_principal: Option<String>,
        response: String,
    },
    Failed {
        error: String,
    },
}

impl StripeSessionStatus {
    /// Whether the session ended in a failed payment.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A checkout session created by the processor.
///
/// The backend returns it as a JSON-encoded string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: String,
}

/// Errors decoding a checkout session payload.
#[derive(Debug, Error)]
pub enum CheckoutSessionError {
    #[error("invalid checkout session payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Stripe session missing url")]
    MissingUrl,
}

impl CheckoutSession {
    /// Decode the JSON string returned by `createCheckoutSession`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a session object or the
    /// session carries no redirect URL.
    pub fn from_payload(payload: &str) -> Result<Self, CheckoutSessionError> {
        let session: Self = serde_json::from_str(payload)?;
        if session.url.trim().is_empty() {
            return Err(CheckoutSessionError::MissingUrl);
        }
        Ok(session)
    }
}

/// Split a comma-separated country list (`"US, CA,GB"`).
///
/// Entries are trimmed and upper-cased; empty entries are dropped.
#[must_use]
pub fn parse_country_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_country_list() {
        assert_eq!(parse_country_list("US, ca ,GB,,"), vec!["US", "CA", "GB"]);
        assert!(parse_country_list("  ").is_empty());
    }

    #[test]
    fn test_checkout_session_from_payload() {
        let session =
            CheckoutSession::from_payload(r#"{"id":"cs_123","url":"https://pay.example/cs_123"}"#)
                .unwrap();
        assert_eq!(session.id, "cs_123");
        assert_eq!(session.url, "https://pay.example/cs_123");
    }

    #[test]
    fn test_checkout_session_missing_url() {
        let err = CheckoutSession::from_payload(r#"{"id":"cs_123"}"#).unwrap_err();
        assert!(matches!(err, CheckoutSessionError::MissingUrl));
        assert_eq!(err.to_string(), "Stripe session missing url");

        let err = CheckoutSession::from_payload("not json").unwrap_err();
        assert!(matches!(err, CheckoutSessionError::Malformed(_)));
    }

    #[test]
    fn test_session_status_wire_format() {
        let completed: StripeSessionStatus = serde_json::from_str(
            r#"{"completed":{"userPrincipal":"2vxsx-fae","response":"paid"}}"#,
        )
        .unwrap();
        assert!(!completed.is_failed());

        let failed: StripeSessionStatus =
            serde_json::from_str(r#"{"failed":{"error":"card declined"}}"#).unwrap();
        assert_eq!(
            failed,
            StripeSessionStatus::Failed {
                error: "card declined".to_string()
            }
        );
    }

    #[test]
    fn test_stripe_config_debug_redacts_secret() {
        let config = StripeConfiguration {
            secret_key: "sk_live_very_secret".to_string(),
            allowed_countries: vec!["US".to_string()],
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk_live_very_secret"));
    }
}
