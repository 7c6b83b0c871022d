//! Site branding: logo, image carousels, social links and language options.
//!
//! Admin edits are validated here before anything is sent to the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Links to the business's social media profiles. Empty means "not shown".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    pub facebook: String,
    pub whatsapp: String,
    pub youtube: String,
}

impl SocialLinks {
    /// Whether any link is configured.
    #[must_use]
    pub fn any(&self) -> bool {
        !(self.facebook.is_empty() && self.whatsapp.is_empty() && self.youtube.is_empty())
    }
}

/// A selectable site language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

/// Languages offered by the language selector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfig {
    pub default_language: String,
    pub available_languages: Vec<Language>,
}

/// Site-wide branding managed by admins.
///
/// `Default` is the empty branding shown when none can be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteBranding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub homepage_slider_images: Vec<String>,
    pub store_banners: Vec<String>,
    pub social_links: SocialLinks,
    pub language_config: LanguageConfig,
}

/// Branding validation failures. Messages are shown to the admin verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrandingError {
    #[error("Invalid {field} URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Language code and name cannot be empty")]
    EmptyLanguage,

    #[error("Default language must be one of the available languages")]
    UnknownDefaultLanguage(String),
}

impl SiteBranding {
    /// Validate an edited branding before saving.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: malformed logo or social URL, a
    /// language with an empty code or name, or a default language that is
    /// not among the available ones.
    pub fn validate(&self) -> Result<(), BrandingError> {
        if let Some(logo) = &self.logo {
            check_url("logo", logo)?;
        }
        check_url("Facebook", &self.social_links.facebook)?;
        check_url("WhatsApp", &self.social_links.whatsapp)?;
        check_url("YouTube", &self.social_links.youtube)?;

        let config = &self.language_config;
        if config
            .available_languages
            .iter()
            .any(|l| l.code.trim().is_empty() || l.name.trim().is_empty())
        {
            return Err(BrandingError::EmptyLanguage);
        }

        if !config.default_language.is_empty()
            && !config.available_languages.is_empty()
            && !config.is_available(&config.default_language)
        {
            return Err(BrandingError::UnknownDefaultLanguage(
                config.default_language.clone(),
            ));
        }

        Ok(())
    }

    /// Background image for the home hero when there are no slider images.
    #[must_use]
    pub fn hero_fallback_banner(&self) -> Option<&str> {
        if self.homepage_slider_images.is_empty() {
            self.store_banners.first().map(String::as_str)
        } else {
            None
        }
    }
}

/// Empty is accepted; anything else must parse as an absolute URL.
fn check_url(field: &'static str, value: &str) -> Result<(), BrandingError> {
    if value.is_empty() || url::Url::parse(value).is_ok() {
        Ok(())
    } else {
        Err(BrandingError::InvalidUrl {
            field,
            value: value.to_string(),
        })
    }
}

// =============================================================================
// Language Preference
// =============================================================================

/// Result of resolving a visitor's saved language against the branding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LanguageSelection {
    /// Code to use, if any language is configured.
    pub selected: Option<String>,
    /// The saved preference is stale and should be forgotten.
    pub clear_saved: bool,
}

impl LanguageConfig {
    /// Whether `code` is one of the available languages.
    #[must_use]
    pub fn is_available(&self, code: &str) -> bool {
        self.available_languages.iter().any(|l| l.code == code)
    }

    /// Pick the language to display.
    ///
    /// A saved code that is still available wins. Otherwise the default
    /// language is used (and a stale saved code is flagged for removal).
    /// Failing that, the first available language.
    #[must_use]
    pub fn resolve(&self, saved: Option<&str>) -> LanguageSelection {
        if let Some(code) = saved.filter(|c| !c.is_empty() && self.is_available(c)) {
            return LanguageSelection {
                selected: Some(code.to_string()),
                clear_saved: false,
            };
        }

        if !self.default_language.is_empty() {
            return LanguageSelection {
                selected: Some(self.default_language.clone()),
                clear_saved: saved.is_some(),
            };
        }

        LanguageSelection {
            selected: self.available_languages.first().map(|l| l.code.clone()),
            clear_saved: false,
        }
    }
}

// =============================================================================
// Form Encoding
// =============================================================================

/// Parse an image URL list editor: one URL per line, trimmed, blanks dropped.
#[must_use]
pub fn parse_url_list(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Parse the language editor: one `code = Name` entry per line.
///
/// A line without `=` yields a language with an empty name, which
/// [`SiteBranding::validate`] rejects.
#[must_use]
pub fn parse_language_lines(input: &str) -> Vec<Language> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (code, name) = line.split_once('=').unwrap_or((line, ""));
            Language {
                code: code.trim().to_string(),
                name: name.trim().to_string(),
            }
        })
        .collect()
}

/// Inverse of [`parse_language_lines`], for pre-filling the editor.
#[must_use]
pub fn format_language_lines(languages: &[Language]) -> String {
    languages
        .iter()
        .map(|l| format!("{} = {}", l.code, l.name))
        .collect::<Vec<_>>()
        .join("\n")
}
