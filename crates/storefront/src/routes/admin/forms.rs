//! Admin form payloads.
//!
//! Every form is converted and validated here before any backend call, so a
//! rejected form never reaches the network.

use itsolutions_core::{
    BrandingError, LanguageConfig, Price, Product, ProductId, ServiceId, ServiceItem,
    SiteBranding, SocialLinks, StripeConfiguration, format_language_lines, parse_country_list,
    parse_language_lines, parse_url_list,
};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Catalog form validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogFormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be a whole number")]
    InvalidNumber(&'static str),

    #[error("Invalid image URL")]
    InvalidImageUrl,
}

/// Payment form validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentFormError {
    #[error("Stripe secret key is required")]
    MissingSecretKey,

    #[error("At least one allowed country is required")]
    NoCountries,
}

fn required(value: &str, field: &'static str) -> Result<String, CatalogFormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(CatalogFormError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}

fn whole_number(value: &str, field: &'static str) -> Result<Price, CatalogFormError> {
    value
        .trim()
        .parse::<u64>()
        .map(Price::new)
        .map_err(|_| CatalogFormError::InvalidNumber(field))
}

fn optional_image_url(value: &str) -> Result<Option<String>, CatalogFormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Url::parse(value)
        .map(|_| Some(value.to_string()))
        .map_err(|_| CatalogFormError::InvalidImageUrl)
}

/// New service form.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceForm {
    pub title: String,
    pub description: String,
    pub category: String,
    /// Blank for quote-based services.
    #[serde(default)]
    pub pricing: String,
    #[serde(default)]
    pub image_url: String,
}

impl ServiceForm {
    /// Build the service to create; the backend assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank required field, a non-numeric price or
    /// a malformed image URL.
    pub fn into_service(self) -> Result<ServiceItem, CatalogFormError> {
        let pricing = if self.pricing.trim().is_empty() {
            None
        } else {
            Some(whole_number(&self.pricing, "Pricing")?)
        };

        Ok(ServiceItem {
            id: ServiceId::new(0),
            title: required(&self.title, "Title")?,
            description: required(&self.description, "Description")?,
            category: required(&self.category, "Category")?,
            pricing,
            image_url: optional_image_url(&self.image_url)?,
        })
    }
}

/// New product form.
#[derive(Debug, Default, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    #[serde(default)]
    pub image_url: String,
}

impl ProductForm {
    /// Build the product to create; the backend assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank required field, a non-numeric price or
    /// a malformed image URL.
    pub fn into_product(self) -> Result<Product, CatalogFormError> {
        Ok(Product {
            id: ProductId::new(0),
            name: required(&self.name, "Name")?,
            description: required(&self.description, "Description")?,
            category: required(&self.category, "Category")?,
            price: whole_number(&self.price, "Price")?,
            image_url: optional_image_url(&self.image_url)?,
        })
    }
}

/// Branding editor. List fields are one entry per line.
#[derive(Debug, Default, Deserialize)]
pub struct BrandingForm {
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub homepage_slider_images: String,
    #[serde(default)]
    pub store_banners: String,
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub youtube: String,
    /// `code = Name` per line.
    #[serde(default)]
    pub languages: String,
    #[serde(default)]
    pub default_language: String,
}

impl BrandingForm {
    /// Pre-fill the editor from the current branding.
    #[must_use]
    pub fn from_branding(branding: &SiteBranding) -> Self {
        Self {
            logo: branding.logo.clone().unwrap_or_default(),
            homepage_slider_images: branding.homepage_slider_images.join("\n"),
            store_banners: branding.store_banners.join("\n"),
            facebook: branding.social_links.facebook.clone(),
            whatsapp: branding.social_links.whatsapp.clone(),
            youtube: branding.social_links.youtube.clone(),
            languages: format_language_lines(&branding.language_config.available_languages),
            default_language: branding.language_config.default_language.clone(),
        }
    }

    /// Parse and validate the submitted branding.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn into_branding(self) -> Result<SiteBranding, BrandingError> {
        let logo = self.logo.trim();
        let branding = SiteBranding {
            logo: (!logo.is_empty()).then(|| logo.to_string()),
            homepage_slider_images: parse_url_list(&self.homepage_slider_images),
            store_banners: parse_url_list(&self.store_banners),
            social_links: SocialLinks {
                facebook: self.facebook.trim().to_string(),
                whatsapp: self.whatsapp.trim().to_string(),
                youtube: self.youtube.trim().to_string(),
            },
            language_config: LanguageConfig {
                default_language: self.default_language.trim().to_string(),
                available_languages: parse_language_lines(&self.languages),
            },
        };
        branding.validate()?;
        Ok(branding)
    }
}

/// Payment processor credentials form.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentsForm {
    pub secret_key: String,
    pub allowed_countries: String,
}

impl PaymentsForm {
    /// # Errors
    ///
    /// Returns an error for a blank key or an empty country list.
    pub fn into_configuration(self) -> Result<StripeConfiguration, PaymentFormError> {
        let secret_key = self.secret_key.trim();
        if secret_key.is_empty() {
            return Err(PaymentFormError::MissingSecretKey);
        }
        let allowed_countries = parse_country_list(&self.allowed_countries);
        if allowed_countries.is_empty() {
            return Err(PaymentFormError::NoCountries);
        }
        Ok(StripeConfiguration {
            secret_key: secret_key.to_string(),
            allowed_countries,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use itsolutions_core::Language;

    use super::*;

    fn product_form() -> ProductForm {
        ProductForm {
            name: " Mechanical Keyboard ".to_string(),
            description: "Tactile switches".to_string(),
            category: "Peripherals".to_string(),
            price: "79".to_string(),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_product_form_trims_and_parses() {
        let product = product_form().into_product().unwrap();
        assert_eq!(product.name, "Mechanical Keyboard");
        assert_eq!(product.price, Price::new(79));
        assert_eq!(product.image_url, None);
        assert_eq!(product.id, ProductId::new(0));
    }

    #[test]
    fn test_product_form_rejects_bad_price() {
        let form = ProductForm {
            price: "79.99".to_string(),
            ..product_form()
        };
        assert_eq!(
            form.into_product().unwrap_err(),
            CatalogFormError::InvalidNumber("Price")
        );
    }

    #[test]
    fn test_product_form_requires_name() {
        let form = ProductForm {
            name: "   ".to_string(),
            ..product_form()
        };
        let err = form.into_product().unwrap_err();
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn test_service_form_pricing_optional() {
        let form = ServiceForm {
            title: "WordPress Website".to_string(),
            description: "Custom theme and setup".to_string(),
            category: "Web".to_string(),
            pricing: "  ".to_string(),
            image_url: "https://cdn.example.com/wp.png".to_string(),
        };
        let service = form.into_service().unwrap();
        assert_eq!(service.pricing, None);
        assert_eq!(
            service.image_url.as_deref(),
            Some("https://cdn.example.com/wp.png")
        );
    }

    #[test]
    fn test_service_form_rejects_relative_image() {
        let form = ServiceForm {
            title: "Repairs".to_string(),
            description: "Diagnostics".to_string(),
            category: "Servicing".to_string(),
            pricing: "40".to_string(),
            image_url: "images/repair.png".to_string(),
        };
        assert_eq!(
            form.into_service().unwrap_err(),
            CatalogFormError::InvalidImageUrl
        );
    }

    #[test]
    fn test_branding_form_parses_lists() {
        let form = BrandingForm {
            homepage_slider_images: "https://a.example/1.png\n\n  https://a.example/2.png  "
                .to_string(),
            languages: "en = English\nes = Español".to_string(),
            default_language: "es".to_string(),
            ..BrandingForm::default()
        };
        let branding = form.into_branding().unwrap();
        assert_eq!(branding.homepage_slider_images.len(), 2);
        assert_eq!(branding.logo, None);
        assert_eq!(
            branding.language_config.available_languages,
            vec![
                Language {
                    code: "en".to_string(),
                    name: "English".to_string()
                },
                Language {
                    code: "es".to_string(),
                    name: "Español".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_branding_form_rejects_bad_social_link() {
        let form = BrandingForm {
            youtube: "youtube dot com".to_string(),
            ..BrandingForm::default()
        };
        let err = form.into_branding().unwrap_err();
        assert_eq!(err.to_string(), "Invalid YouTube URL");
    }

    #[test]
    fn test_branding_form_rejects_unknown_default() {
        let form = BrandingForm {
            languages: "en = English".to_string(),
            default_language: "fr".to_string(),
            ..BrandingForm::default()
        };
        assert!(matches!(
            form.into_branding(),
            Err(BrandingError::UnknownDefaultLanguage(_))
        ));
    }

    #[test]
    fn test_branding_form_prefill_round_trips() {
        let form = BrandingForm {
            logo: "https://a.example/logo.png".to_string(),
            store_banners: "https://a.example/banner.png".to_string(),
            languages: "en = English".to_string(),
            default_language: "en".to_string(),
            ..BrandingForm::default()
        };
        let branding = form.into_branding().unwrap();
        let prefill = BrandingForm::from_branding(&branding);
        assert_eq!(prefill.languages, "en = English");
        assert_eq!(prefill.into_branding().unwrap(), branding);
    }

    #[test]
    fn test_payments_form() {
        let config = PaymentsForm {
            secret_key: " sk_test_123 ".to_string(),
            allowed_countries: "us, ca".to_string(),
        }
        .into_configuration()
        .unwrap();
        assert_eq!(config.secret_key, "sk_test_123");
        assert_eq!(config.allowed_countries, vec!["US", "CA"]);

        let err = PaymentsForm {
            secret_key: "sk_test_123".to_string(),
            allowed_countries: " , ".to_string(),
        }
        .into_configuration()
        .unwrap_err();
        assert_eq!(err, PaymentFormError::NoCountries);
    }
}
