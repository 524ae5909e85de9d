//! Catalog product types: stored rows, create/update payloads, validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use cortado_core::{Price, ProductCategory, ProductId, SizePriceModifiers};

/// A stored catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Opaque image reference; in practice often a sizable data URL.
    pub image: String,
    pub category: ProductCategory,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    pub is_active: bool,
    pub is_popular: bool,
    #[serde(default)]
    pub size_price_modifiers: Option<SizePriceModifiers>,
    pub created_at: DateTime<Utc>,
}

/// `POST /products` request body; doubles as the insert body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductRequest {
    #[serde(default)]
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    pub category: ProductCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_price_modifiers: Option<SizePriceModifiers>,
}

const fn default_true() -> bool {
    true
}

impl NewProductRequest {
    /// Validate field constraints.
    ///
    /// # Errors
    ///
    /// Returns a client-repairable message for the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_owned());
        }
        if !self.price.is_positive() {
            return Err("price must be positive".to_owned());
        }
        if self.image.is_empty() {
            return Err("image is required".to_owned());
        }
        validate_rating(self.rating)
    }
}

/// `PATCH /products/{id}` request body.
///
/// Absent fields stay untouched; nullable fields distinguish "leave alone"
/// (absent) from "clear" (explicit null) via the double `Option`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ProductCategory>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_popular: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub size_price_modifiers: Option<Option<SizePriceModifiers>>,
}

impl ProductPatch {
    /// Validate constraints on the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a client-repairable message for the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty".to_owned());
        }
        if let Some(price) = &self.price
            && !price.is_positive()
        {
            return Err("price must be positive".to_owned());
        }
        if let Some(image) = &self.image
            && image.is_empty()
        {
            return Err("image cannot be empty".to_owned());
        }
        validate_rating(self.rating.flatten())
    }
}

fn validate_rating(rating: Option<f64>) -> Result<(), String> {
    match rating {
        Some(value) if !(0.0..=5.0).contains(&value) => {
            Err("rating must be between 0 and 5".to_owned())
        }
        _ => Ok(()),
    }
}

/// Deserialize a field so that an explicit `null` becomes `Some(None)`
/// while an absent field (via `#[serde(default)]`) stays `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
