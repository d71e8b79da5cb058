//! Scanned product domain model.
//!
//! # Responsibility
//! - Define the persisted product record and its wire shape.
//! - Validate required scan fields before persistence.
//!
//! # Invariants
//! - `barcode` is unique across products and never changes.
//! - `category` names an existing category at write time (service-enforced).
//! - `updated_at` moves forward on every category reassignment.

use super::category::{normalize_category_name, BOOTSTRAP_CATEGORY};
use super::{now_epoch_ms, serialize_epoch_ms, serialize_number, ModelValidationError};
use serde::Serialize;
use uuid::Uuid;

/// Stable store identifier of a product, exposed as `_id`.
pub type ProductId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Numeric material identifier printed next to the barcode.
    #[serde(serialize_with = "serialize_number")]
    pub material: f64,
    pub barcode: String,
    pub description: String,
    pub category: String,
    #[serde(serialize_with = "serialize_epoch_ms")]
    pub scanned_at: i64,
    #[serde(serialize_with = "serialize_epoch_ms")]
    pub created_at: i64,
    #[serde(serialize_with = "serialize_epoch_ms")]
    pub updated_at: i64,
}

impl Product {
    /// Creates a freshly scanned product with a generated id.
    ///
    /// An empty or whitespace-only `category` resolves to the bootstrap
    /// category.
    pub fn new(
        material: f64,
        barcode: impl Into<String>,
        description: impl Into<String>,
        category: Option<&str>,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            material,
            barcode: barcode.into(),
            description: description.into(),
            category: effective_category(category),
            scanned_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.material == 0.0 || !self.material.is_finite() {
            return Err(ModelValidationError::MissingMaterial);
        }
        if self.barcode.is_empty() {
            return Err(ModelValidationError::EmptyBarcode);
        }
        if self.description.is_empty() {
            return Err(ModelValidationError::EmptyDescription);
        }
        if normalize_category_name(&self.category).is_empty() {
            return Err(ModelValidationError::EmptyCategoryName);
        }
        Ok(())
    }
}

/// Resolves the category a product is filed under.
pub fn effective_category(category: Option<&str>) -> String {
    category
        .map(normalize_category_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| BOOTSTRAP_CATEGORY.to_string())
}
