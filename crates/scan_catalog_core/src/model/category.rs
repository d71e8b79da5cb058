//! Category domain model.
//!
//! # Invariants
//! - `name` is stored trimmed and is unique across the catalog.
//! - `created_at` is set once at creation and never changes.
//! - The bootstrap category (`Uncategorized`) always exists and cannot be deleted.

use super::{now_epoch_ms, serialize_epoch_ms, ModelValidationError};
use serde::Serialize;

/// Name of the permanent default category.
pub const BOOTSTRAP_CATEGORY: &str = "Uncategorized";

/// Named grouping of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    #[serde(serialize_with = "serialize_epoch_ms")]
    pub created_at: i64,
}

impl Category {
    /// Creates a category stamped with the current time.
    ///
    /// The name is trimmed; call [`Category::validate`] before persisting.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: normalize_category_name(name.as_ref()),
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.is_empty() {
            return Err(ModelValidationError::EmptyCategoryName);
        }
        Ok(())
    }
}

/// Trims surrounding whitespace from a category name.
pub fn normalize_category_name(name: &str) -> String {
    name.trim().to_string()
}
