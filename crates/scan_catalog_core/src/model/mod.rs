//! Catalog domain model for categories and scanned products.
//!
//! # Responsibility
//! - Define canonical records shared by repositories, services and adapters.
//! - Own wire-level serialization of timestamps.
//!
//! # Invariants
//! - Categories are identified by their trimmed name.
//! - Products are identified by barcode (natural key) and a stable `ProductId`.
//! - Timestamps are epoch milliseconds in UTC.

pub mod category;
pub mod product;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures raised before any store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Category name is empty after trimming.
    EmptyCategoryName,
    /// Product material is missing, zero or not a finite number.
    MissingMaterial,
    /// Product barcode is empty.
    EmptyBarcode,
    /// Product description is empty.
    EmptyDescription,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCategoryName => write!(f, "category name cannot be empty"),
            Self::MissingMaterial => write!(f, "product material is required"),
            Self::EmptyBarcode => write!(f, "product barcode cannot be empty"),
            Self::EmptyDescription => write!(f, "product description cannot be empty"),
        }
    }
}

impl Error for ModelValidationError {}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Formats epoch milliseconds as an RFC 3339 UTC string (`...T..:..:..000Z`).
///
/// Out-of-range values fall back to the Unix epoch.
pub fn format_epoch_ms(value: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(value)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn serialize_epoch_ms<S: Serializer>(
    value: &i64,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_epoch_ms(*value))
}

/// Writes whole numbers as JSON integers and everything else as floats.
pub(crate) fn serialize_number<S: Serializer>(
    value: &f64,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        return serializer.serialize_i64(*value as i64);
    }
    serializer.serialize_f64(*value)
}
