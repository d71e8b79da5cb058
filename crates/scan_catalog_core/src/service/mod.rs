//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into catalog use-cases.
//! - Keep the product -> category reference valid by auto-creating categories
//!   before any product write that names them.
//! - Convert natural-key collisions into "already exists" outcomes.
//!
//! # Invariants
//! - `RepoError::DuplicateKey` never escapes a create use-case.
//! - Services stay storage-agnostic; they only see repository traits.
//!
//! # Accepted race
//! Ensuring a category and writing the product are separate store calls. A
//! category deleted in between leaves the product pointing at a missing
//! category until it is reassigned.

pub mod category_service;
pub mod product_service;

use crate::repo::category_repo::CategoryRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error taxonomy surfaced to adapters.
#[derive(Debug)]
pub enum ServiceError {
    /// Required input missing or empty.
    InvalidArgument(String),
    /// Referenced entity absent.
    NotFound(String),
    /// Operation would break a protected invariant.
    Forbidden(String),
    /// Deletion blocked by dependent products.
    Conflict { category: String, product_count: u64 },
    /// Unexpected store failure.
    Store(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) | Self::NotFound(message) | Self::Forbidden(message) => {
                write!(f, "{message}")
            }
            Self::Conflict { product_count, .. } => write!(
                f,
                "Cannot delete category with {product_count} product(s). Move all products first."
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result of an idempotent create keyed on a natural identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome<T> {
    /// A new row was written.
    Created(T),
    /// The key was already taken; carries the stored row unchanged.
    Existing(T),
}

impl<T> CreateOutcome<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Self::Created(value) | Self::Existing(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Created(value) | Self::Existing(value) => value,
        }
    }
}

/// Creates `name` in the category collection unless it already exists.
///
/// Returns whether this call inserted the row. A duplicate-key failure from a
/// concurrent writer counts as "already exists".
pub(crate) fn ensure_category_exists<C: CategoryRepository>(
    categories: &C,
    name: &str,
) -> RepoResult<bool> {
    if categories.find_by_name(name)?.is_some() {
        return Ok(false);
    }
    match categories.create(name) {
        Ok(category) => {
            info!(
                "event=category_autocreate module=service status=ok name={}",
                category.name
            );
            Ok(true)
        }
        Err(RepoError::DuplicateKey(_)) => Ok(false),
        Err(err) => Err(err),
    }
}
