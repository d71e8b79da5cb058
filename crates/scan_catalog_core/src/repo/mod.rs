//! Repository layer abstractions and SQLite-backed collections.
//!
//! # Responsibility
//! - Define the data access contracts for the category and product collections.
//! - Isolate SQL details from service orchestration.
//! - Translate store-level uniqueness violations into `RepoError::DuplicateKey`.
//!
//! # Invariants
//! - Repository writes call the model `validate()` before persistence.
//! - Repositories never enforce cross-collection references.

pub mod category_repo;
pub mod product_repo;

use crate::db::DbError;
use crate::model::ModelValidationError;
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by catalog collections.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    /// Natural key (category name, product barcode) already taken.
    DuplicateKey(String),
    /// Target record of an update/delete does not exist.
    NotFound(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateKey(key) => write!(f, "duplicate key: {key}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateKey(_) | Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps a unique-constraint failure on insert to `DuplicateKey(key)`.
pub(crate) fn map_insert_error(err: rusqlite::Error, key: &str) -> RepoError {
    if is_unique_violation(&err) {
        return RepoError::DuplicateKey(key.to_string());
    }
    err.into()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || inner.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}
