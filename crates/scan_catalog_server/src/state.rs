//! Shared application state.
//!
//! The catalog store is the only shared resource: one SQLite connection behind
//! a mutex. Each request borrows it for exactly one service call on the
//! blocking pool.

use crate::http::response::ApiError;
use rusqlite::Connection;
use scan_catalog_core::{
    CategoryRepository, CategoryService, ProductService, RepoResult, ServiceResult,
    SqliteCategoryRepository, SqliteProductRepository,
};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Connection>>,
}

/// Request-scoped view over the store handing out services.
pub struct Catalog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Catalog<'conn> {
    pub fn categories(
        &self,
    ) -> CategoryService<SqliteCategoryRepository<'conn>, SqliteProductRepository<'conn>> {
        CategoryService::new(
            SqliteCategoryRepository::new(self.conn),
            SqliteProductRepository::new(self.conn),
        )
    }

    pub fn products(
        &self,
    ) -> ProductService<SqliteProductRepository<'conn>, SqliteCategoryRepository<'conn>> {
        ProductService::new(
            SqliteProductRepository::new(self.conn),
            SqliteCategoryRepository::new(self.conn),
        )
    }
}

impl AppState {
    /// Wraps a migrated connection after guaranteeing the bootstrap category.
    pub fn bootstrap(conn: Connection) -> RepoResult<Self> {
        SqliteCategoryRepository::new(&conn).ensure_bootstrap()?;
        Ok(Self {
            store: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs one catalog operation against the store.
    ///
    /// `context` becomes the `message` of a 500 response. A lock poisoned by a
    /// panicking request is recovered; each operation leaves the connection
    /// consistent on its own.
    pub async fn run<T, F>(&self, context: &'static str, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Catalog<'_>) -> ServiceResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || {
            let conn = store.lock().unwrap_or_else(PoisonError::into_inner);
            op(&Catalog { conn: &conn }).map_err(|err| ApiError::from_service(err, context))
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(err) => Err(ApiError::internal(context, err.to_string())),
        }
    }
}
