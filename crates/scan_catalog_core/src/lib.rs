//! Core domain logic for the scanned-product catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::category::{Category, BOOTSTRAP_CATEGORY};
pub use model::product::{Product, ProductId};
pub use model::ModelValidationError;
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::product_repo::{ProductFilter, ProductRepository, SqliteProductRepository};
pub use repo::{RepoError, RepoResult};
pub use service::category_service::CategoryService;
pub use service::product_service::{NewProduct, ProductService};
pub use service::{CreateOutcome, ServiceError, ServiceResult};
