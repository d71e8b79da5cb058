//! Product use-case service.
//!
//! # Responsibility
//! - Register scanned products idempotently by barcode.
//! - List, look up and recategorize products.
//! - Auto-create any category a product is filed under before writing it.
//!
//! # Invariants
//! - A second create with a known barcode returns the stored row unchanged.
//! - Product writes happen only after the target category exists.

use crate::model::category::normalize_category_name;
use crate::model::product::{Product, ProductId};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::product_repo::{ProductFilter, ProductRepository};
use crate::repo::RepoError;
use crate::service::{ensure_category_exists, CreateOutcome, ServiceError, ServiceResult};
use log::{debug, info};

/// Input of a product scan registration.
///
/// Fields are optional so adapters can pass through whatever the client sent;
/// the service decides what counts as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProduct {
    pub material: Option<f64>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Product service over the product and category collections.
pub struct ProductService<P: ProductRepository, C: CategoryRepository> {
    products: P,
    categories: C,
}

impl<P: ProductRepository, C: CategoryRepository> ProductService<P, C> {
    pub fn new(products: P, categories: C) -> Self {
        Self {
            products,
            categories,
        }
    }

    /// Registers a scanned product.
    ///
    /// # Contract
    /// - `material` (non-zero), `barcode` and `description` (non-empty) are required.
    /// - Known barcode -> `Existing` with the stored row; nothing is written.
    /// - Missing/blank category -> `Uncategorized`; unknown category is created.
    pub fn create_product(&self, request: NewProduct) -> ServiceResult<CreateOutcome<Product>> {
        let (material, barcode, description) = match (
            request.material.filter(|value| *value != 0.0 && value.is_finite()),
            request.barcode.filter(|value| !value.is_empty()),
            request.description.filter(|value| !value.is_empty()),
        ) {
            (Some(material), Some(barcode), Some(description)) => (material, barcode, description),
            _ => {
                return Err(ServiceError::InvalidArgument(
                    "Material, barcode, and description are required".to_string(),
                ));
            }
        };

        if let Some(existing) = self.products.find_by_barcode(&barcode)? {
            debug!("event=product_create module=service status=ok created=false barcode={barcode}");
            return Ok(CreateOutcome::Existing(existing));
        }

        let product = Product::new(
            material,
            barcode,
            description,
            request.category.as_deref(),
        );
        ensure_category_exists(&self.categories, &product.category)?;

        match self.products.insert(&product) {
            Ok(_) => {
                info!(
                    "event=product_create module=service status=ok created=true barcode={} category={}",
                    product.barcode, product.category
                );
                Ok(CreateOutcome::Created(product))
            }
            Err(RepoError::DuplicateKey(_)) => {
                let existing = self
                    .products
                    .find_by_barcode(&product.barcode)?
                    .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;
                debug!(
                    "event=product_create module=service status=ok created=false race=true barcode={}",
                    product.barcode
                );
                Ok(CreateOutcome::Existing(existing))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Lists products newest first, optionally limited to one category.
    ///
    /// An empty category filter means "all products".
    pub fn list_products(&self, category: Option<&str>) -> ServiceResult<Vec<Product>> {
        let filter = match category.filter(|value| !value.is_empty()) {
            Some(category) => ProductFilter::by_category(category),
            None => ProductFilter::default(),
        };
        let products = self.products.find_many(&filter)?;
        debug!(
            "event=product_list module=service status=ok count={} filtered={}",
            products.len(),
            filter.category.is_some()
        );
        Ok(products)
    }

    /// Gets one product by exact barcode.
    pub fn get_product(&self, barcode: &str) -> ServiceResult<Product> {
        self.products
            .find_by_barcode(barcode)?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    /// Moves a product to another category, creating the category if needed.
    ///
    /// The category is ensured before the product id is resolved, so an
    /// unknown id still leaves the requested category behind.
    ///
    /// # Errors
    /// - `InvalidArgument` when `category` is missing or blank.
    /// - `NotFound` when `id` is malformed or names no product.
    pub fn update_product_category(
        &self,
        id: &str,
        category: Option<&str>,
    ) -> ServiceResult<Product> {
        let category = category
            .map(normalize_category_name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ServiceError::InvalidArgument("Category is required".to_string()))?;

        ensure_category_exists(&self.categories, &category)?;

        let product_id = parse_product_id(id)?;
        match self.products.update_category_by_id(product_id, &category) {
            Ok(product) => {
                info!(
                    "event=product_recategorize module=service status=ok id={product_id} category={category}"
                );
                Ok(product)
            }
            Err(RepoError::NotFound(_)) => {
                Err(ServiceError::NotFound("Product not found".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn parse_product_id(id: &str) -> ServiceResult<ProductId> {
    ProductId::parse_str(id.trim())
        .map_err(|_| ServiceError::NotFound("Product not found".to_string()))
}
