//! Category use-case service.
//!
//! # Responsibility
//! - List, create and delete categories.
//! - Guard deletion: the bootstrap category is permanent and categories still
//!   referenced by products are kept.
//!
//! # Invariants
//! - Create is idempotent on the trimmed name.
//! - Delete never cascades to products.

use crate::model::category::{normalize_category_name, Category, BOOTSTRAP_CATEGORY};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::product_repo::ProductRepository;
use crate::repo::RepoError;
use crate::service::{CreateOutcome, ServiceError, ServiceResult};
use log::{debug, info, warn};

/// Category service over the category and product collections.
pub struct CategoryService<C: CategoryRepository, P: ProductRepository> {
    categories: C,
    products: P,
}

impl<C: CategoryRepository, P: ProductRepository> CategoryService<C, P> {
    pub fn new(categories: C, products: P) -> Self {
        Self {
            categories,
            products,
        }
    }

    /// Lists all categories, oldest first.
    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        let categories = self.categories.list_all()?;
        debug!(
            "event=category_list module=service status=ok count={}",
            categories.len()
        );
        Ok(categories)
    }

    /// Creates a category by trimmed name.
    ///
    /// # Errors
    /// - `InvalidArgument` when the name is empty after trimming.
    pub fn create_category(&self, name: &str) -> ServiceResult<CreateOutcome<Category>> {
        let name = normalize_category_name(name);
        if name.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "Category name is required".to_string(),
            ));
        }

        if let Some(existing) = self.categories.find_by_name(&name)? {
            debug!("event=category_create module=service status=ok created=false name={name}");
            return Ok(CreateOutcome::Existing(existing));
        }

        match self.categories.create(&name) {
            Ok(created) => {
                info!("event=category_create module=service status=ok created=true name={name}");
                Ok(CreateOutcome::Created(created))
            }
            Err(RepoError::DuplicateKey(_)) => {
                let existing = self.categories.find_by_name(&name)?.ok_or_else(|| {
                    ServiceError::NotFound("Category not found".to_string())
                })?;
                debug!(
                    "event=category_create module=service status=ok created=false race=true name={name}"
                );
                Ok(CreateOutcome::Existing(existing))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes a category that no product references.
    ///
    /// `name` is matched verbatim.
    ///
    /// # Errors
    /// - `Forbidden` for the bootstrap category.
    /// - `NotFound` when no such category exists.
    /// - `Conflict` carrying the product count while products reference it.
    pub fn delete_category(&self, name: &str) -> ServiceResult<()> {
        if name == BOOTSTRAP_CATEGORY {
            warn!("event=category_delete module=service status=rejected reason=bootstrap");
            return Err(ServiceError::Forbidden(format!(
                "Cannot delete {BOOTSTRAP_CATEGORY} category"
            )));
        }

        if self.categories.find_by_name(name)?.is_none() {
            return Err(ServiceError::NotFound("Category not found".to_string()));
        }

        let product_count = self.products.count_by_category(name)?;
        if product_count > 0 {
            warn!(
                "event=category_delete module=service status=rejected reason=not_empty name={name} product_count={product_count}"
            );
            return Err(ServiceError::Conflict {
                category: name.to_string(),
                product_count,
            });
        }

        match self.categories.delete_by_name(name) {
            Ok(()) => {}
            Err(RepoError::NotFound(_)) => {
                return Err(ServiceError::NotFound("Category not found".to_string()));
            }
            Err(err) => return Err(err.into()),
        }
        info!("event=category_delete module=service status=ok name={name}");
        Ok(())
    }
}
