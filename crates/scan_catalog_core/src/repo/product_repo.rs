//! Product collection contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist scanned products keyed by barcode.
//! - Provide the category count used by the category delete guard.
//!
//! # Invariants
//! - `insert` fails with `DuplicateKey` when the barcode is taken.
//! - `find_many` is ordered newest first, ties broken by insertion order.
//! - `update_category_by_id` bumps `updated_at` and returns the stored row.

use crate::model::now_epoch_ms;
use crate::model::product::{Product, ProductId};
use crate::repo::{map_insert_error, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const PRODUCT_SELECT_SQL: &str = "SELECT
    uuid,
    material,
    barcode,
    description,
    category,
    scanned_at,
    created_at,
    updated_at
FROM products";

/// Filter options for listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category name match.
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn by_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
        }
    }
}

/// Repository interface for the product collection.
pub trait ProductRepository {
    fn find_by_barcode(&self, barcode: &str) -> RepoResult<Option<Product>>;
    fn find_by_id(&self, id: ProductId) -> RepoResult<Option<Product>>;
    fn insert(&self, product: &Product) -> RepoResult<ProductId>;
    /// Matching products, newest first.
    fn find_many(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>>;
    fn count_by_category(&self, category: &str) -> RepoResult<u64>;
    fn update_category_by_id(&self, id: ProductId, category: &str) -> RepoResult<Product>;
}

/// SQLite-backed product collection.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn find_by_barcode(&self, barcode: &str) -> RepoResult<Option<Product>> {
        self.find_one("barcode", barcode.to_string())
    }

    fn find_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.find_one("uuid", id.to_string())
    }

    fn insert(&self, product: &Product) -> RepoResult<ProductId> {
        product.validate()?;

        self.conn
            .execute(
                "INSERT INTO products (
                    uuid,
                    material,
                    barcode,
                    description,
                    category,
                    scanned_at,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    product.id.to_string(),
                    product.material,
                    product.barcode.as_str(),
                    product.description.as_str(),
                    product.category.as_str(),
                    product.scanned_at,
                    product.created_at,
                    product.updated_at,
                ],
            )
            .map_err(|err| map_insert_error(err, &product.barcode))?;

        Ok(product.id)
    }

    fn find_many(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>> {
        let mut sql = format!("{PRODUCT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(category) = &filter.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.clone()));
        }

        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn count_by_category(&self, category: &str) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE category = ?1;",
            [category],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative product count `{count}`")))
    }

    fn update_category_by_id(&self, id: ProductId, category: &str) -> RepoResult<Product> {
        let changed = self.conn.execute(
            "UPDATE products
             SET
                category = ?2,
                updated_at = ?3
             WHERE uuid = ?1;",
            params![id.to_string(), category, now_epoch_ms()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(format!("product `{id}`")));
        }

        self.find_by_id(id)?
            .ok_or_else(|| RepoError::NotFound(format!("product `{id}`")))
    }
}

impl SqliteProductRepository<'_> {
    fn find_one(&self, column: &'static str, value: String) -> RepoResult<Option<Product>> {
        let product = self
            .conn
            .query_row(
                &format!("{PRODUCT_SELECT_SQL} WHERE {column} = ?1;"),
                [value],
                |row| Ok(parse_product_row(row)),
            )
            .optional()?;
        product.transpose()
    }
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in products.uuid"))
    })?;

    Ok(Product {
        id,
        material: row.get("material")?,
        barcode: row.get("barcode")?,
        description: row.get("description")?,
        category: row.get("category")?,
        scanned_at: row.get("scanned_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
