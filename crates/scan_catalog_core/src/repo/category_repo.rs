//! Category collection contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist category names with their creation time.
//! - Guarantee the bootstrap category exists (`ensure_bootstrap`).
//!
//! # Invariants
//! - `list_all` is ordered oldest first, ties broken by insertion order.
//! - `create` fails with `DuplicateKey` when the name is taken.

use crate::model::category::{Category, BOOTSTRAP_CATEGORY};
use crate::model::now_epoch_ms;
use crate::repo::{map_insert_error, RepoError, RepoResult};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT name, created_at FROM categories";

/// Repository interface for the category collection.
pub trait CategoryRepository {
    /// All categories, oldest first.
    fn list_all(&self) -> RepoResult<Vec<Category>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>>;
    /// Inserts a new category; the name is trimmed before persistence.
    fn create(&self, name: &str) -> RepoResult<Category>;
    /// Removes a category; `NotFound` when no row matched.
    fn delete_by_name(&self, name: &str) -> RepoResult<()>;

    /// Idempotently guarantees the bootstrap category row exists.
    ///
    /// Check-then-create; a concurrent writer winning the insert surfaces as
    /// `DuplicateKey`, which counts as success.
    fn ensure_bootstrap(&self) -> RepoResult<()> {
        if self.find_by_name(BOOTSTRAP_CATEGORY)?.is_some() {
            debug!("event=category_bootstrap module=repo status=ok created=false");
            return Ok(());
        }
        match self.create(BOOTSTRAP_CATEGORY) {
            Ok(_) => {
                info!("event=category_bootstrap module=repo status=ok created=true");
                Ok(())
            }
            Err(RepoError::DuplicateKey(_)) => {
                debug!("event=category_bootstrap module=repo status=ok created=false race=true");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// SQLite-backed category collection.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn list_all(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                &format!("{CATEGORY_SELECT_SQL} WHERE name = ?1;"),
                [name],
                |row| Ok(parse_category_row(row)),
            )
            .optional()?;
        category.transpose()
    }

    fn create(&self, name: &str) -> RepoResult<Category> {
        let category = Category::new(name);
        category.validate()?;

        self.conn
            .execute(
                "INSERT INTO categories (name, created_at, updated_at) VALUES (?1, ?2, ?3);",
                params![category.name, category.created_at, now_epoch_ms()],
            )
            .map_err(|err| map_insert_error(err, &category.name))?;

        Ok(category)
    }

    fn delete_by_name(&self, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE name = ?1;", [name])?;
        if changed == 0 {
            return Err(RepoError::NotFound(format!("category `{name}`")));
        }
        Ok(())
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let category = Category {
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    };
    category.validate().map_err(|err| {
        RepoError::InvalidData(format!("{err} in categories.name"))
    })?;
    Ok(category)
}
