use rusqlite::Connection;
use scan_catalog_core::db::migrations::latest_version;
use scan_catalog_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_object_exists(&conn, "table", "categories");
    assert_object_exists(&conn, "table", "products");
    assert_object_exists(&conn, "index", "idx_products_category");
    assert_object_exists(&conn, "index", "idx_products_created_at");
}

#[test]
fn opening_same_database_twice_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO categories (name, created_at, updated_at) VALUES ('Tools', 1, 1);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM categories;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn barcode_and_category_name_are_unique_in_store() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO categories (name, created_at, updated_at) VALUES ('A', 1, 1);",
        [],
    )
    .unwrap();
    assert!(conn
        .execute(
            "INSERT INTO categories (name, created_at, updated_at) VALUES ('A', 2, 2);",
            [],
        )
        .is_err());

    let insert_product = "INSERT INTO products \
        (uuid, material, barcode, description, category, scanned_at, created_at, updated_at) \
        VALUES (?1, 12.5, '0001', 'd', 'A', 1, 1, 1);";
    conn.execute(insert_product, ["p1"]).unwrap();
    assert!(conn.execute(insert_product, ["p2"]).is_err());

    let material: f64 = conn
        .query_row("SELECT material FROM products WHERE uuid = 'p1';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(material, 12.5);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
