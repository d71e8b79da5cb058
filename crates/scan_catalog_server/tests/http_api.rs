use scan_catalog_core::db::{open_db, open_db_in_memory};
use scan_catalog_server::{build_router, AppState};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn spawn_app(state: AppState) -> SocketAddr {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn spawn_in_memory() -> SocketAddr {
    let conn = open_db_in_memory().expect("open store");
    spawn_app(AppState::bootstrap(conn).expect("bootstrap")).await
}

async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(body) = body {
        req.push_str(&format!(
            "Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        ));
    } else {
        req.push_str("\r\n");
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    (status, head.to_string(), body.to_string())
}

async fn call(addr: SocketAddr, method: &str, path: &str, body: Option<Value>) -> (u16, Value) {
    let body = body.map(|value| value.to_string());
    let (status, _, raw) = send_raw(addr, method, path, body.as_deref()).await;
    let json = serde_json::from_str(&raw).unwrap_or_else(|_| panic!("json body, got {raw:?}"));
    (status, json)
}

fn category_names(body: &Value) -> Vec<String> {
    body["categories"]
        .as_array()
        .expect("categories array")
        .iter()
        .map(|c| c["name"].as_str().expect("name").to_string())
        .collect()
}

fn scan(barcode: &str, category: Option<&str>) -> Value {
    let mut body = json!({
        "material": 120034,
        "barcode": barcode,
        "description": format!("item {barcode}"),
    });
    if let Some(category) = category {
        body["category"] = json!(category);
    }
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let addr = spawn_in_memory().await;
    let (status, body) = call(addr, "GET", "/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn bootstrap_category_is_listed_and_protected() {
    let addr = spawn_in_memory().await;

    let (status, body) = call(addr, "GET", "/api/categories", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(category_names(&body), vec!["Uncategorized"]);
    assert!(body["categories"][0]["createdAt"].is_string());

    let (status, body) = call(addr, "DELETE", "/api/categories/Uncategorized", None).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn create_category_returns_201_then_200() {
    let addr = spawn_in_memory().await;

    let (status, body) =
        call(addr, "POST", "/api/categories", Some(json!({"name": "  Power Tools "}))).await;
    assert_eq!(status, 201);
    assert_eq!(body["category"], "Power Tools");

    let (status, body) =
        call(addr, "POST", "/api/categories", Some(json!({"name": "Power Tools"}))).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Category already exists");

    let (status, body) = call(addr, "POST", "/api/categories", Some(json!({"name": " "}))).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let (_, body) = call(addr, "GET", "/api/categories", None).await;
    assert_eq!(category_names(&body), vec!["Uncategorized", "Power Tools"]);
}

#[tokio::test]
async fn delete_category_decodes_name_and_guards_products() {
    let addr = spawn_in_memory().await;

    let (status, _) = call(addr, "DELETE", "/api/categories/No%20Such", None).await;
    assert_eq!(status, 404);

    let (status, created) =
        call(addr, "POST", "/api/products", Some(scan("111", Some("Hand Tools")))).await;
    assert_eq!(status, 201);
    call(addr, "POST", "/api/products", Some(scan("222", Some("Hand Tools")))).await;

    let (status, body) = call(addr, "DELETE", "/api/categories/Hand%20Tools", None).await;
    assert_eq!(status, 400);
    assert_eq!(body["productCount"], 2);

    let (_, listed) = call(addr, "GET", "/api/products?category=Hand%20Tools", None).await;
    for product in listed["products"].as_array().expect("products") {
        let id = product["_id"].as_str().expect("id");
        let (status, _) = call(
            addr,
            "PATCH",
            &format!("/api/products/{id}/category"),
            Some(json!({"category": "Uncategorized"})),
        )
        .await;
        assert_eq!(status, 200);
    }
    assert!(created["product"]["_id"].is_string());

    let (status, body) = call(addr, "DELETE", "/api/categories/Hand%20Tools", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn create_product_is_idempotent_by_barcode() {
    let addr = spawn_in_memory().await;

    let (status, first) =
        call(addr, "POST", "/api/products", Some(scan("4006381333931", None))).await;
    assert_eq!(status, 201);
    assert_eq!(first["product"]["category"], "Uncategorized");
    assert_eq!(first["product"]["material"], 120034);

    let mut changed = scan("4006381333931", Some("Elsewhere"));
    changed["description"] = json!("changed");
    let (status, second) = call(addr, "POST", "/api/products", Some(changed)).await;
    assert_eq!(status, 200);
    assert_eq!(second["message"], "Product already exists");
    assert_eq!(second["product"], first["product"]);

    let (_, listed) = call(addr, "GET", "/api/products", None).await;
    assert_eq!(listed["count"], 1);
}

#[tokio::test]
async fn create_product_autocreates_category() {
    let addr = spawn_in_memory().await;

    let (status, body) =
        call(addr, "POST", "/api/products", Some(scan("900", Some("NewCat")))).await;
    assert_eq!(status, 201);
    assert_eq!(body["product"]["category"], "NewCat");

    let (_, categories) = call(addr, "GET", "/api/categories", None).await;
    assert_eq!(category_names(&categories), vec!["Uncategorized", "NewCat"]);
}

#[tokio::test]
async fn create_product_validation_writes_nothing() {
    let addr = spawn_in_memory().await;

    let (status, body) = call(
        addr,
        "POST",
        "/api/products",
        Some(json!({"material": 5, "description": "no barcode"})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let zero_material = json!({"material": 0, "barcode": "1", "description": "d"});
    let (status, _) = call(addr, "POST", "/api/products", Some(zero_material)).await;
    assert_eq!(status, 400);

    let (status, _, _) = send_raw(addr, "POST", "/api/products", Some("{not json")).await;
    assert_eq!(status, 400);

    let (_, listed) = call(addr, "GET", "/api/products", None).await;
    assert_eq!(listed["count"], 0);
}

#[tokio::test]
async fn create_product_accepts_fractional_and_numeric_text_material() {
    let addr = spawn_in_memory().await;

    let fractional = json!({"material": 12.5, "barcode": "f1", "description": "d"});
    let (status, body) = call(addr, "POST", "/api/products", Some(fractional)).await;
    assert_eq!(status, 201);
    assert_eq!(body["product"]["material"], 12.5);

    let text = json!({"material": "123", "barcode": "t1", "description": "d"});
    let (status, body) = call(addr, "POST", "/api/products", Some(text)).await;
    assert_eq!(status, 201);
    assert_eq!(body["product"]["material"], 123);

    for material in [json!("0"), json!("abc"), json!("")] {
        let bad = json!({"material": material, "barcode": "t2", "description": "d"});
        let (status, body) = call(addr, "POST", "/api/products", Some(bad)).await;
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
    }

    let (_, listed) = call(addr, "GET", "/api/products", None).await;
    assert_eq!(listed["count"], 2);
}

#[tokio::test]
async fn list_products_filters_newest_first() {
    let addr = spawn_in_memory().await;
    for (barcode, category) in [("a1", "A"), ("b1", "B"), ("a2", "A")] {
        call(addr, "POST", "/api/products", Some(scan(barcode, Some(category)))).await;
    }

    let (status, body) = call(addr, "GET", "/api/products?category=A", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 2);
    let barcodes = body["products"]
        .as_array()
        .expect("products")
        .iter()
        .map(|p| p["barcode"].as_str().expect("barcode").to_string())
        .collect::<Vec<_>>();
    assert_eq!(barcodes, vec!["a2", "a1"]);

    let (_, all) = call(addr, "GET", "/api/products", None).await;
    assert_eq!(all["count"], 3);
}

#[tokio::test]
async fn get_product_by_barcode() {
    let addr = spawn_in_memory().await;
    call(addr, "POST", "/api/products", Some(scan("321", None))).await;

    let (status, body) = call(addr, "GET", "/api/products/321", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["product"]["barcode"], "321");

    let (status, body) = call(addr, "GET", "/api/products/322", None).await;
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_path_and_query_return_json_errors() {
    let addr = spawn_in_memory().await;

    let (status, body) = call(addr, "DELETE", "/api/categories/%FF", None).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid path parameter");
    assert!(body["error"].is_string());

    let (status, body) = call(addr, "GET", "/api/products/%FF", None).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let (status, body) = call(addr, "GET", "/api/products?category=A&category=B", None).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid query string");
    assert!(body["error"].is_string());

    let (_, categories) = call(addr, "GET", "/api/categories", None).await;
    assert_eq!(category_names(&categories), vec!["Uncategorized"]);
}

#[tokio::test]
async fn update_product_category_errors() {
    let addr = spawn_in_memory().await;
    let (_, created) = call(addr, "POST", "/api/products", Some(scan("55", None))).await;
    let id = created["product"]["_id"].as_str().expect("id").to_string();

    let path = format!("/api/products/{id}/category");
    let (status, _) = call(addr, "PATCH", &path, Some(json!({}))).await;
    assert_eq!(status, 400);

    let missing = "00000000-0000-4000-8000-000000000000";
    let (status, _) = call(
        addr,
        "PATCH",
        &format!("/api/products/{missing}/category"),
        Some(json!({"category": "Moved"})),
    )
    .await;
    assert_eq!(status, 404);

    let (status, body) = call(
        addr,
        "PATCH",
        &format!("/api/products/{id}/category"),
        Some(json!({"category": "Moved"})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["product"]["category"], "Moved");
    assert_eq!(body["product"]["_id"], id.as_str());
}

#[tokio::test]
async fn preflight_and_responses_allow_any_origin() {
    let addr = spawn_in_memory().await;

    let (status, head, _) = send_raw(addr, "OPTIONS", "/api/products", None).await;
    assert_eq!(status, 204);
    assert!(head.to_ascii_lowercase().contains("access-control-allow-origin: *"));

    let (_, head, _) = send_raw(addr, "GET", "/api/categories", None).await;
    assert!(head.to_ascii_lowercase().contains("access-control-allow-origin: *"));
}

#[tokio::test]
async fn file_backed_store_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("catalog.sqlite3");

    let first = AppState::bootstrap(open_db(&path).expect("open")).expect("bootstrap");
    let addr = spawn_app(first).await;
    call(addr, "POST", "/api/products", Some(scan("777", Some("Kept")))).await;

    let second = AppState::bootstrap(open_db(&path).expect("reopen")).expect("bootstrap");
    let addr = spawn_app(second).await;
    let (_, categories) = call(addr, "GET", "/api/categories", None).await;
    assert_eq!(category_names(&categories), vec!["Uncategorized", "Kept"]);
    let (status, _) = call(addr, "GET", "/api/products/777", None).await;
    assert_eq!(status, 200);
}
