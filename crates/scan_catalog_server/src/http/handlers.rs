//! HTTP request handlers.
//!
//! Each handler extracts the request, runs exactly one catalog operation and
//! renders the `{success: true, ...}` envelope. Failures go through
//! [`ApiError`].

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use scan_catalog_core::{CreateOutcome, NewProduct};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::http::response::ApiError;
use crate::state::AppState;

type ApiResult = Result<(StatusCode, Json<Value>), ApiError>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateCategoryBody {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateProductBody {
    /// Any JSON number or numeric string; anything unparsable counts as missing.
    #[serde(deserialize_with = "lenient_number")]
    pub material: Option<f64>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCategoryBody {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(number)) => Some(number),
        Some(NumberOrText::Text(text)) => text.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(value.filter(|number| number.is_finite()))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "Server is running" }))
}

/// `GET /api/categories` — oldest first, `{name, createdAt}` only.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult {
    let categories = state
        .run("Error fetching categories", |catalog| {
            catalog.categories().list_categories()
        })
        .await?;
    ok(json!({ "success": true, "categories": categories }))
}

/// `POST /api/categories` — 201 when created, 200 when the name exists.
pub async fn create_category(
    State(state): State<AppState>,
    body: Result<Json<CreateCategoryBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body.map_err(ApiError::from_json_rejection)?;
    let name = body.name.unwrap_or_default();

    let outcome = state
        .run("Error creating category", move |catalog| {
            catalog.categories().create_category(&name)
        })
        .await?;

    let (status, message) = match &outcome {
        CreateOutcome::Created(_) => (StatusCode::CREATED, "Category created successfully"),
        CreateOutcome::Existing(_) => (StatusCode::OK, "Category already exists"),
    };
    Ok((
        status,
        Json(json!({
            "success": true,
            "message": message,
            "category": outcome.into_inner().name,
        })),
    ))
}

/// `DELETE /api/categories/:name` — `name` arrives percent-decoded.
pub async fn delete_category(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let Path(name) = name.map_err(ApiError::from_path_rejection)?;
    state
        .run("Error deleting category", move |catalog| {
            catalog.categories().delete_category(&name)
        })
        .await?;
    ok(json!({ "success": true, "message": "Category deleted successfully" }))
}

/// `POST /api/products` — 201 when saved, 200 with the stored row when the
/// barcode is already known.
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<CreateProductBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body.map_err(ApiError::from_json_rejection)?;
    let request = NewProduct {
        material: body.material,
        barcode: body.barcode,
        description: body.description,
        category: body.category,
    };

    let outcome = state
        .run("Error saving product", move |catalog| {
            catalog.products().create_product(request)
        })
        .await?;

    let (status, message) = match &outcome {
        CreateOutcome::Created(_) => (StatusCode::CREATED, "Product saved successfully"),
        CreateOutcome::Existing(_) => (StatusCode::OK, "Product already exists"),
    };
    Ok((
        status,
        Json(json!({
            "success": true,
            "message": message,
            "product": outcome.into_inner(),
        })),
    ))
}

/// `GET /api/products?category=`
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ListProductsQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query.map_err(ApiError::from_query_rejection)?;
    let products = state
        .run("Error fetching products", move |catalog| {
            catalog.products().list_products(query.category.as_deref())
        })
        .await?;
    ok(json!({
        "success": true,
        "count": products.len(),
        "products": products,
    }))
}

/// `GET /api/products/:barcode`
pub async fn get_product(
    State(state): State<AppState>,
    barcode: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let Path(barcode) = barcode.map_err(ApiError::from_path_rejection)?;
    let product = state
        .run("Error fetching product", move |catalog| {
            catalog.products().get_product(&barcode)
        })
        .await?;
    ok(json!({ "success": true, "product": product }))
}

/// `PATCH /api/products/:id/category`
pub async fn update_product_category(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateCategoryBody>, JsonRejection>,
) -> ApiResult {
    let Path(id) = id.map_err(ApiError::from_path_rejection)?;
    let Json(body) = body.map_err(ApiError::from_json_rejection)?;

    let product = state
        .run("Error updating product category", move |catalog| {
            catalog
                .products()
                .update_product_category(&id, body.category.as_deref())
        })
        .await?;
    ok(json!({
        "success": true,
        "message": "Product category updated successfully",
        "product": product,
    }))
}

fn ok(body: Value) -> ApiResult {
    Ok((StatusCode::OK, Json(body)))
}
