//! Router assembly and cross-cutting middleware.

pub mod handlers;
pub mod response;

use crate::state::AppState;
use axum::extract::Request;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch};
use axum::Router;

/// Mount point of the catalog API.
pub const API_PREFIX: &str = "/api";

pub fn build_router(state: AppState) -> Router {
    // Both product routes share the `:key` segment name: barcode for GET,
    // store id for PATCH.
    let api = Router::new()
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/:name", delete(handlers::delete_category))
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/:key", get(handlers::get_product))
        .route(
            "/products/:key/category",
            patch(handlers::update_product_category),
        );

    Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(handlers::health))
        .layer(from_fn(cors_middleware))
        .with_state(state)
}

/// Permissive CORS: any origin, method and header. Preflights end here.
async fn cors_middleware(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        allow_any_origin(resp.headers_mut());
        return resp;
    }

    let mut resp = next.run(req).await;
    allow_any_origin(resp.headers_mut());
    resp
}

fn allow_any_origin(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,HEAD,PUT,PATCH,POST,DELETE"),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
}
