//! Error envelope and status-code mapping.
//!
//! Every failure renders as `{"success": false, "message": ..}` plus `error`
//! (500s and extractor rejections) or `productCount` (blocked category delete).

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use scan_catalog_core::ServiceError;
use serde_json::{json, Map, Value};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    error: Option<String>,
    product_count: Option<u64>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            error: None,
            product_count: None,
        }
    }

    pub fn internal(context: &str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!(
            "event=request_failed module=http status=error context=\"{context}\" error={detail}"
        );
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: context.to_string(),
            error: Some(detail),
            product_count: None,
        }
    }

    /// Maps the service taxonomy onto HTTP.
    ///
    /// `Forbidden` and `Conflict` are client errors (400), not 403/409.
    pub fn from_service(err: ServiceError, context: &str) -> Self {
        let rendered = err.to_string();
        match err {
            ServiceError::InvalidArgument(message) | ServiceError::Forbidden(message) => {
                Self::bad_request(message)
            }
            ServiceError::NotFound(message) => Self {
                status: StatusCode::NOT_FOUND,
                message,
                error: None,
                product_count: None,
            },
            ServiceError::Conflict { product_count, .. } => Self {
                product_count: Some(product_count),
                ..Self::bad_request(rendered)
            },
            ServiceError::Store(inner) => Self::internal(context, inner.to_string()),
        }
    }

    pub fn from_json_rejection(rejection: JsonRejection) -> Self {
        Self {
            error: Some(rejection.body_text()),
            ..Self::bad_request("Invalid JSON body")
        }
    }

    pub fn from_path_rejection(rejection: PathRejection) -> Self {
        Self {
            error: Some(rejection.body_text()),
            ..Self::bad_request("Invalid path parameter")
        }
    }

    pub fn from_query_rejection(rejection: QueryRejection) -> Self {
        Self {
            error: Some(rejection.body_text()),
            ..Self::bad_request("Invalid query string")
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("message".to_string(), Value::String(self.message));
        if let Some(error) = self.error {
            body.insert("error".to_string(), Value::String(error));
        }
        if let Some(count) = self.product_count {
            body.insert("productCount".to_string(), json!(count));
        }
        (self.status, Json(Value::Object(body))).into_response()
    }
}
