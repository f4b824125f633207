//! Envelopes for requests that match no handler.

use axum::extract::OriginalUri;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use canvass_core::Error;

use crate::error::ApiError;

/// Router fallback for paths nothing is mounted on.
pub async fn route_not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError(Error::NotFound(format!("Cannot {method} {}", uri.path())))
}

/// Replaces the bare 405 a method router emits, keeping its `Allow` header.
pub async fn method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut enveloped =
        ApiError(Error::MethodNotAllowed("Method not allowed".to_string())).into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(header::ALLOW, allow);
    }
    enveloped
}
