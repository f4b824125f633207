//! Success envelope: `{message, data, meta?}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use canvass_core::{Page, PageMeta};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

/// An envelope plus the status it is sent with.
#[derive(Debug)]
pub struct Reply<T> {
    status: StatusCode,
    body: ApiResponse<T>,
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn ok<T>(data: T, message: &str) -> Reply<T> {
    Reply {
        status: StatusCode::OK,
        body: ApiResponse {
            message: message.to_string(),
            data,
            meta: None,
        },
    }
}

pub fn created<T>(data: T, message: &str) -> Reply<T> {
    Reply {
        status: StatusCode::CREATED,
        ..ok(data, message)
    }
}

pub fn paginated<T>(page: Page<T>, message: &str) -> Reply<Vec<T>> {
    Reply {
        status: StatusCode::OK,
        body: ApiResponse {
            message: message.to_string(),
            data: page.data,
            meta: Some(page.meta),
        },
    }
}
