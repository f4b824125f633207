//! Error → HTTP translation.
//!
//! Every failure leaves the API as `{message, data: null, errors?}`. This is the
//! only place a [`canvass_core::Error`] becomes a status code.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use canvass_core::Error;
use serde::Serialize;

const INTERNAL: &str = "Internal server error";

#[derive(Debug)]
pub struct ApiError(pub Error);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    data: Option<()>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::invalid(vec![rejection.body_text()]))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::invalid(vec![rejection.body_text()]))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::Validation { .. } | Error::Upstream(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Storage(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self.0 {
            Error::Validation { message, errors } => (message, Some(errors)),
            Error::NotFound(m)
            | Error::MethodNotAllowed(m)
            | Error::Unauthorized(m)
            | Error::Conflict(m)
            | Error::Upstream(m) => (m, None),
            e @ (Error::Storage(_) | Error::Internal(_)) => {
                tracing::error!(error = %e, "request failed");
                (INTERNAL.to_string(), None)
            }
        };

        let body = ErrorBody {
            message,
            data: None,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        let cases = [
            (Error::survey_not_found("x"), StatusCode::NOT_FOUND),
            (Error::MethodNotAllowed("no".into()), StatusCode::METHOD_NOT_ALLOWED),
            (Error::invalid(vec!["title should not be empty".into()]), StatusCode::BAD_REQUEST),
            (Error::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (Error::Conflict("dup".into()), StatusCode::CONFLICT),
            (Error::Upstream("later".into()), StatusCode::BAD_REQUEST),
            (Error::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError(error).status(), status);
        }
    }

    #[tokio::test]
    async fn storage_detail_is_not_leaked() {
        let response =
            ApiError(Error::Storage("connection refused at 10.0.0.3".into())).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], INTERNAL);
        assert!(body["data"].is_null());
        assert!(body.get("errors").is_none());
    }
}
