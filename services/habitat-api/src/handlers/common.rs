//! Error responses shared by the API handlers.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use habitat_common::HabitatError;
use serde::Serialize;
use tracing::{error, warn};

/// JSON body returned for failed requests, shown as the UI error banner.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// A [`HabitatError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub HabitatError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn code(&self) -> &'static str {
        self.0.error_code()
    }
}

impl From<HabitatError> for ApiError {
    fn from(err: HabitatError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(HabitatError::invalid_parameter("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(HabitatError::invalid_parameter("query", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, code = self.code(), "Request failed");
        } else {
            warn!(error = %self.0, code = self.code(), "Rejected request");
        }

        let body = ErrorBody {
            error: self.code(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
