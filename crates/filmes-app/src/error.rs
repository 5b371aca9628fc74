use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use filmes_dal::{movie::validation_errors, patch::PatchError};
use http::StatusCode;
use serde::Serialize;
use tracing::{debug, error};

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] garde::Report),
    #[error("Malformed patch: {0}")]
    MalformedPatch(String),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Database error: {0}")]
    DatabaseError(filmes_dal::Error),
    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl From<filmes_dal::Error> for ApiError {
    fn from(value: filmes_dal::Error) -> Self {
        match value {
            filmes_dal::Error::RecordNotFound { .. } => ApiError::NotFound,
            filmes_dal::Error::ConstraintViolation(msg) => ApiError::InvalidRequest(msg),
            filmes_dal::Error::InvalidOrderByField(field) => {
                ApiError::InvalidQuery(format!("Cannot sort by {field}"))
            }
            other => ApiError::DatabaseError(other),
        }
    }
}

impl From<PatchError> for ApiError {
    fn from(value: PatchError) -> Self {
        match value {
            PatchError::Malformed(msg) => ApiError::MalformedPatch(msg),
            PatchError::ValidationFailed(report) => ApiError::ValidationFailed(report),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::InvalidRequest(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        ApiError::InvalidQuery(value.body_text())
    }
}

/// Error body, loosely following RFC 7807 problem details
#[derive(Debug, Serialize)]
struct Problem {
    title: &'static str,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl Problem {
    fn new(status: StatusCode, title: &'static str) -> Self {
        Problem {
            title,
            status: status.as_u16(),
            detail: None,
            errors: None,
        }
    }

    fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            ApiError::ValidationFailed(_)
            | ApiError::MalformedPatch(_)
            | ApiError::InvalidQuery(_)
            | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DatabaseError(_) | ApiError::UrlError(_) => {
                error!("Request failed: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        debug!("Request rejected: {self}");

        let problem = match self {
            ApiError::ValidationFailed(report) => Problem {
                errors: Some(validation_errors(&report)),
                ..Problem::new(status, "One or more validation errors occurred.")
            },
            ApiError::MalformedPatch(msg) => {
                Problem::new(status, "Malformed patch document").with_detail(msg)
            }
            ApiError::InvalidQuery(msg) => Problem::new(status, "Invalid query").with_detail(msg),
            ApiError::InvalidRequest(msg) => {
                Problem::new(status, "Invalid request").with_detail(msg)
            }
            _ => Problem::new(status, "Internal server error"),
        };

        (status, Json(problem)).into_response()
    }
}
