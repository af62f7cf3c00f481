use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use models::ModelError;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// HTTP-facing error. The client sees `{"error": title}`; `detail` is only logged.
#[derive(Debug, Error)]
#[error("{status}: {title}")]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, title: title.into(), detail }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found", None)
    }

    fn internal(detail: String) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(detail))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotJson => Self::new(StatusCode::BAD_REQUEST, e.to_string(), None),
            ServiceError::MissingField(_) | ServiceError::Validation(_) => {
                Self::new(StatusCode::BAD_REQUEST, e.to_string(), None)
            }
            ServiceError::Model(ModelError::InvalidField(field)) => {
                Self::new(StatusCode::BAD_REQUEST, format!("Invalid {field}"), None)
            }
            ServiceError::NotFound(what) => {
                Self::new(StatusCode::NOT_FOUND, "Not found", Some(what))
            }
            ServiceError::Model(ModelError::UnknownClass(_))
            | ServiceError::Hash(_)
            | ServiceError::Storage(_) => Self::internal(e.to_string()),
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = ?self.detail, "request failed");
        }
        (self.status, Json(ErrorBody { error: self.title })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn service_errors_map_to_client_messages() {
        let cases = [
            (ServiceError::NotJson, StatusCode::BAD_REQUEST, "Not a JSON"),
            (ServiceError::MissingField("email".into()), StatusCode::BAD_REQUEST, "Missing email"),
            (ServiceError::Validation("states".into()), StatusCode::BAD_REQUEST, "Invalid states"),
            (
                ModelError::InvalidField("max_guest".into()).into(),
                StatusCode::BAD_REQUEST,
                "Invalid max_guest",
            ),
            (ServiceError::not_found("State"), StatusCode::NOT_FOUND, "Not found"),
        ];
        for (err, status, title) in cases {
            let api: JsonApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.title, title);
        }
    }

    #[test]
    fn storage_failures_hide_details() {
        let err = ServiceError::Storage(service::storage::StorageError::Corrupt {
            path: PathBuf::from("file.json"),
            reason: "bad".into(),
        });
        let api = JsonApiError::from(err);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.title, "Internal Server Error");
        assert!(api.detail.is_some_and(|d| d.contains("file.json")));
    }
}
