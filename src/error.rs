use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KinoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream returned status {status} for {path}")]
    Upstream { status: u16, path: String },
}

pub type Result<T> = std::result::Result<T, KinoError>;

impl KinoError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            KinoError::BadRequest(_) => StatusCode::BAD_REQUEST,
            KinoError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body shared by every route.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// An error on its way out of a handler.
///
/// Carries the public message separately from the underlying cause so routes
/// can answer with a generic message while still exposing `details`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    /// Answer 500 with a route-specific message, whatever `source` was.
    pub fn internal(message: &str, source: KinoError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: message.to_string(),
                details: Some(source.to_string()),
            },
        }
    }
}

impl From<KinoError> for ApiError {
    fn from(err: KinoError) -> Self {
        let status = err.status_code();
        let error = match &err {
            KinoError::BadRequest(msg) | KinoError::NotFound(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        };
        let details = match &err {
            KinoError::BadRequest(_) | KinoError::NotFound(_) => None,
            other => Some(other.to_string()),
        };
        Self {
            status,
            body: ErrorBody { error, details },
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        KinoError::BadRequest(rejection.body_text()).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        KinoError::BadRequest(rejection.body_text()).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        KinoError::BadRequest(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.body.error, details = ?self.body.details, "request failed");
        } else {
            tracing::warn!(status = %self.status, error = %self.body.error, "request rejected");
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            KinoError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            KinoError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            KinoError::Upstream { status: 503, path: "/discover/movie".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_keeps_details() {
        let err = ApiError::internal(
            "Failed to fetch movie releases",
            KinoError::NotFound("/movie/upcoming".into()),
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "Failed to fetch movie releases");
        assert_eq!(
            err.body.details.as_deref(),
            Some("Not found: /movie/upcoming")
        );
    }

    #[test]
    fn test_bad_request_has_no_details() {
        let err: ApiError = KinoError::BadRequest("query is required".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, "query is required");
        assert!(err.body.details.is_none());
    }

    #[test]
    fn test_query_rejection_is_bad_request() {
        #[derive(Debug, serde::Deserialize)]
        struct Params {
            #[allow(dead_code)]
            start_date: Option<String>,
        }

        let uri: axum::http::Uri = "/?start_date=a&start_date=b".parse().unwrap();
        let rejection = axum::extract::Query::<Params>::try_from_uri(&uri).unwrap_err();
        let err: ApiError = rejection.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.body.error.contains("duplicate field"));
        assert!(err.body.details.is_none());
    }
}
