//! JSON response bodies and error mapping.
//!
//! Handler failures, unknown routes and timed-out requests all answer with a
//! JSON error body and an appropriate status instead of a dropped connection.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::ConfigError;

#[derive(Debug, Serialize, PartialEq)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct StatusBody {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Errors a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// A configuration source needed to answer could not be loaded.
    Configuration(ConfigError),
    NotFound,
    /// The request outran `http.request_timeout`.
    Timeout,
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        ApiError::Configuration(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Configuration(e) => {
                tracing::error!(error = %e, "Error reading configuration");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "configuration unavailable",
                        detail: Some(e.summary()),
                    }),
                )
                    .into_response()
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: "not found",
                    detail: None,
                }),
            )
                .into_response(),
            ApiError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                Json(ErrorBody {
                    error: "request timed out",
                    detail: None,
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_is_500() {
        let response = ApiError::from(ConfigError::NoPrimary).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_configuration_detail_hides_paths() {
        let response = ApiError::from(ConfigError::NotFound {
            name: "strings-en".into(),
            searched: "/srv/secret/conf".into(),
        })
        .into_response();

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "configuration 'strings-en' not found");
    }

    #[test]
    fn test_message_body_shape() {
        let body = serde_json::to_string(&MessageBody {
            message: "Hello, World!".into(),
        })
        .unwrap();
        assert_eq!(body, r#"{"message":"Hello, World!"}"#);
    }

    #[test]
    fn test_not_found_omits_detail() {
        let body = serde_json::to_value(ErrorBody {
            error: "not found",
            detail: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"error": "not found"}));
    }
}
