//! JSON bodies for timed-out requests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::response::ApiError;

/// Replace the empty 408 produced by the timeout layer with a JSON error.
pub async fn timeout_as_json(request: Request<Body>, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiError::Timeout.into_response();
    }
    response
}
