//! Route handlers.

use axum::{extract::State, Json};

use crate::config::Settings;
use crate::http::response::{ApiError, MessageBody, StatusBody};
use crate::http::server::AppState;

/// Source holding user-facing strings.
pub const STRINGS_SOURCE: &str = "strings-en";

/// Key of the greeting inside [`STRINGS_SOURCE`].
pub const HELLO_MESSAGE_KEY: &str = "helloworld-message";

/// `GET /hello`: the greeting from `strings-en`.
///
/// A missing key answers with an empty message.
pub async fn hello(State(state): State<AppState>) -> Result<Json<MessageBody>, ApiError> {
    let messages = state.store.get_configuration(STRINGS_SOURCE).await?;
    let message = messages.get_string(HELLO_MESSAGE_KEY).unwrap_or_default();
    Ok(Json(MessageBody { message }))
}

/// `GET /health`: liveness.
pub async fn health() -> Json<StatusBody> {
    Json(StatusBody { status: "ok" })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
