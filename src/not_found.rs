//! The fallback handler for requests that do not match any route.

use axum::response::{IntoResponse, Response};

use crate::Error;

/// Respond with a 404 JSON error for an unknown route.
pub async fn get_404_not_found() -> Response {
    Error::NotFound("Route not found".to_owned()).into_response()
}
