//! JSON envelopes for successful responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Wraps a payload as `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    /// The payload.
    pub data: T,
}

impl<T: Serialize> IntoResponse for Data<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Respond with `201 Created` and the payload wrapped in `{"data": ...}`.
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Data { data }).into_response()
}
