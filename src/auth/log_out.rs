//! Defines the route handler for logging out a user.

use axum::{http::StatusCode, response::IntoResponse};
use axum_extra::extract::PrivateCookieJar;

use crate::auth::invalidate_auth_cookie;

/// Invalidate the auth cookie and respond with 204 No Content.
///
/// Logging out without a session is not an error.
pub async fn post_log_out(jar: PrivateCookieJar) -> impl IntoResponse {
    let jar = invalidate_auth_cookie(jar);

    (StatusCode::NO_CONTENT, jar)
}
