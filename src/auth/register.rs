//! This file defines the endpoint for creating a new account.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::Duration;

use crate::{
    AppState, Error, PasswordHash,
    auth::{
        set_auth_cookie,
        user::{NewUser, create_user},
    },
    extract::JsonBody,
};

/// The most characters a display name may have.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The bcrypt cost used when hashing the new password.
    pub password_hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data sent by the client when registering.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

fn validate_display_name(display_name: Option<&str>) -> Result<Option<String>, Error> {
    let Some(display_name) = display_name else {
        return Ok(None);
    };

    let trimmed = display_name.trim();
    let length = trimmed.chars().count();

    if length == 0 || length > MAX_DISPLAY_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "Display name must be between 1 and {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }

    Ok(Some(trimmed.to_owned()))
}

/// Handler for registering a new user.
///
/// On success the user is logged in straight away: the session cookie is set and the new user
/// is returned as `{"user": ...}` with the status code 201.
///
/// # Errors
///
/// This function will return an error if:
/// - the email, password or display name are invalid,
/// - the email is already registered,
/// - the password could not be hashed.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    JsonBody(user_data): JsonBody<RegisterData>,
) -> Result<Response, Error> {
    let email = EmailAddress::from_str(user_data.email.trim())
        .map_err(|_| Error::Validation("Invalid email address".to_owned()))?;
    let display_name = validate_display_name(user_data.display_name.as_deref())?;
    let password_hash =
        PasswordHash::from_raw_password(&user_data.password, state.password_hash_cost)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(
            NewUser {
                email,
                display_name,
                password_hash,
            },
            &connection,
        )?
    };

    tracing::info!("registered user {}", user.id);
    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((StatusCode::CREATED, jar, Json(json!({ "user": user }))).into_response())
}
