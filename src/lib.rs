//! Fintrack is a web service for tracking your personal finances.
//!
//! This library provides a JSON REST API for managing transactions, budgets,
//! assets and categories, and for computing a dashboard overview of a user's
//! financial position.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod asset;
mod auth;
mod budget;
mod category;
mod currency;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod entry_type;
mod extract;
mod logging;
mod not_found;
mod response;
mod routing;
mod timestamp;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use asset::DEFAULT_ASSET_GROUPS;
pub use auth::{NewUser, PasswordHash, User, UserID, ValidatedPassword, create_user};
pub use category::{DEFAULT_CATEGORIES, DefaultCategory};
pub use currency::{CurrencyCode, update_currency};
pub use db::initialize as initialize_db;
pub use entry_type::EntryType;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timestamp::Timestamp;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The broad class of an [Error], used to pick the HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was malformed or failed a business rule.
    Validation,
    /// The referenced entity does not exist or belongs to another user.
    NotFound,
    /// The request clashes with existing data.
    Conflict,
    /// The client is not logged in or gave the wrong credentials.
    Unauthorized,
    /// Something went wrong on the server.
    Internal,
}

impl ErrorKind {
    /// The HTTP status code that a response for this kind of error should use.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The input was missing, malformed or broke a business rule, e.g. an
    /// empty category name or a budget that ends before it starts.
    #[error("{0}")]
    Validation(String),

    /// The requested resource was not found.
    ///
    /// Resources owned by another user are reported as not found so that
    /// clients cannot probe for the IDs of other users' data.
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with the current state of the data, e.g. a
    /// duplicate name or deleting a category that still has children.
    #[error("{0}")]
    Conflict(String),

    /// The email and password combination did not match a registered user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The request did not carry a valid session.
    #[error("Authentication required")]
    Unauthenticated,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The session token could not be encoded into the auth cookie.
    #[error("could not create the session token: {0}")]
    TokenError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl Error {
    /// The stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::InvalidCredentials | Error::Unauthenticated => ErrorKind::Unauthorized,
            Error::HashingError(_)
            | Error::TokenError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => ErrorKind::Internal,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::Conflict("Email already registered".to_owned())
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("asset_group.") =>
            {
                Error::Conflict("You already have a group with this name".to_owned())
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category.") =>
            {
                Error::Conflict("A category with this name already exists".to_owned())
            }
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound("The requested resource could not be found".to_owned())
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();

        let message = match kind {
            // Internal errors are not intended to be shown to the client.
            ErrorKind::Internal => {
                tracing::error!("An unexpected error occurred: {}", self);
                "Unexpected error occurred".to_owned()
            }
            _ => self.to_string(),
        };

        (kind.status_code(), Json(json!({ "message": message }))).into_response()
    }
}
