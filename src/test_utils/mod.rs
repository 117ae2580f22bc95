#![allow(missing_docs)]

use std::str::FromStr;

use axum::{
    body::to_bytes,
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde_json::Value;

use crate::{
    AppState, PasswordHash, ValidatedPassword,
    auth::{NewUser, User, UserID, create_user, set_auth_cookie},
    currency::CurrencyCode,
    db::initialize,
    entry_type::EntryType,
    timestamp::Timestamp,
    transaction::{NewTransaction, Transaction, insert_transaction},
};

pub(crate) mod http;

pub(crate) use http::assert_content_type;

pub(crate) const TEST_EMAIL: &str = "test@test.com";
pub(crate) const TEST_PASSWORD: &str = "test1234";
/// The cheapest cost bcrypt accepts, to keep hashing in tests fast.
pub(crate) const TEST_PASSWORD_HASH_COST: u32 = 4;

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("could not open in-memory database");
    initialize(&connection).expect("could not initialize database");
    connection
}

pub(crate) fn create_test_user_with_email(connection: &Connection, email: &str) -> User {
    create_user(
        NewUser {
            email: EmailAddress::from_str(email).expect("invalid test email"),
            display_name: None,
            password_hash: PasswordHash::new(
                ValidatedPassword::new_unchecked(TEST_PASSWORD),
                TEST_PASSWORD_HASH_COST,
            )
            .expect("could not hash test password"),
        },
        connection,
    )
    .expect("could not create test user")
}

pub(crate) fn create_test_user(connection: &Connection) -> User {
    create_test_user_with_email(connection, TEST_EMAIL)
}

pub(crate) fn set_test_currency(connection: &Connection, user_id: UserID) {
    connection
        .execute(
            "UPDATE user SET currency = ?1 WHERE id = ?2",
            (CurrencyCode::Usd, user_id),
        )
        .expect("could not set test currency");
}

/// A test user that has already chosen USD as their currency.
pub(crate) fn create_test_user_with_currency(connection: &Connection) -> User {
    let user = create_test_user(connection);
    set_test_currency(connection, user.id);

    User {
        currency: Some(CurrencyCode::Usd),
        ..user
    }
}

pub(crate) fn count_rows(connection: &Connection, table: &str) -> i64 {
    connection
        .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
            row.get(0)
        })
        .expect("could not count rows")
}

/// Insert a transaction in the category "Test" that occurred at midnight on `date` (YYYY-MM-DD).
pub(crate) fn insert_test_transaction(
    connection: &Connection,
    user_id: UserID,
    entry_type: EntryType,
    amount: f64,
    date: &str,
) -> Transaction {
    let occurred_at = Timestamp::parse(date).expect("invalid test date");

    insert_transaction(
        user_id,
        NewTransaction::build(entry_type, "Test", amount, occurred_at),
        Some(CurrencyCode::Usd),
        connection,
    )
    .expect("could not insert test transaction")
}

pub(crate) async fn parse_json_body(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("could not read response body");

    serde_json::from_slice(&body).expect("response body is not JSON")
}

/// App state over an in-memory database with a cheap password hash cost.
pub(crate) fn get_test_app_state() -> AppState {
    AppState::new(
        Connection::open_in_memory().expect("could not open in-memory database"),
        "test secret",
    )
    .expect("could not create app state")
    .with_password_hash_cost(TEST_PASSWORD_HASH_COST)
}

/// Register a test user in `state` and return them with a valid session cookie.
pub(crate) fn log_in_test_user(state: &AppState) -> (User, Cookie<'static>) {
    let user = {
        let connection = state.db_connection.lock().expect("database lock poisoned");
        create_test_user(&connection)
    };

    let jar = set_auth_cookie(
        PrivateCookieJar::new(state.cookie_key.clone()),
        user.id,
        state.cookie_duration,
    )
    .expect("could not set auth cookie");
    let response = jar.into_response();
    let header = response
        .headers()
        .get(SET_COOKIE)
        .expect("auth cookie was not set")
        .to_str()
        .expect("cookie header is not valid UTF-8")
        .to_owned();
    let cookie = Cookie::parse(header).expect("could not parse auth cookie");

    (user, cookie)
}
