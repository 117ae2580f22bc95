//! The currency a user records their amounts in.
//!
//! Amounts are stored without a currency conversion, so changing the currency
//! discards the user's existing transactions.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::{User, UserID, get_user_by_id},
    extract::JsonBody,
    timestamp::Timestamp,
};

/// The currencies a user may choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(missing_docs)]
pub enum CurrencyCode {
    Usd,
    Sgd,
    Inr,
    Jpy,
    Rub,
    Gbp,
    Eur,
    Cny,
    Idr,
    Myr,
    Aud,
    Brl,
    Sar,
    Aed,
}

impl CurrencyCode {
    /// Every supported currency.
    pub const ALL: [CurrencyCode; 14] = [
        CurrencyCode::Usd,
        CurrencyCode::Sgd,
        CurrencyCode::Inr,
        CurrencyCode::Jpy,
        CurrencyCode::Rub,
        CurrencyCode::Gbp,
        CurrencyCode::Eur,
        CurrencyCode::Cny,
        CurrencyCode::Idr,
        CurrencyCode::Myr,
        CurrencyCode::Aud,
        CurrencyCode::Brl,
        CurrencyCode::Sar,
        CurrencyCode::Aed,
    ];

    /// The ISO 4217 code, e.g. "USD".
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Sgd => "SGD",
            CurrencyCode::Inr => "INR",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Rub => "RUB",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Idr => "IDR",
            CurrencyCode::Myr => "MYR",
            CurrencyCode::Aud => "AUD",
            CurrencyCode::Brl => "BRL",
            CurrencyCode::Sar => "SAR",
            CurrencyCode::Aed => "AED",
        }
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurrencyCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| format!("unsupported currency {s:?}"))
    }
}

impl ToSql for CurrencyCode {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CurrencyCode {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// Set the currency of the user with `user_id`.
///
/// If the user already had a different currency, all of their transactions are deleted since
/// their amounts would no longer make sense. Setting the same currency again changes nothing.
/// The lookup, deletion and update happen in one transaction.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the user does not exist, or an [Error::SqlError] if a query
/// failed, in which case no changes are made.
pub fn update_currency(
    user_id: UserID,
    currency: CurrencyCode,
    connection: &mut Connection,
) -> Result<User, Error> {
    let transaction = connection.transaction()?;

    let mut user = get_user_by_id(user_id, &transaction)?;

    match user.currency {
        Some(existing) if existing == currency => return Ok(user),
        Some(existing) => {
            let deleted = transaction.execute(
                "DELETE FROM \"transaction\" WHERE user_id = ?1",
                (user_id,),
            )?;
            tracing::info!(
                "deleted {deleted} transactions for user {user_id} after changing currency from {existing} to {currency}"
            );
        }
        None => {}
    }

    user.currency = Some(currency);
    user.updated_at = Timestamp::now();
    transaction.execute(
        "UPDATE user SET currency = ?1, updated_at = ?2 WHERE id = ?3",
        (user.currency, user.updated_at, user_id),
    )?;

    transaction.commit()?;

    Ok(user)
}

/// Get the currency of the user with `user_id`, or `None` if they have not chosen one.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the user does not exist.
pub fn get_currency(
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<CurrencyCode>, Error> {
    connection
        .query_row(
            "SELECT currency FROM user WHERE id = ?1",
            (user_id,),
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound("User not found".to_owned()),
            error => error.into(),
        })
}

/// Get the currency of the user with `user_id`.
///
/// # Errors
///
/// Returns an [Error::Conflict] if the user has not chosen a currency yet.
pub fn require_currency(user_id: UserID, connection: &Connection) -> Result<CurrencyCode, Error> {
    get_currency(user_id, connection)?.ok_or_else(|| {
        Error::Conflict("Please set your currency before performing this action.".to_owned())
    })
}

/// The state needed for changing a user's currency.
#[derive(Debug, Clone)]
pub struct CurrencyState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CurrencyState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for changing the currency.
#[derive(Debug, Deserialize)]
pub struct CurrencyData {
    /// The new currency.
    pub currency: CurrencyCode,
}

/// Route handler for changing the current user's currency.
pub async fn update_currency_endpoint(
    State(state): State<CurrencyState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<CurrencyData>,
) -> Result<Json<Value>, Error> {
    let mut connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = update_currency(user_id, data.currency, &mut connection)?;

    Ok(Json(json!({ "user": user })))
}
