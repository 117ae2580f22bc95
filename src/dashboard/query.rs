//! Transaction queries restricted to an optional date window.

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error, auth::UserID, currency::CurrencyCode, entry_type::EntryType, timestamp::Timestamp,
    transaction::TransactionId,
};

/// An optional, inclusive range of `occurred_at` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    from: Option<Timestamp>,
    to: Option<Timestamp>,
}

impl DateWindow {
    /// Create a window from the optional bounds. Either or both may be left open.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if both bounds are given and `from` is later than `to`.
    pub fn new(from: Option<Timestamp>, to: Option<Timestamp>) -> Result<Self, Error> {
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(Error::Validation(
                "`from` must be earlier than `to`".to_owned(),
            ));
        }

        Ok(Self { from, to })
    }
}

/// The fields of a transaction shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTransaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub category: String,
    pub amount: f64,
    pub occurred_at: Timestamp,
    pub currency: Option<CurrencyCode>,
    pub description: Option<String>,
}

/// The sum of the user's transactions of `entry_type` in `window`, zero if there are none.
pub fn sum_transactions(
    user_id: UserID,
    entry_type: EntryType,
    window: DateWindow,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .prepare_cached(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
            WHERE user_id = ?1
                AND type = ?2
                AND (?3 IS NULL OR occurred_at >= ?3)
                AND (?4 IS NULL OR occurred_at <= ?4)",
        )?
        .query_row(
            (user_id, entry_type, window.from, window.to),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// The user's `limit` latest transactions in `window`.
///
/// Transactions at the same time are listed in the order they were recorded.
pub fn get_recent_transactions(
    user_id: UserID,
    window: DateWindow,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<RecentTransaction>, Error> {
    connection
        .prepare_cached(
            "SELECT id, type, category, amount, occurred_at, currency, description
            FROM \"transaction\"
            WHERE user_id = ?1
                AND (?2 IS NULL OR occurred_at >= ?2)
                AND (?3 IS NULL OR occurred_at <= ?3)
            ORDER BY occurred_at DESC, rowid
            LIMIT ?4",
        )?
        .query_map((user_id, window.from, window.to, limit), |row| {
            Ok(RecentTransaction {
                id: row.get(0)?,
                entry_type: row.get(1)?,
                category: row.get(2)?,
                amount: row.get(3)?,
                occurred_at: row.get(4)?,
                currency: row.get(5)?,
                description: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<RecentTransaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}
