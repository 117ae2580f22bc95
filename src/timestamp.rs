//! UTC timestamps with millisecond precision.
//!
//! Timestamps are written to the database and to JSON in the fixed-width form
//! `2024-01-01T00:00:00.000Z`. Because every stored value has the same width
//! and offset, comparing the stored text is the same as comparing the
//! instants, so `ORDER BY` and range filters work directly on the column.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

/// Fixed-width UTC format, e.g. "2024-01-01T00:00:00.000Z".
const TIMESTAMP_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A point in time in UTC, truncated to milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// The current time.
    pub fn now() -> Self {
        Self::from(OffsetDateTime::now_utc())
    }

    /// Midnight UTC at the start of `date`.
    pub fn start_of_day(date: Date) -> Self {
        Self(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
    }

    /// Parse either an RFC 3339 date time or a plain `YYYY-MM-DD` date.
    ///
    /// Date-only strings are interpreted as midnight UTC.
    ///
    /// # Errors
    ///
    /// Returns a [time::error::Parse] if `text` matches neither form.
    pub fn parse(text: &str) -> Result<Self, time::error::Parse> {
        match OffsetDateTime::parse(text, &Rfc3339) {
            Ok(date_time) => Ok(Self::from(date_time)),
            Err(rfc3339_error) => Date::parse(text, DATE_FORMAT)
                .map(Self::start_of_day)
                .map_err(|_| rfc3339_error),
        }
    }

    /// The underlying date time in UTC.
    pub fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }

    fn format(&self) -> String {
        // The format only has numeric components, which cannot fail to format
        // for a date time that has been normalized to UTC.
        self.0
            .format(TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        let utc = value.to_offset(time::UtcOffset::UTC);
        let millisecond = utc.millisecond();

        // Truncating to a valid millisecond never fails.
        Self(utc.replace_millisecond(millisecond).unwrap_or(utc))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Timestamp::parse(&text).map_err(serde::de::Error::custom)
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.format()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT)
            .map(|date_time| Self(date_time.assume_utc()))
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
