//! The category taxonomy every user starts with, and how it is seeded.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    auth::UserID,
    category::{CategoryId, DefaultCategory},
    database_id::new_id,
    entry_type::EntryType,
    timestamp::Timestamp,
};

const fn expense(
    name: &'static str,
    subcategories: &'static [&'static str],
) -> DefaultCategory {
    DefaultCategory {
        entry_type: EntryType::Expense,
        name,
        subcategories,
    }
}

const fn income(name: &'static str) -> DefaultCategory {
    DefaultCategory {
        entry_type: EntryType::Income,
        name,
        subcategories: &[],
    }
}

/// The categories seeded for every user.
pub const DEFAULT_CATEGORIES: &[DefaultCategory] = &[
    expense("Food", &[]),
    expense("Social Life", &[]),
    expense("Pets", &["Pet Food", "Cat Litter", "Grooming"]),
    expense("Transport", &[]),
    expense("Culture", &[]),
    expense("Household", &[]),
    expense("Beauty", &[]),
    expense("Health", &[]),
    expense("Education", &[]),
    expense("Gift", &[]),
    expense("Installment", &[]),
    income("Allowance"),
    income("Salary"),
    income("Petty Cash"),
    income("Bonus"),
    income("Other"),
];

fn upsert_default_root(
    user_id: UserID,
    default: &DefaultCategory,
    now: Timestamp,
    connection: &Connection,
) -> Result<CategoryId, rusqlite::Error> {
    connection
        .prepare_cached(
            "INSERT INTO category (id, user_id, parent_id, name, type, is_default, created_at, updated_at)
            VALUES (?1, ?2, NULL, ?3, ?4, 1, ?5, ?5)
            ON CONFLICT (user_id, type, name) WHERE parent_id IS NULL
            DO UPDATE SET
                is_default = 1,
                updated_at = CASE WHEN category.is_default THEN category.updated_at ELSE excluded.updated_at END
            RETURNING id",
        )?
        .query_row(
            (new_id(), user_id, default.name, default.entry_type, now),
            |row| row.get(0),
        )
}

fn upsert_default_child(
    user_id: UserID,
    parent_id: CategoryId,
    name: &str,
    entry_type: EntryType,
    now: Timestamp,
    connection: &Connection,
) -> Result<CategoryId, rusqlite::Error> {
    connection
        .prepare_cached(
            "INSERT INTO category (id, user_id, parent_id, name, type, is_default, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            ON CONFLICT (user_id, parent_id, type, name) WHERE parent_id IS NOT NULL
            DO UPDATE SET
                is_default = 1,
                updated_at = CASE WHEN category.is_default THEN category.updated_at ELSE excluded.updated_at END
            RETURNING id",
        )?
        .query_row(
            (new_id(), user_id, parent_id, name, entry_type, now),
            |row| row.get(0),
        )
}

/// Make sure the user has every category in `defaults`, marked as default.
///
/// Missing categories are created. A category the user already made with the same name, type
/// and parent is adopted by marking it as default instead of creating a duplicate. Calling this
/// again changes nothing.
///
/// Everything happens in one immediate transaction: either all of the defaults are in place
/// afterwards or, on error, none of the changes are kept and the error is returned.
///
/// # Errors
///
/// Returns an [Error::SqlError] if a query fails.
pub fn ensure_defaults(
    user_id: UserID,
    defaults: &[DefaultCategory],
    connection: &Connection,
) -> Result<(), Error> {
    if defaults.is_empty() {
        return Ok(());
    }

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let now = Timestamp::now();

    for default in defaults {
        let root_id = upsert_default_root(user_id, default, now, &transaction)?;

        for subcategory in default.subcategories {
            upsert_default_child(
                user_id,
                root_id,
                subcategory,
                default.entry_type,
                now,
                &transaction,
            )?;
        }
    }

    transaction.commit()?;

    Ok(())
}
