//! Database operations for transactions.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    budget::get_owned_budget,
    currency::{CurrencyCode, require_currency},
    database_id::new_id,
    timestamp::Timestamp,
    transaction::{
        CreateTransactionData, NewTransaction, Transaction, TransactionId, UpdateTransactionData,
    },
};

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                currency TEXT,
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                occurred_at TEXT NOT NULL,
                description TEXT,
                budget_id BLOB REFERENCES budget(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    // Used by the transaction list and the dashboard's date window.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_occurred ON \"transaction\"(user_id, occurred_at);",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_budget ON \"transaction\"(budget_id);",
        (),
    )?;

    Ok(())
}

const TRANSACTION_COLUMNS: &str = "id, user_id, type, currency, category, amount, occurred_at, description, budget_id, created_at, updated_at";

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        entry_type: row.get(2)?,
        currency: row.get(3)?,
        category: row.get(4)?,
        amount: row.get(5)?,
        occurred_at: row.get(6)?,
        description: row.get(7)?,
        budget_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Insert a transaction for `user_id` as is.
///
/// No validation or ownership checks are done here, see [create_transaction].
///
/// # Errors
/// Returns an [Error::SqlError] if the insert fails, e.g. `budget_id` does not refer to a budget.
pub fn insert_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    currency: Option<CurrencyCode>,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = Timestamp::now();

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (id, user_id, type, currency, category, amount, occurred_at, description, budget_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                new_id(),
                user_id,
                new_transaction.entry_type,
                currency,
                new_transaction.category,
                new_transaction.amount,
                new_transaction.occurred_at,
                new_transaction.description,
                new_transaction.budget_id,
                now,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(
            rusqlite::named_params! { ":id": id, ":user_id": user_id },
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound("Transaction not found".to_owned())
            }
            error => error.into(),
        })
}

/// Retrieve the user's transactions, most recent first.
pub fn get_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
            WHERE user_id = ?1
            ORDER BY occurred_at DESC, rowid"
        ))?
        .query_map((user_id,), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Record a transaction for `user_id` in their current currency.
///
/// # Errors
/// This function will return a:
/// - [Error::Conflict] if the user has not set their currency,
/// - [Error::Validation] if the fields are invalid,
/// - [Error::NotFound] if the budget does not belong to the user.
pub fn create_transaction(
    user_id: UserID,
    data: CreateTransactionData,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let currency = require_currency(user_id, connection)?;
    let new_transaction = NewTransaction::from(data).validate()?;

    if let Some(budget_id) = new_transaction.budget_id {
        get_owned_budget(user_id, budget_id, connection)?;
    }

    insert_transaction(user_id, new_transaction, Some(currency), connection)
}

/// Apply the changes in `data` to a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the transaction or the new budget does not belong to the user,
/// - [Error::Validation] if the merged fields are invalid.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    data: UpdateTransactionData,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = get_transaction(user_id, id, connection)?;
    let changes_budget = matches!(data.budget_id, Some(Some(_)));
    let fields = NewTransaction::merge(&transaction, data).validate()?;

    if changes_budget && let Some(budget_id) = fields.budget_id {
        get_owned_budget(user_id, budget_id, connection)?;
    }

    let transaction = Transaction {
        entry_type: fields.entry_type,
        category: fields.category,
        amount: fields.amount,
        occurred_at: fields.occurred_at,
        description: fields.description,
        budget_id: fields.budget_id,
        updated_at: Timestamp::now(),
        ..transaction
    };

    connection.execute(
        "UPDATE \"transaction\"
        SET \
            type = ?1, \
            category = ?2, \
            amount = ?3, \
            occurred_at = ?4, \
            description = ?5, \
            budget_id = ?6, \
            updated_at = ?7 \
        WHERE id = ?8",
        rusqlite::params![
            transaction.entry_type,
            transaction.category,
            transaction.amount,
            transaction.occurred_at,
            transaction.description,
            transaction.budget_id,
            transaction.updated_at,
            transaction.id,
        ],
    )?;

    Ok(transaction)
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the transaction does not belong to the user.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound("Transaction not found".to_owned()));
    }

    Ok(())
}

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        budget::{CreateBudgetData, create_budget},
        currency::CurrencyCode,
        entry_type::EntryType,
        test_utils::{
            create_test_user, create_test_user_with_currency, create_test_user_with_email,
            get_test_connection, set_test_currency,
        },
        timestamp::Timestamp,
        transaction::{
            CreateTransactionData, UpdateTransactionData, create_transaction, delete_transaction,
            get_transaction, get_transactions, update_transaction,
        },
    };

    fn data(amount: f64, day: time::Date) -> CreateTransactionData {
        CreateTransactionData {
            entry_type: EntryType::Expense,
            category: "Food".to_owned(),
            amount,
            occurred_at: Timestamp::start_of_day(day),
            description: None,
            budget_id: None,
        }
    }

    fn budget(user_id: crate::auth::UserID, connection: &rusqlite::Connection) -> uuid::Uuid {
        create_budget(
            user_id,
            CreateBudgetData {
                name: "January".to_owned(),
                target_amount: 100.0,
                period_start: Timestamp::start_of_day(date!(2024 - 01 - 01)),
                period_end: Timestamp::start_of_day(date!(2024 - 01 - 31)),
            },
            connection,
        )
        .unwrap()
        .id
    }

    #[test]
    fn create_succeeds_with_currency_snapshot() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);

        let transaction =
            create_transaction(user.id, data(12.3, date!(2025 - 10 - 05)), &connection).unwrap();

        assert_eq!(transaction.amount, 12.3);
        assert_eq!(transaction.currency, Some(CurrencyCode::Usd));
        assert_eq!(
            get_transaction(user.id, transaction.id, &connection),
            Ok(transaction)
        );
    }

    #[test]
    fn create_requires_currency() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);

        let result = create_transaction(user.id, data(12.3, date!(2025 - 10 - 05)), &connection);

        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[test]
    fn create_rejects_foreign_budget() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        let other_user = create_test_user_with_email(&connection, "other@x.com");
        set_test_currency(&connection, other_user.id);
        let foreign_budget = budget(other_user.id, &connection);
        let mut data = data(12.3, date!(2024 - 01 - 05));
        data.budget_id = Some(foreign_budget);

        let result = create_transaction(user.id, data, &connection);

        assert_eq!(result, Err(Error::NotFound("Budget not found".to_owned())));
    }

    #[test]
    fn list_orders_most_recent_first() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        for (amount, day) in [
            (1.0, date!(2024 - 01 - 02)),
            (2.0, date!(2024 - 01 - 03)),
            (3.0, date!(2024 - 01 - 01)),
        ] {
            create_transaction(user.id, data(amount, day), &connection).unwrap();
        }

        let amounts: Vec<f64> = get_transactions(user.id, &connection)
            .unwrap()
            .iter()
            .map(|transaction| transaction.amount)
            .collect();

        assert_eq!(amounts, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn update_sets_and_clears_budget() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        let budget_id = budget(user.id, &connection);
        let transaction =
            create_transaction(user.id, data(12.3, date!(2024 - 01 - 05)), &connection).unwrap();

        let linked = update_transaction(
            user.id,
            transaction.id,
            UpdateTransactionData {
                budget_id: Some(Some(budget_id)),
                amount: Some(20.0),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        assert_eq!(linked.budget_id, Some(budget_id));
        assert_eq!(linked.amount, 20.0);
        assert_eq!(linked.category, "Food");

        let unlinked = update_transaction(
            user.id,
            transaction.id,
            UpdateTransactionData {
                budget_id: Some(None),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        assert_eq!(unlinked.budget_id, None);
        assert_eq!(unlinked.amount, 20.0);
        assert_eq!(
            get_transaction(user.id, transaction.id, &connection),
            Ok(unlinked)
        );
    }

    #[test]
    fn update_rejects_invalid_amount() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        let transaction =
            create_transaction(user.id, data(12.3, date!(2024 - 01 - 05)), &connection).unwrap();

        let result = update_transaction(
            user.id,
            transaction.id,
            UpdateTransactionData {
                amount: Some(-1.0),
                ..Default::default()
            },
            &connection,
        );

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn delete_removes_only_own_transaction() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        let other_user = create_test_user_with_email(&connection, "other@x.com");
        let transaction =
            create_transaction(user.id, data(12.3, date!(2024 - 01 - 05)), &connection).unwrap();

        assert_eq!(
            delete_transaction(other_user.id, transaction.id, &connection),
            Err(Error::NotFound("Transaction not found".to_owned()))
        );

        delete_transaction(user.id, transaction.id, &connection).unwrap();

        assert_eq!(
            get_transaction(user.id, transaction.id, &connection),
            Err(Error::NotFound("Transaction not found".to_owned()))
        );
    }
}
