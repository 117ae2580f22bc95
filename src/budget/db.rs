//! Database operations for budgets.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetFields, BudgetId, BudgetProgress, CreateBudgetData, UpdateBudgetData},
    currency::require_currency,
    database_id::new_id,
    timestamp::Timestamp,
};

/// Create the budget table.
///
/// # Errors
/// Returns an error if the table cannot be created.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                target_amount REAL NOT NULL CHECK (target_amount > 0),
                period_start TEXT NOT NULL,
                period_end TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                CHECK (period_start <= period_end)
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_user_period ON budget(user_id, period_start);",
        (),
    )?;

    Ok(())
}

const SELECT_BUDGET: &str = "SELECT id, user_id, name, target_amount, period_start, period_end, created_at, updated_at FROM budget";

/// Map a database row to a [Budget].
pub fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        target_amount: row.get(3)?,
        period_start: row.get(4)?,
        period_end: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Retrieve the user's budgets, latest period first.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_BUDGET} WHERE user_id = ?1 ORDER BY period_start DESC, rowid"
        ))?
        .query_map((user_id,), map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a budget owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the budget does not exist or belongs to another user.
pub fn get_owned_budget(
    user_id: UserID,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(&format!("{SELECT_BUDGET} WHERE id = ?1 AND user_id = ?2"))?
        .query_row((budget_id, user_id), map_budget_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound("Budget not found".to_owned()),
            error => error.into(),
        })
}

/// The total of the user's expenses linked to `budget_id`, over all time.
pub fn sum_budget_expenses(
    user_id: UserID,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .prepare_cached(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
            WHERE user_id = ?1 AND budget_id = ?2 AND type = 'EXPENSE'",
        )?
        .query_row((user_id, budget_id), |row| row.get(0))
        .map_err(|error| error.into())
}

/// Retrieve the user's budgets, latest period first, with how much has been spent on each.
pub fn get_budget_progress(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<BudgetProgress>, Error> {
    get_budgets(user_id, connection)?
        .into_iter()
        .map(|budget| {
            let spent = sum_budget_expenses(user_id, budget.id, connection)?;
            Ok(BudgetProgress { budget, spent })
        })
        .collect()
}

/// Create a budget for `user_id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::Conflict] if the user has not set their currency,
/// - [Error::Validation] if the fields are invalid.
pub fn create_budget(
    user_id: UserID,
    data: CreateBudgetData,
    connection: &Connection,
) -> Result<Budget, Error> {
    require_currency(user_id, connection)?;
    let fields = BudgetFields::from(data).validate()?;

    let now = Timestamp::now();
    let budget = Budget {
        id: new_id(),
        user_id,
        name: fields.name,
        target_amount: fields.target_amount,
        period_start: fields.period_start,
        period_end: fields.period_end,
        created_at: now,
        updated_at: now,
    };

    connection.execute(
        "INSERT INTO budget (id, user_id, name, target_amount, period_start, period_end, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            budget.id,
            budget.user_id,
            &budget.name,
            budget.target_amount,
            budget.period_start,
            budget.period_end,
            budget.created_at,
            budget.updated_at,
        ),
    )?;

    Ok(budget)
}

/// Apply the changes in `data` to a budget owned by `user_id`.
///
/// The merged budget is validated as a whole, so moving only one end of the period past the
/// other is rejected.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if the budget does not belong to the user,
/// - [Error::Validation] if the merged fields are invalid.
pub fn update_budget(
    user_id: UserID,
    budget_id: BudgetId,
    data: UpdateBudgetData,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget = get_owned_budget(user_id, budget_id, connection)?;
    let fields = BudgetFields::merge(&budget, data).validate()?;

    let budget = Budget {
        name: fields.name,
        target_amount: fields.target_amount,
        period_start: fields.period_start,
        period_end: fields.period_end,
        updated_at: Timestamp::now(),
        ..budget
    };

    connection.execute(
        "UPDATE budget
        SET name = ?1, target_amount = ?2, period_start = ?3, period_end = ?4, updated_at = ?5
        WHERE id = ?6",
        (
            &budget.name,
            budget.target_amount,
            budget.period_start,
            budget.period_end,
            budget.updated_at,
            budget.id,
        ),
    )?;

    Ok(budget)
}

/// Delete a budget owned by `user_id`. Linked transactions are kept but unlinked.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the budget does not belong to the user.
pub fn delete_budget(
    user_id: UserID,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<(), Error> {
    get_owned_budget(user_id, budget_id, connection)?;

    connection.execute("DELETE FROM budget WHERE id = ?1", (budget_id,))?;

    Ok(())
}
