//! Computes a snapshot of a user's financial position.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;

use crate::{
    Error,
    asset::{Asset, get_assets_by_value, sum_asset_values},
    auth::UserID,
    budget::{BudgetProgress, get_budget_progress},
    currency::{CurrencyCode, get_currency},
    dashboard::query::{DateWindow, RecentTransaction, get_recent_transactions, sum_transactions},
    entry_type::EntryType,
};

/// How many transactions the overview lists.
pub const RECENT_TRANSACTION_LIMIT: u32 = 5;

/// The headline figures of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardTotals {
    /// Income in the date window.
    pub income: f64,
    /// Expenses in the date window.
    pub expense: f64,
    /// `income - expense`.
    pub net: f64,
    /// The current value of all assets.
    pub assets: f64,
    /// The currency all amounts are in.
    pub currency: Option<CurrencyCode>,
}

/// Everything shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub totals: DashboardTotals,
    /// The latest transactions in the date window.
    pub recent_transactions: Vec<RecentTransaction>,
    /// All budgets, latest period first, regardless of the date window.
    pub budgets: Vec<BudgetProgress>,
    /// All assets, most valuable first.
    pub assets: Vec<Asset>,
}

/// Compute the dashboard for `user_id`.
///
/// Income, expenses and recent transactions are limited to `window`. Budgets, their spending
/// and assets are not. All reads happen in one transaction so the figures agree with each
/// other.
pub fn get_overview(
    user_id: UserID,
    window: DateWindow,
    connection: &Connection,
) -> Result<DashboardOverview, Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    let currency = get_currency(user_id, &transaction)?;
    let income = sum_transactions(user_id, EntryType::Income, window, &transaction)?;
    let expense = sum_transactions(user_id, EntryType::Expense, window, &transaction)?;
    let recent_transactions =
        get_recent_transactions(user_id, window, RECENT_TRANSACTION_LIMIT, &transaction)?;
    let budgets = get_budget_progress(user_id, &transaction)?;
    let assets = get_assets_by_value(user_id, &transaction)?;
    let asset_total = sum_asset_values(user_id, &transaction)?;

    transaction.commit()?;

    Ok(DashboardOverview {
        totals: DashboardTotals {
            income,
            expense,
            net: income - expense,
            assets: asset_total,
            currency,
        },
        recent_transactions,
        budgets,
        assets,
    })
}

#[cfg(test)]
mod overview_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        asset::{CreateAssetData, create_asset},
        auth::UserID,
        budget::{CreateBudgetData, create_budget},
        currency::CurrencyCode,
        dashboard::{DateWindow, get_overview},
        entry_type::EntryType,
        test_utils::{
            create_test_user, create_test_user_with_currency, create_test_user_with_email,
            get_test_connection, insert_test_transaction,
        },
        timestamp::Timestamp,
        transaction::{NewTransaction, insert_transaction},
    };

    use super::DashboardTotals;

    fn from(day: time::Date) -> DateWindow {
        DateWindow::new(Some(Timestamp::start_of_day(day)), None).unwrap()
    }

    #[test]
    fn empty_overview() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);

        let overview = get_overview(user.id, DateWindow::default(), &connection).unwrap();

        assert_eq!(
            overview.totals,
            DashboardTotals {
                income: 0.0,
                expense: 0.0,
                net: 0.0,
                assets: 0.0,
                currency: None,
            }
        );
        assert!(overview.recent_transactions.is_empty());
        assert!(overview.budgets.is_empty());
        assert!(overview.assets.is_empty());
    }

    #[test]
    fn totals_follow_the_date_window() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        insert_test_transaction(&connection, user.id, EntryType::Income, 100.0, "2024-01-01");
        insert_test_transaction(&connection, user.id, EntryType::Expense, 40.0, "2024-02-01");

        let overview = get_overview(user.id, from(date!(2024 - 01 - 15)), &connection).unwrap();

        assert_eq!(overview.totals.income, 0.0);
        assert_eq!(overview.totals.expense, 40.0);
        assert_eq!(overview.totals.net, -40.0);
        assert_eq!(overview.recent_transactions.len(), 1);
        assert_eq!(overview.recent_transactions[0].amount, 40.0);
    }

    #[test]
    fn inverted_window_fails_before_querying() {
        // Without any tables every query would fail with an SQL error.
        let connection = Connection::open_in_memory().unwrap();

        let result = DateWindow::new(
            Some(Timestamp::start_of_day(date!(2024 - 03 - 01))),
            Some(Timestamp::start_of_day(date!(2024 - 01 - 01))),
        )
        .and_then(|window| get_overview(UserID::new(uuid::Uuid::new_v4()), window, &connection));

        assert_eq!(
            result,
            Err(Error::Validation(
                "`from` must be earlier than `to`".to_owned()
            ))
        );
    }

    #[test]
    fn budget_spending_ignores_the_date_window() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        let budget = create_budget(
            user.id,
            CreateBudgetData {
                name: "January".to_owned(),
                target_amount: 100.0,
                period_start: Timestamp::start_of_day(date!(2024 - 01 - 01)),
                period_end: Timestamp::start_of_day(date!(2024 - 01 - 31)),
            },
            &connection,
        )
        .unwrap();
        for (amount, day) in [(30.0, date!(2024 - 01 - 05)), (20.0, date!(2024 - 01 - 20))] {
            insert_transaction(
                user.id,
                NewTransaction::build(
                    EntryType::Expense,
                    "Food",
                    amount,
                    Timestamp::start_of_day(day),
                )
                .budget_id(Some(budget.id)),
                Some(CurrencyCode::Usd),
                &connection,
            )
            .unwrap();
        }

        for window in [
            DateWindow::default(),
            from(date!(2024 - 01 - 10)),
            from(date!(2025 - 01 - 01)),
        ] {
            let overview = get_overview(user.id, window, &connection).unwrap();

            assert_eq!(overview.budgets.len(), 1);
            assert_eq!(overview.budgets[0].budget.id, budget.id);
            assert_eq!(overview.budgets[0].spent, 50.0);
        }
    }

    #[test]
    fn lists_five_recent_transactions_and_assets_by_value() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        for day in 1..=7 {
            insert_test_transaction(
                &connection,
                user.id,
                EntryType::Expense,
                day as f64,
                &format!("2024-01-0{day}"),
            );
        }
        for (name, current_value) in [("Car", 5000.0), ("Cash", 50.0), ("House", 90000.0)] {
            create_asset(
                user.id,
                CreateAssetData {
                    name: name.to_owned(),
                    group_id: None,
                    current_value,
                },
                &connection,
            )
            .unwrap();
        }

        let overview = get_overview(user.id, DateWindow::default(), &connection).unwrap();

        let amounts: Vec<f64> = overview
            .recent_transactions
            .iter()
            .map(|transaction| transaction.amount)
            .collect();
        assert_eq!(amounts, vec![7.0, 6.0, 5.0, 4.0, 3.0]);
        let asset_names: Vec<&str> = overview
            .assets
            .iter()
            .map(|asset| asset.name.as_str())
            .collect();
        assert_eq!(asset_names, vec!["House", "Car", "Cash"]);
        assert_eq!(overview.totals.assets, 95050.0);
        assert_eq!(overview.totals.expense, 28.0);
        assert_eq!(overview.totals.currency, Some(CurrencyCode::Usd));
    }

    #[test]
    fn other_users_data_is_excluded() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let other_user = create_test_user_with_email(&connection, "other@x.com");
        insert_test_transaction(&connection, other_user.id, EntryType::Income, 100.0, "2024-01-01");

        let overview = get_overview(user.id, DateWindow::default(), &connection).unwrap();

        assert_eq!(overview.totals.income, 0.0);
        assert!(overview.recent_transactions.is_empty());
    }
}
