//! The dashboard summarizes a user's income, expenses, budgets and assets.

mod handlers;
mod overview;
mod query;

pub use handlers::get_dashboard_endpoint;
pub use overview::{DashboardOverview, DashboardTotals, RECENT_TRANSACTION_LIMIT, get_overview};
pub use query::{DateWindow, RecentTransaction, get_recent_transactions, sum_transactions};
