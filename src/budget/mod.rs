//! Budgets set a spending target for a period of time.

mod db;
mod domain;
mod handlers;

pub use db::{
    create_budget, create_budget_table, delete_budget, get_budget_progress, get_budgets,
    get_owned_budget, map_budget_row, sum_budget_expenses, update_budget,
};
pub use domain::{
    Budget, BudgetFields, BudgetId, BudgetProgress, CreateBudgetData, UpdateBudgetData,
};
pub use handlers::{
    create_budget_endpoint, delete_budget_endpoint, get_budgets_endpoint, update_budget_endpoint,
};
