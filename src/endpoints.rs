//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/budgets/{budget_id}', use [format_endpoint].

use std::fmt::Display;

/// The route for checking that the server is up.
pub const HEALTH: &str = "/health";

/// The route for creating a new account.
pub const REGISTER: &str = "/api/v1/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/v1/auth/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/v1/auth/logout";

/// The route for getting the current user.
pub const ME: &str = "/api/v1/user/me";
/// The route for setting the current user's currency.
pub const USER_CURRENCY: &str = "/api/v1/user/currency";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/v1/categories";
/// The route to update or delete a single category.
pub const CATEGORY: &str = "/api/v1/categories/{category_id}";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/v1/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/v1/transactions/{transaction_id}";

/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/v1/budgets";
/// The route to update or delete a single budget.
pub const BUDGET: &str = "/api/v1/budgets/{budget_id}";

/// The route to list and create asset groups.
pub const ASSET_GROUPS: &str = "/api/v1/asset-groups";

/// The route to list and create assets.
pub const ASSETS: &str = "/api/v1/assets";
/// The route to update or delete a single asset.
pub const ASSET: &str = "/api/v1/assets/{asset_id}";

/// The route for the dashboard overview.
pub const DASHBOARD: &str = "/api/v1/dashboard";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/budgets/{budget_id}', '{budget_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
