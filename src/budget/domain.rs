//! Budget models and validation.

use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, database_id::DatabaseId, timestamp::Timestamp};

/// Database identifier for a budget.
pub type BudgetId = DatabaseId;

/// A spending target over a period of time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    pub name: String,
    /// How much the user plans to spend, always greater than zero.
    pub target_amount: f64,
    pub period_start: Timestamp,
    /// Never earlier than `period_start`.
    pub period_end: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A budget together with how much has been spent against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    #[serde(flatten)]
    pub budget: Budget,
    /// The sum of all expenses linked to the budget, regardless of when they occurred.
    pub spent: f64,
}

/// The request body for creating a budget.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetData {
    pub name: String,
    pub target_amount: f64,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
}

/// The request body for updating a budget. Missing fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetData {
    pub name: Option<String>,
    pub target_amount: Option<f64>,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
}

/// The fields of a budget that the user controls, validated together.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetFields {
    pub name: String,
    pub target_amount: f64,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
}

impl BudgetFields {
    /// The fields of `budget` with the changes in `update` applied.
    pub fn merge(budget: &Budget, update: UpdateBudgetData) -> Self {
        Self {
            name: update.name.unwrap_or_else(|| budget.name.clone()),
            target_amount: update.target_amount.unwrap_or(budget.target_amount),
            period_start: update.period_start.unwrap_or(budget.period_start),
            period_end: update.period_end.unwrap_or(budget.period_end),
        }
    }

    /// Check the fields and trim the name.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the name is blank, the target amount is not a positive
    /// number, or the period ends before it starts.
    pub fn validate(self) -> Result<Self, Error> {
        let name = self.name.trim().to_owned();

        if name.is_empty() {
            return Err(Error::Validation("Budget name is required".to_owned()));
        }

        if !(self.target_amount.is_finite() && self.target_amount > 0.0) {
            return Err(Error::Validation(
                "Target amount must be greater than 0".to_owned(),
            ));
        }

        if self.period_start > self.period_end {
            return Err(Error::Validation(
                "Budget period must not end before it starts".to_owned(),
            ));
        }

        Ok(Self { name, ..self })
    }
}

impl From<CreateBudgetData> for BudgetFields {
    fn from(data: CreateBudgetData) -> Self {
        Self {
            name: data.name,
            target_amount: data.target_amount,
            period_start: data.period_start,
            period_end: data.period_end,
        }
    }
}
