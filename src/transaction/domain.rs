//! Transaction models and validation.

use serde::{Deserialize, Serialize};

use crate::{
    Error, auth::UserID, budget::BudgetId, currency::CurrencyCode, database_id::DatabaseId,
    entry_type::EntryType, timestamp::Timestamp,
};

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// The most characters a transaction description may have.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [NewTransaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserID,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// The owner's currency when the transaction was recorded.
    pub currency: Option<CurrencyCode>,
    /// A free text label, usually the name of one of the user's categories.
    pub category: String,
    /// The amount of money spent or earned, always greater than zero.
    pub amount: f64,
    /// When the transaction happened.
    pub occurred_at: Timestamp,
    pub description: Option<String>,
    /// The budget this transaction counts towards.
    pub budget_id: Option<BudgetId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A builder for the fields of a transaction the user controls.
///
/// Call [NewTransaction::validate] before storing it.
///
/// ```ignore
/// let transaction = NewTransaction::build(
///         EntryType::Expense,
///         "Food",
///         45.99,
///         Timestamp::parse("2025-01-15").unwrap(),
///     )
///     .description(Some("Coffee shop".to_owned()))
///     .validate()?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub entry_type: EntryType,
    pub category: String,
    pub amount: f64,
    pub occurred_at: Timestamp,
    pub description: Option<String>,
    pub budget_id: Option<BudgetId>,
}

impl NewTransaction {
    /// Start building a transaction without a description or budget.
    pub fn build(
        entry_type: EntryType,
        category: &str,
        amount: f64,
        occurred_at: Timestamp,
    ) -> Self {
        Self {
            entry_type,
            category: category.to_owned(),
            amount,
            occurred_at,
            description: None,
            budget_id: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Set the budget the transaction counts towards.
    pub fn budget_id(mut self, budget_id: Option<BudgetId>) -> Self {
        self.budget_id = budget_id;
        self
    }

    /// The fields of `transaction` with the changes in `update` applied.
    pub fn merge(transaction: &Transaction, update: UpdateTransactionData) -> Self {
        Self {
            entry_type: update.entry_type.unwrap_or(transaction.entry_type),
            category: update
                .category
                .unwrap_or_else(|| transaction.category.clone()),
            amount: update.amount.unwrap_or(transaction.amount),
            occurred_at: update.occurred_at.unwrap_or(transaction.occurred_at),
            description: update
                .description
                .unwrap_or_else(|| transaction.description.clone()),
            budget_id: update.budget_id.unwrap_or(transaction.budget_id),
        }
    }

    /// Check the fields and trim the category.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the category is blank, the amount is not a positive
    /// number or the description is too long.
    pub fn validate(self) -> Result<Self, Error> {
        let category = self.category.trim().to_owned();

        if category.is_empty() {
            return Err(Error::Validation("Category is required".to_owned()));
        }

        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(Error::Validation(
                "Amount must be greater than 0".to_owned(),
            ));
        }

        if let Some(description) = &self.description
            && description.chars().count() > MAX_DESCRIPTION_LENGTH
        {
            return Err(Error::Validation(format!(
                "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }

        Ok(Self { category, ..self })
    }
}

/// The request body for creating a transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionData {
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub category: String,
    pub amount: f64,
    pub occurred_at: Timestamp,
    pub description: Option<String>,
    pub budget_id: Option<BudgetId>,
}

impl From<CreateTransactionData> for NewTransaction {
    fn from(data: CreateTransactionData) -> Self {
        NewTransaction::build(data.entry_type, &data.category, data.amount, data.occurred_at)
            .description(data.description)
            .budget_id(data.budget_id)
    }
}

/// The request body for updating a transaction. Missing fields are left unchanged.
///
/// `description` and `budgetId` distinguish a missing field from an explicit `null`, which
/// clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionData {
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub occurred_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "crate::extract::deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::extract::deserialize_some")]
    pub budget_id: Option<Option<BudgetId>>,
}

#[cfg(test)]
mod new_transaction_tests {
    use time::macros::date;
    use uuid::Uuid;

    use crate::{Error, entry_type::EntryType, timestamp::Timestamp};

    use super::{MAX_DESCRIPTION_LENGTH, NewTransaction, UpdateTransactionData};

    fn new_transaction() -> NewTransaction {
        NewTransaction::build(
            EntryType::Expense,
            " Food ",
            12.5,
            Timestamp::start_of_day(date!(2024 - 01 - 01)),
        )
    }

    #[test]
    fn validate_trims_category() {
        let got = new_transaction().validate().unwrap();

        assert_eq!(got.category, "Food");
    }

    #[test]
    fn validate_rejects_blank_category() {
        let mut transaction = new_transaction();
        transaction.category = "   ".to_owned();

        assert_eq!(
            transaction.validate(),
            Err(Error::Validation("Category is required".to_owned()))
        );
    }

    #[test]
    fn validate_rejects_non_positive_amount() {
        for amount in [0.0, -5.0, f64::INFINITY] {
            let mut transaction = new_transaction();
            transaction.amount = amount;

            assert!(matches!(transaction.validate(), Err(Error::Validation(_))));
        }
    }

    #[test]
    fn validate_rejects_long_description() {
        let at_limit = new_transaction().description(Some("a".repeat(MAX_DESCRIPTION_LENGTH)));
        let over_limit =
            new_transaction().description(Some("a".repeat(MAX_DESCRIPTION_LENGTH + 1)));

        assert!(at_limit.validate().is_ok());
        assert!(matches!(
            over_limit.validate(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn update_distinguishes_null_from_missing() {
        let missing: UpdateTransactionData = serde_json::from_str("{}").unwrap();
        let null: UpdateTransactionData =
            serde_json::from_str(r#"{"budgetId": null, "description": null}"#).unwrap();
        let id = Uuid::new_v4();
        let set: UpdateTransactionData =
            serde_json::from_str(&format!(r#"{{"budgetId": "{id}"}}"#)).unwrap();

        assert_eq!(missing.budget_id, None);
        assert_eq!(missing.description, None);
        assert_eq!(null.budget_id, Some(None));
        assert_eq!(null.description, Some(None));
        assert_eq!(set.budget_id, Some(Some(id)));
    }
}
