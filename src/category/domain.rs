//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    Error, auth::UserID, database_id::DatabaseId, entry_type::EntryType, timestamp::Timestamp,
};

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// A validated, non-empty category name.
///
/// Leading and trailing whitespace is removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::Validation("Category name is required".to_owned()))
        } else {
            Ok(Self(name.to_string()))
        }
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label for grouping transactions, optionally nested under a parent of the same type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub user_id: Option<UserID>,
    /// The parent category, or `None` for a root category.
    pub parent_id: Option<CategoryId>,
    pub name: String,
    /// Always the same as the parent's type.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Default categories are seeded for every user and cannot be renamed or deleted.
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A category with its subcategories, each level sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<CategoryNode>,
}

impl CategoryNode {
    /// A node without any subcategories.
    pub fn leaf(category: Category) -> Self {
        Self {
            category,
            subcategories: Vec::new(),
        }
    }
}

/// An entry of the category taxonomy every user starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultCategory {
    /// Whether the category is for income or expenses.
    pub entry_type: EntryType,
    /// The name of the root category.
    pub name: &'static str,
    /// The names of the root's subcategories.
    pub subcategories: &'static [&'static str],
}

/// The request body for creating a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryData {
    pub name: String,
    /// Required for root categories, ignored when `parent_id` is set.
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
    pub parent_id: Option<CategoryId>,
}

/// The request body for updating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategoryData {
    pub name: Option<String>,
}
