//! Categories label transactions and form a per-user tree.
//!
//! Every user is seeded with a fixed set of default categories which cannot
//! be renamed or removed.

mod db;
mod defaults;
mod domain;
mod handlers;
mod tree;

pub use db::{
    create_category, create_category_table, delete_category, get_categories, get_owned_category,
    list_categories, update_category,
};
pub use defaults::{DEFAULT_CATEGORIES, ensure_defaults};
pub use domain::{
    Category, CategoryId, CategoryName, CategoryNode, CreateCategoryData, DefaultCategory,
    UpdateCategoryData,
};
pub use handlers::{
    create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
    update_category_endpoint,
};
pub use tree::build_tree;
