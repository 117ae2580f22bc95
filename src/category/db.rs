//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{
        Category, CategoryId, CategoryName, CategoryNode, CreateCategoryData, DefaultCategory,
        UpdateCategoryData, build_tree, ensure_defaults,
    },
    database_id::new_id,
    timestamp::Timestamp,
};

/// Initialize the category table and indexes.
///
/// Names are unique per user, type and parent. Root categories need their own index because
/// SQLite treats every NULL `parent_id` as distinct.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id BLOB PRIMARY KEY,
            user_id BLOB REFERENCES user(id) ON DELETE CASCADE,
            parent_id BLOB REFERENCES category(id),
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
            is_default INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_category_root_name
            ON category(user_id, type, name) WHERE parent_id IS NULL;

        CREATE UNIQUE INDEX IF NOT EXISTS idx_category_child_name
            ON category(user_id, parent_id, type, name) WHERE parent_id IS NOT NULL;",
    )?;

    Ok(())
}

const SELECT_CATEGORY: &str = "SELECT id, user_id, parent_id, name, type, is_default, created_at, updated_at FROM category";

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        parent_id: row.get(2)?,
        name: row.get(3)?,
        entry_type: row.get(4)?,
        is_default: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Retrieve all of a user's categories as a flat list.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORY} WHERE user_id = ?1 ORDER BY type, name, rowid"
        ))?
        .query_map((user_id,), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the category does not exist or belongs to someone else.
pub fn get_owned_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!("{SELECT_CATEGORY} WHERE id = ?1 AND user_id = ?2"))?
        .query_row((category_id, user_id), map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound("Category not found".to_owned())
            }
            error => error.into(),
        })
}

/// Seed the default categories and return all of the user's categories as a sorted forest.
pub fn list_categories(
    user_id: UserID,
    defaults: &[DefaultCategory],
    connection: &Connection,
) -> Result<Vec<CategoryNode>, Error> {
    ensure_defaults(user_id, defaults, connection)?;

    let categories = get_categories(user_id, connection)?;

    Ok(build_tree(categories))
}

/// Create a category for `user_id`.
///
/// A subcategory takes the type of its parent. A root category must be given a type.
///
/// # Errors
///
/// This function will return a:
/// - [Error::Validation] if the name is blank or a root category has no type,
/// - [Error::NotFound] if the parent does not belong to the user,
/// - [Error::Conflict] if a sibling of the same type already has the name.
pub fn create_category(
    user_id: UserID,
    data: CreateCategoryData,
    defaults: &[DefaultCategory],
    connection: &Connection,
) -> Result<CategoryNode, Error> {
    ensure_defaults(user_id, defaults, connection)?;

    let name = CategoryName::new(&data.name)?;

    let (parent_id, entry_type) = match data.parent_id {
        Some(parent_id) => {
            let parent = get_owned_category(user_id, parent_id, connection)?;
            (Some(parent.id), parent.entry_type)
        }
        None => {
            let entry_type = data.entry_type.ok_or_else(|| {
                Error::Validation("Category type is required for top-level categories".to_owned())
            })?;
            (None, entry_type)
        }
    };

    let now = Timestamp::now();
    let category = Category {
        id: new_id(),
        user_id: Some(user_id),
        parent_id,
        name: name.to_string(),
        entry_type,
        is_default: false,
        created_at: now,
        updated_at: now,
    };

    connection.execute(
        "INSERT INTO category (id, user_id, parent_id, name, type, is_default, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)",
        (
            category.id,
            category.user_id,
            category.parent_id,
            &category.name,
            category.entry_type,
            category.created_at,
            category.updated_at,
        ),
    )?;

    Ok(CategoryNode::leaf(category))
}

/// Rename a category owned by `user_id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if the category does not belong to the user,
/// - [Error::Validation] if the category is a default category, no fields are given, or the new
///   name is blank,
/// - [Error::Conflict] if a sibling of the same type already has the name.
pub fn update_category(
    user_id: UserID,
    category_id: CategoryId,
    data: UpdateCategoryData,
    connection: &Connection,
) -> Result<CategoryNode, Error> {
    let mut category = get_owned_category(user_id, category_id, connection)?;

    if category.is_default {
        return Err(Error::Validation(
            "Default categories cannot be modified".to_owned(),
        ));
    }

    let Some(raw_name) = data.name else {
        return Err(Error::Validation(
            "At least one field is required to update a category".to_owned(),
        ));
    };

    let name = CategoryName::new(&raw_name)?;
    category.name = name.to_string();
    category.updated_at = Timestamp::now();

    connection.execute(
        "UPDATE category SET name = ?1, updated_at = ?2 WHERE id = ?3",
        (&category.name, category.updated_at, category.id),
    )?;

    Ok(CategoryNode::leaf(category))
}

/// Delete a category owned by `user_id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if the category does not belong to the user,
/// - [Error::Validation] if the category is a default category,
/// - [Error::Conflict] if the category still has subcategories.
pub fn delete_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let category = get_owned_category(user_id, category_id, connection)?;

    if category.is_default {
        return Err(Error::Validation(
            "Default categories cannot be removed".to_owned(),
        ));
    }

    let child_count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM category WHERE parent_id = ?1 AND user_id = ?2",
        (category_id, user_id),
        |row| row.get(0),
    )?;

    if child_count > 0 {
        return Err(Error::Conflict(
            "Remove subcategories before deleting this category".to_owned(),
        ));
    }

    connection.execute("DELETE FROM category WHERE id = ?1", (category_id,))?;

    Ok(())
}
