//! Route handlers for categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{
        CategoryId, CreateCategoryData, DefaultCategory, UpdateCategoryData, create_category,
        delete_category, list_categories, update_category,
    },
    extract::{JsonBody, PathParam},
    response::{Data, created},
};

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The categories every user is given.
    pub default_categories: &'static [DefaultCategory],
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            default_categories: state.default_categories,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler that returns the current user's categories as a tree.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let forest = list_categories(user_id, state.default_categories, &connection)?;

    Ok(Data { data: forest }.into_response())
}

/// Route handler for creating a category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<CreateCategoryData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let node = create_category(user_id, data, state.default_categories, &connection)?;

    Ok(created(node))
}

/// Route handler for renaming a category.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    PathParam(category_id): PathParam<CategoryId>,
    JsonBody(data): JsonBody<UpdateCategoryData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let node = update_category(user_id, category_id, data, &connection)?;

    Ok(Data { data: node }.into_response())
}

/// Route handler for deleting a category.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    PathParam(category_id): PathParam<CategoryId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_category(user_id, category_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
