//! Dashboard HTTP handler.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::{DateWindow, get_overview},
    extract::QueryParams,
    response::Data,
    timestamp::Timestamp,
};

/// The state needed for computing the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The optional date window, as dates (`2024-01-31`) or RFC 3339 date times.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// Route handler for the dashboard overview.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<DashboardQuery>,
) -> Result<Response, Error> {
    let window = DateWindow::new(query.from, query.to)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let overview = get_overview(user_id, window, &connection)?;

    Ok(Data { data: overview }.into_response())
}
