//! Route handlers for assets and asset groups.

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
    asset::{
        AssetId, CreateAssetData, CreateAssetGroupData, UpdateAssetData, create_asset,
        create_asset_group, delete_asset, get_assets, list_asset_groups, update_asset,
    },
    auth::UserID,
    extract::{JsonBody, PathParam},
    response::{Data, created},
};

/// The state needed by the asset and asset group endpoints.
#[derive(Debug, Clone)]
pub struct AssetState {
    /// The asset groups every user is given.
    pub default_asset_groups: &'static [&'static str],
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AssetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            default_asset_groups: state.default_asset_groups,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler that lists the current user's asset groups.
pub async fn get_asset_groups_endpoint(
    State(state): State<AssetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let groups = list_asset_groups(user_id, state.default_asset_groups, &connection)?;

    Ok(Data { data: groups }.into_response())
}

/// Route handler for creating an asset group.
pub async fn create_asset_group_endpoint(
    State(state): State<AssetState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<CreateAssetGroupData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let group = create_asset_group(user_id, data, state.default_asset_groups, &connection)?;

    Ok(created(group))
}

/// Route handler that lists the current user's assets.
pub async fn get_assets_endpoint(
    State(state): State<AssetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let assets = get_assets(user_id, &connection)?;

    Ok(Data { data: assets }.into_response())
}

/// Route handler for creating an asset.
pub async fn create_asset_endpoint(
    State(state): State<AssetState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<CreateAssetData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let asset = create_asset(user_id, data, &connection)?;

    Ok(created(asset))
}

/// Route handler for updating an asset.
pub async fn update_asset_endpoint(
    State(state): State<AssetState>,
    Extension(user_id): Extension<UserID>,
    PathParam(asset_id): PathParam<AssetId>,
    JsonBody(data): JsonBody<UpdateAssetData>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let asset = update_asset(user_id, asset_id, data, &connection)?;

    Ok(Data { data: asset }.into_response())
}

/// Route handler for deleting an asset.
pub async fn delete_asset_endpoint(
    State(state): State<AssetState>,
    Extension(user_id): Extension<UserID>,
    PathParam(asset_id): PathParam<AssetId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_asset(user_id, asset_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod asset_handler_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    use crate::{
        asset::{CreateAssetData, CreateAssetGroupData, DEFAULT_ASSET_GROUPS},
        auth::UserID,
        extract::JsonBody,
        test_utils::{create_test_user_with_currency, get_test_connection, parse_json_body},
    };

    use super::{
        AssetState, create_asset_endpoint, create_asset_group_endpoint, get_asset_groups_endpoint,
        get_assets_endpoint,
    };

    fn get_state() -> (AssetState, UserID) {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);

        (
            AssetState {
                default_asset_groups: DEFAULT_ASSET_GROUPS,
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn groups_are_seeded_on_list() {
        let (state, user_id) = get_state();

        let response = get_asset_groups_endpoint(State(state), Extension(user_id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_json_body(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn duplicate_group_is_conflict() {
        let (state, user_id) = get_state();

        let response = create_asset_group_endpoint(
            State(state),
            Extension(user_id),
            JsonBody(CreateAssetGroupData {
                name: "Cash".to_owned(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "message": "You already have a group with this name" })
        );
    }

    #[tokio::test]
    async fn created_asset_embeds_group() {
        let (state, user_id) = get_state();
        let response = create_asset_group_endpoint(
            State(state.clone()),
            Extension(user_id),
            JsonBody(CreateAssetGroupData {
                name: "Crypto".to_owned(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let group = parse_json_body(response).await["data"].clone();

        let response = create_asset_endpoint(
            State(state.clone()),
            Extension(user_id),
            JsonBody(CreateAssetData {
                name: "Bitcoin".to_owned(),
                group_id: Some(group["id"].as_str().unwrap().parse().unwrap()),
                current_value: 250.0,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = get_assets_endpoint(State(state), Extension(user_id))
            .await
            .into_response();
        let body = parse_json_body(response).await;
        assert_eq!(body["data"][0]["name"], "Bitcoin");
        assert_eq!(body["data"][0]["group"], group);
        assert_eq!(body["data"][0]["groupId"], group["id"]);
        assert_eq!(body["data"][0]["currentValue"], json!(250.0));
    }
}
