//! Assets are things the user owns, optionally sorted into groups.

mod db;
mod domain;
mod group;
mod handlers;

pub use db::{
    create_asset, create_asset_table, delete_asset, get_assets, get_assets_by_value,
    get_owned_asset, sum_asset_values, update_asset,
};
pub use domain::{
    Asset, AssetFields, AssetGroup, AssetGroupId, AssetId, CreateAssetData, CreateAssetGroupData,
    MAX_GROUP_NAME_LENGTH, UpdateAssetData, validate_group_name,
};
pub use group::{
    DEFAULT_ASSET_GROUPS, create_asset_group, create_asset_group_table, ensure_default_groups,
    get_asset_groups, get_owned_asset_group, list_asset_groups,
};
pub use handlers::{
    create_asset_endpoint, create_asset_group_endpoint, delete_asset_endpoint,
    get_asset_groups_endpoint, get_assets_endpoint, update_asset_endpoint,
};
