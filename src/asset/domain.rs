//! Asset and asset group models.

use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, database_id::DatabaseId, timestamp::Timestamp};

/// Database identifier for an asset.
pub type AssetId = DatabaseId;

/// Database identifier for an asset group.
pub type AssetGroupId = DatabaseId;

/// The most characters an asset group name may have.
pub const MAX_GROUP_NAME_LENGTH: usize = 100;

/// A named bucket for assets, e.g. "Savings".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGroup {
    pub id: AssetGroupId,
    pub user_id: UserID,
    pub name: String,
    /// Whether the name is one of the groups every user starts with.
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Something the user owns and its current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: AssetId,
    pub user_id: UserID,
    pub name: String,
    /// The group the asset belongs to, included in full.
    pub group: Option<AssetGroup>,
    pub group_id: Option<AssetGroupId>,
    /// Never negative.
    pub current_value: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The request body for creating an asset group.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssetGroupData {
    pub name: String,
}

/// Trim `name` and check that it can be used as an asset group name.
///
/// # Errors
///
/// Returns an [Error::Validation] if the trimmed name is empty or too long.
pub fn validate_group_name(name: &str) -> Result<String, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::Validation("Group name is required".to_owned()));
    }

    if name.chars().count() > MAX_GROUP_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "Group name must be {MAX_GROUP_NAME_LENGTH} characters or less"
        )));
    }

    Ok(name.to_owned())
}

/// The request body for creating an asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetData {
    pub name: String,
    pub group_id: Option<AssetGroupId>,
    pub current_value: f64,
}

/// The request body for updating an asset. Missing fields are left unchanged and a `null`
/// `groupId` removes the asset from its group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetData {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::extract::deserialize_some")]
    pub group_id: Option<Option<AssetGroupId>>,
    pub current_value: Option<f64>,
}

/// The fields of an asset that the user controls, validated together.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFields {
    pub name: String,
    pub group_id: Option<AssetGroupId>,
    pub current_value: f64,
}

impl AssetFields {
    /// The fields of `asset` with the changes in `update` applied.
    pub fn merge(asset: &Asset, update: UpdateAssetData) -> Self {
        Self {
            name: update.name.unwrap_or_else(|| asset.name.clone()),
            group_id: update.group_id.unwrap_or(asset.group_id),
            current_value: update.current_value.unwrap_or(asset.current_value),
        }
    }

    /// Check the fields and trim the name.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the name is blank or the value is negative.
    pub fn validate(self) -> Result<Self, Error> {
        let name = self.name.trim().to_owned();

        if name.is_empty() {
            return Err(Error::Validation("Asset name is required".to_owned()));
        }

        if !(self.current_value.is_finite() && self.current_value >= 0.0) {
            return Err(Error::Validation(
                "Current value must not be negative".to_owned(),
            ));
        }

        Ok(Self { name, ..self })
    }
}

impl From<CreateAssetData> for AssetFields {
    fn from(data: CreateAssetData) -> Self {
        Self {
            name: data.name,
            group_id: data.group_id,
            current_value: data.current_value,
        }
    }
}
