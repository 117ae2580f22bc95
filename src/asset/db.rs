//! Database operations for assets.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    asset::{
        Asset, AssetFields, AssetGroup, AssetId, CreateAssetData, UpdateAssetData,
        get_owned_asset_group,
    },
    auth::UserID,
    currency::require_currency,
    database_id::new_id,
    timestamp::Timestamp,
};

/// Create the asset table.
///
/// # Errors
/// Returns an error if the table cannot be created.
pub fn create_asset_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS asset (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                group_id BLOB REFERENCES asset_group(id) ON DELETE SET NULL,
                name TEXT NOT NULL,
                current_value REAL NOT NULL CHECK (current_value >= 0),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

const SELECT_ASSET: &str = "SELECT a.id, a.user_id, a.group_id, a.name, a.current_value, a.created_at, a.updated_at,
        g.id, g.user_id, g.name, g.is_default, g.created_at, g.updated_at
    FROM asset a
    LEFT JOIN asset_group g ON g.id = a.group_id";

/// Map a row of [SELECT_ASSET] to an [Asset] with its group.
fn map_asset_row(row: &Row) -> Result<Asset, rusqlite::Error> {
    let group = match row.get::<_, Option<uuid::Uuid>>(7)? {
        Some(group_id) => Some(AssetGroup {
            id: group_id,
            user_id: row.get(8)?,
            name: row.get(9)?,
            is_default: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        }),
        None => None,
    };

    Ok(Asset {
        id: row.get(0)?,
        user_id: row.get(1)?,
        group_id: row.get(2)?,
        name: row.get(3)?,
        current_value: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        group,
    })
}

fn query_assets(
    user_id: UserID,
    order_by: &str,
    connection: &Connection,
) -> Result<Vec<Asset>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_ASSET} WHERE a.user_id = ?1 ORDER BY {order_by}"
        ))?
        .query_map((user_id,), map_asset_row)?
        .map(|maybe_asset| maybe_asset.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the user's assets, newest first.
pub fn get_assets(user_id: UserID, connection: &Connection) -> Result<Vec<Asset>, Error> {
    query_assets(user_id, "a.created_at DESC, a.rowid DESC", connection)
}

/// Retrieve the user's assets, most valuable first.
pub fn get_assets_by_value(user_id: UserID, connection: &Connection) -> Result<Vec<Asset>, Error> {
    query_assets(user_id, "a.current_value DESC, a.rowid", connection)
}

/// The total current value of the user's assets.
pub fn sum_asset_values(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(current_value), 0) FROM asset WHERE user_id = ?1",
            (user_id,),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Retrieve an asset owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the asset does not exist or belongs to another user.
pub fn get_owned_asset(
    user_id: UserID,
    asset_id: AssetId,
    connection: &Connection,
) -> Result<Asset, Error> {
    connection
        .prepare(&format!("{SELECT_ASSET} WHERE a.id = ?1 AND a.user_id = ?2"))?
        .query_row((asset_id, user_id), map_asset_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound("Asset not found".to_owned()),
            error => error.into(),
        })
}

/// Create an asset for `user_id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::Conflict] if the user has not set their currency,
/// - [Error::Validation] if the fields are invalid,
/// - [Error::NotFound] if the group does not belong to the user.
pub fn create_asset(
    user_id: UserID,
    data: CreateAssetData,
    connection: &Connection,
) -> Result<Asset, Error> {
    require_currency(user_id, connection)?;
    let fields = AssetFields::from(data).validate()?;

    let group = fields
        .group_id
        .map(|group_id| get_owned_asset_group(user_id, group_id, connection))
        .transpose()?;

    let now = Timestamp::now();
    let asset = Asset {
        id: new_id(),
        user_id,
        name: fields.name,
        group,
        group_id: fields.group_id,
        current_value: fields.current_value,
        created_at: now,
        updated_at: now,
    };

    connection.execute(
        "INSERT INTO asset (id, user_id, group_id, name, current_value, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            asset.id,
            asset.user_id,
            asset.group_id,
            &asset.name,
            asset.current_value,
            asset.created_at,
            asset.updated_at,
        ),
    )?;

    Ok(asset)
}

/// Apply the changes in `data` to an asset owned by `user_id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if the asset or the new group does not belong to the user,
/// - [Error::Validation] if the merged fields are invalid.
pub fn update_asset(
    user_id: UserID,
    asset_id: AssetId,
    data: UpdateAssetData,
    connection: &Connection,
) -> Result<Asset, Error> {
    let asset = get_owned_asset(user_id, asset_id, connection)?;
    let fields = AssetFields::merge(&asset, data).validate()?;

    let group = match fields.group_id {
        Some(group_id) if Some(group_id) != asset.group_id => {
            Some(get_owned_asset_group(user_id, group_id, connection)?)
        }
        Some(_) => asset.group.clone(),
        None => None,
    };

    let asset = Asset {
        name: fields.name,
        group,
        group_id: fields.group_id,
        current_value: fields.current_value,
        updated_at: Timestamp::now(),
        ..asset
    };

    connection.execute(
        "UPDATE asset SET group_id = ?1, name = ?2, current_value = ?3, updated_at = ?4 WHERE id = ?5",
        (
            asset.group_id,
            &asset.name,
            asset.current_value,
            asset.updated_at,
            asset.id,
        ),
    )?;

    Ok(asset)
}

/// Delete an asset owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the asset does not belong to the user.
pub fn delete_asset(
    user_id: UserID,
    asset_id: AssetId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM asset WHERE id = ?1 AND user_id = ?2",
        (asset_id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound("Asset not found".to_owned()));
    }

    Ok(())
}

#[cfg(test)]
mod asset_db_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        asset::{
            AssetGroup, CreateAssetData, CreateAssetGroupData, UpdateAssetData, create_asset,
            create_asset_group, delete_asset, get_assets, get_assets_by_value, get_owned_asset,
            sum_asset_values, update_asset,
        },
        auth::UserID,
        test_utils::{
            create_test_user, create_test_user_with_currency, create_test_user_with_email,
            get_test_connection, set_test_currency,
        },
    };

    fn asset(name: &str, current_value: f64) -> CreateAssetData {
        CreateAssetData {
            name: name.to_owned(),
            group_id: None,
            current_value,
        }
    }

    fn group(user_id: UserID, name: &str, connection: &Connection) -> AssetGroup {
        create_asset_group(
            user_id,
            CreateAssetGroupData {
                name: name.to_owned(),
            },
            &[],
            connection,
        )
        .unwrap()
    }

    #[test]
    fn create_embeds_group() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        let savings = group(user.id, "Savings", &connection);

        let created = create_asset(
            user.id,
            CreateAssetData {
                group_id: Some(savings.id),
                ..asset("Bank", 100.0)
            },
            &connection,
        )
        .unwrap();

        assert_eq!(created.group, Some(savings.clone()));
        assert_eq!(created.group_id, Some(savings.id));
        assert_eq!(get_owned_asset(user.id, created.id, &connection), Ok(created));
    }

    #[test]
    fn create_without_group() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);

        let created = create_asset(user.id, asset("Car", 0.0), &connection).unwrap();

        assert_eq!(created.group, None);
        assert_eq!(get_owned_asset(user.id, created.id, &connection), Ok(created));
    }

    #[test]
    fn create_rejects_foreign_group() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        let other_user = create_test_user_with_email(&connection, "other@x.com");
        set_test_currency(&connection, other_user.id);
        let foreign = group(other_user.id, "Theirs", &connection);

        let result = create_asset(
            user.id,
            CreateAssetData {
                group_id: Some(foreign.id),
                ..asset("Bank", 100.0)
            },
            &connection,
        );

        assert_eq!(
            result,
            Err(Error::NotFound("Asset group not found".to_owned()))
        );
    }

    #[test]
    fn create_requires_currency() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);

        assert!(matches!(
            create_asset(user.id, asset("Bank", 1.0), &connection),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn orderings_and_sum() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        for (name, value) in [("Small", 10.0), ("Large", 1000.0), ("Medium", 100.0)] {
            create_asset(user.id, asset(name, value), &connection).unwrap();
        }

        let newest_first: Vec<_> = get_assets(user.id, &connection)
            .unwrap()
            .into_iter()
            .map(|asset| asset.name)
            .collect();
        let by_value: Vec<_> = get_assets_by_value(user.id, &connection)
            .unwrap()
            .into_iter()
            .map(|asset| asset.name)
            .collect();

        assert_eq!(newest_first, vec!["Medium", "Large", "Small"]);
        assert_eq!(by_value, vec!["Large", "Medium", "Small"]);
        assert_eq!(sum_asset_values(user.id, &connection), Ok(1110.0));
    }

    #[test]
    fn update_moves_between_groups() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        let savings = group(user.id, "Savings", &connection);
        let created = create_asset(user.id, asset("Bank", 100.0), &connection).unwrap();

        let grouped = update_asset(
            user.id,
            created.id,
            UpdateAssetData {
                group_id: Some(Some(savings.id)),
                current_value: Some(150.0),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        assert_eq!(grouped.group, Some(savings));
        assert_eq!(grouped.current_value, 150.0);
        assert_eq!(
            get_owned_asset(user.id, created.id, &connection),
            Ok(grouped)
        );

        let ungrouped = update_asset(
            user.id,
            created.id,
            UpdateAssetData {
                group_id: Some(None),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        assert_eq!(ungrouped.group, None);
        assert_eq!(ungrouped.name, "Bank");
    }

    #[test]
    fn foreign_asset_is_not_found() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        let other_user = create_test_user_with_email(&connection, "other@x.com");
        let created = create_asset(user.id, asset("Bank", 100.0), &connection).unwrap();

        assert_eq!(
            update_asset(other_user.id, created.id, UpdateAssetData::default(), &connection),
            Err(Error::NotFound("Asset not found".to_owned()))
        );
        assert_eq!(
            delete_asset(other_user.id, created.id, &connection),
            Err(Error::NotFound("Asset not found".to_owned()))
        );

        delete_asset(user.id, created.id, &connection).unwrap();
        assert!(get_assets(user.id, &connection).unwrap().is_empty());
    }
}
