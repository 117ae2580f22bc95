//! Database operations for asset groups.

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};

use crate::{
    Error,
    asset::{AssetGroup, AssetGroupId, CreateAssetGroupData, validate_group_name},
    auth::UserID,
    currency::require_currency,
    database_id::new_id,
    timestamp::Timestamp,
};

/// The asset groups every user starts with.
pub const DEFAULT_ASSET_GROUPS: &[&str] = &[
    "Cash",
    "Accounts",
    "Debit card",
    "Savings",
    "Investments",
    "Insurance",
];

/// Create the asset group table.
///
/// # Errors
/// Returns an error if the table cannot be created.
pub fn create_asset_group_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS asset_group (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                is_default INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(user_id, name)
                )",
        (),
    )?;

    Ok(())
}

fn map_group_row(row: &Row) -> Result<AssetGroup, rusqlite::Error> {
    Ok(AssetGroup {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        is_default: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Give the user every group in `defaults` that they do not have yet.
///
/// Groups are matched by name, so an existing group with a default name is left as is.
pub fn ensure_default_groups(
    user_id: UserID,
    defaults: &[&str],
    connection: &Connection,
) -> Result<(), Error> {
    if defaults.is_empty() {
        return Ok(());
    }

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let now = Timestamp::now();

    {
        let mut statement = transaction.prepare(
            "INSERT INTO asset_group (id, user_id, name, is_default, created_at, updated_at)
            VALUES (?1, ?2, ?3, 1, ?4, ?4)
            ON CONFLICT (user_id, name) DO NOTHING",
        )?;

        for name in defaults {
            statement.execute((new_id(), user_id, name, now))?;
        }
    }

    transaction.commit()?;

    Ok(())
}

/// Retrieve the user's asset groups, oldest first.
pub fn get_asset_groups(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<AssetGroup>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, is_default, created_at, updated_at FROM asset_group
            WHERE user_id = ?1
            ORDER BY created_at, name",
        )?
        .query_map((user_id,), map_group_row)?
        .map(|maybe_group| maybe_group.map_err(|error| error.into()))
        .collect()
}

/// Seed the default groups and return all of the user's groups.
pub fn list_asset_groups(
    user_id: UserID,
    defaults: &[&str],
    connection: &Connection,
) -> Result<Vec<AssetGroup>, Error> {
    ensure_default_groups(user_id, defaults, connection)?;

    get_asset_groups(user_id, connection)
}

/// Retrieve an asset group owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the group does not exist or belongs to another user.
pub fn get_owned_asset_group(
    user_id: UserID,
    group_id: AssetGroupId,
    connection: &Connection,
) -> Result<AssetGroup, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, is_default, created_at, updated_at FROM asset_group
            WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((group_id, user_id), map_group_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound("Asset group not found".to_owned())
            }
            error => error.into(),
        })
}

/// Create an asset group for `user_id`.
///
/// The group is marked as default when its name is one of `defaults`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::Conflict] if the user has not set their currency or already has a group with the
///   name,
/// - [Error::Validation] if the name is blank or too long.
pub fn create_asset_group(
    user_id: UserID,
    data: CreateAssetGroupData,
    defaults: &[&str],
    connection: &Connection,
) -> Result<AssetGroup, Error> {
    require_currency(user_id, connection)?;
    ensure_default_groups(user_id, defaults, connection)?;

    let name = validate_group_name(&data.name)?;
    let now = Timestamp::now();
    let group = AssetGroup {
        id: new_id(),
        user_id,
        is_default: defaults.contains(&name.as_str()),
        name,
        created_at: now,
        updated_at: now,
    };

    connection.execute(
        "INSERT INTO asset_group (id, user_id, name, is_default, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            group.id,
            group.user_id,
            &group.name,
            group.is_default,
            group.created_at,
            group.updated_at,
        ),
    )?;

    Ok(group)
}

#[cfg(test)]
mod asset_group_tests {
    use crate::{
        Error,
        asset::{
            CreateAssetGroupData, DEFAULT_ASSET_GROUPS, create_asset_group, get_asset_groups,
            get_owned_asset_group, list_asset_groups,
        },
        test_utils::{
            create_test_user, create_test_user_with_currency, create_test_user_with_email,
            get_test_connection,
        },
    };

    fn group(name: &str) -> CreateAssetGroupData {
        CreateAssetGroupData {
            name: name.to_owned(),
        }
    }

    #[test]
    fn list_seeds_defaults_once() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);

        let first = list_asset_groups(user.id, DEFAULT_ASSET_GROUPS, &connection).unwrap();
        let second = list_asset_groups(user.id, DEFAULT_ASSET_GROUPS, &connection).unwrap();

        assert_eq!(first.len(), DEFAULT_ASSET_GROUPS.len());
        assert_eq!(first, second);
        assert!(first.iter().all(|group| group.is_default));
    }

    #[test]
    fn create_marks_default_names() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);

        let custom =
            create_asset_group(user.id, group(" Crypto "), &["Cash"], &connection).unwrap();
        let default_name = create_asset_group(user.id, group("Savings"), &["Savings"], &connection);

        assert_eq!(custom.name, "Crypto");
        assert!(!custom.is_default);
        // "Savings" was seeded as a default before the insert, so it is a duplicate.
        assert_eq!(
            default_name,
            Err(Error::Conflict(
                "You already have a group with this name".to_owned()
            ))
        );
    }

    #[test]
    fn default_flag_follows_given_defaults() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);

        let created = create_asset_group(user.id, group("Cash"), &[], &connection).unwrap();

        assert!(!created.is_default);
        assert_eq!(get_asset_groups(user.id, &connection).unwrap(), vec![created]);
    }

    #[test]
    fn create_requires_currency() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);

        let result =
            create_asset_group(user.id, group("Crypto"), DEFAULT_ASSET_GROUPS, &connection);

        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[test]
    fn foreign_group_is_not_found() {
        let connection = get_test_connection();
        let user = create_test_user_with_currency(&connection);
        let other_user = create_test_user_with_email(&connection, "other@x.com");
        let created = create_asset_group(user.id, group("Crypto"), &[], &connection).unwrap();

        assert_eq!(
            get_owned_asset_group(other_user.id, created.id, &connection),
            Err(Error::NotFound("Asset group not found".to_owned()))
        );
    }
}
