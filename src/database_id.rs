//! Database ID type definition.

use uuid::Uuid;

/// Alias for the UUID type used for mapping to database IDs.
///
/// IDs are stored as 16 byte BLOBs in SQLite and serialized as hyphenated
/// strings in JSON.
pub type DatabaseId = Uuid;

/// Generate a new, random ID for a row that is about to be inserted.
pub fn new_id() -> DatabaseId {
    Uuid::new_v4()
}
