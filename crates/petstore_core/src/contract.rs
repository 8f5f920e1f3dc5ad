//! Static contract for the pet record store.
//!
//! # Responsibility
//! - Name the addressable authority/path, the table and its columns.
//! - Provide content-type tags and address builders shared by callers.
//!
//! # Invariants
//! - Column names match the `pets` table created by migration `0001`.
//! - Addresses built here always classify as a known route on a
//!   `RouteTable` registered for the same authority.

use crate::model::pet::PetId;

/// URI scheme accepted by the address router.
pub const CONTENT_SCHEME: &str = "content";
/// Default authority owning the pet addresses.
pub const CONTENT_AUTHORITY: &str = "com.example.petstore";
/// Path segment addressing the pet collection.
pub const PATH_PETS: &str = "pets";

/// Backing table name.
pub const TABLE_NAME: &str = "pets";

pub const COLUMN_ID: &str = "_id";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_BREED: &str = "breed";
pub const COLUMN_GENDER: &str = "gender";
pub const COLUMN_WEIGHT: &str = "weight";

/// All persisted columns in table order.
pub const ALL_COLUMNS: &[&str] = &[
    COLUMN_ID,
    COLUMN_NAME,
    COLUMN_BREED,
    COLUMN_GENDER,
    COLUMN_WEIGHT,
];

/// Columns a caller payload may write. `_id` is engine-assigned.
pub const WRITABLE_COLUMNS: &[&str] = &[COLUMN_NAME, COLUMN_BREED, COLUMN_GENDER, COLUMN_WEIGHT];

/// Content-type tag returned by type resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Zero or more pet records.
    PetList,
    /// Exactly one pet record.
    PetItem,
}

impl ContentType {
    /// Stable MIME-like string for this tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PetList => "vnd.cursor.dir/com.example.petstore/pets",
            Self::PetItem => "vnd.cursor.item/com.example.petstore/pets",
        }
    }
}

/// Returns `content://<authority>`.
pub fn base_content_uri(authority: &str) -> String {
    format!("{CONTENT_SCHEME}://{authority}")
}

/// Returns the collection address for `authority`.
pub fn collection_uri(authority: &str) -> String {
    format!("{}/{PATH_PETS}", base_content_uri(authority))
}

/// Returns the item address for `id` under `authority`.
pub fn item_uri(authority: &str, id: PetId) -> String {
    format!("{}/{id}", collection_uri(authority))
}

/// Collection address under the default authority.
pub fn content_uri() -> String {
    collection_uri(CONTENT_AUTHORITY)
}

/// Item address under the default authority.
pub fn content_item_uri(id: PetId) -> String {
    item_uri(CONTENT_AUTHORITY, id)
}

/// Returns whether `column` names a persisted pet column.
pub fn is_known_column(column: &str) -> bool {
    ALL_COLUMNS.contains(&column)
}

#[cfg(test)]
mod tests {
    use super::{content_item_uri, content_uri, is_known_column, ContentType};

    #[test]
    fn builders_produce_default_authority_addresses() {
        assert_eq!(content_uri(), "content://com.example.petstore/pets");
        assert_eq!(content_item_uri(7), "content://com.example.petstore/pets/7");
    }

    #[test]
    fn content_types_are_distinct() {
        assert_ne!(ContentType::PetList.as_str(), ContentType::PetItem.as_str());
        assert!(ContentType::PetList.as_str().ends_with("/pets"));
    }

    #[test]
    fn known_columns_cover_table_layout() {
        for column in ["_id", "name", "breed", "gender", "weight"] {
            assert!(is_known_column(column), "{column} should be known");
        }
        assert!(!is_known_column("owner"));
    }
}
