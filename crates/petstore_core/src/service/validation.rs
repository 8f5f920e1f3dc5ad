//! Write-boundary validation for pet payloads.
//!
//! # Responsibility
//! - Enforce record invariants before any storage call is attempted.
//!
//! # Invariants
//! - Create checks every required field; update checks only present fields.
//! - `_id` is never accepted from a payload.
//! - The returned payload is what gets stored: `gender` and `weight` are
//!   bound as integers whatever form the caller supplied.

use crate::contract::{COLUMN_GENDER, COLUMN_ID, COLUMN_NAME, COLUMN_WEIGHT, WRITABLE_COLUMNS};
use crate::model::pet::Gender;
use crate::model::values::{ContentValues, FieldValue};
use crate::service::pet_provider::{ProviderError, ProviderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Create,
    Update,
}

/// Validates a full creation payload and returns it normalized.
///
/// # Errors
/// - `MissingRequiredField("name")` when name is absent, null or blank.
/// - `InvalidField("gender")` when gender is absent or outside the enumeration.
/// - `InvalidField("weight")` when weight is present but not an integer `>= 0`.
/// - `InvalidField(column)` for `_id` or unknown columns.
pub fn validate_insert(values: &ContentValues) -> ProviderResult<ContentValues> {
    validate(values, WriteMode::Create)
}

/// Validates a partial update payload. Absent fields are not checked.
pub fn validate_update(values: &ContentValues) -> ProviderResult<ContentValues> {
    validate(values, WriteMode::Update)
}

/// Checks `values` and rewrites accepted fields into their stored form:
/// `name` as text, `gender` and `weight` as integers.
fn validate(values: &ContentValues, mode: WriteMode) -> ProviderResult<ContentValues> {
    let mut normalized = values.clone();

    match values.get(COLUMN_NAME).map(present_text) {
        Some(Some(name)) => {
            normalized.put(COLUMN_NAME, name);
        }
        Some(None) => return Err(ProviderError::MissingRequiredField(COLUMN_NAME)),
        None if mode == WriteMode::Create => {
            return Err(ProviderError::MissingRequiredField(COLUMN_NAME));
        }
        None => {}
    }

    match values.get(COLUMN_GENDER).map(gender_code) {
        Some(Some(code)) => {
            normalized.put(COLUMN_GENDER, code);
        }
        Some(None) => return Err(ProviderError::InvalidField(COLUMN_GENDER.to_string())),
        None if mode == WriteMode::Create => {
            return Err(ProviderError::InvalidField(COLUMN_GENDER.to_string()));
        }
        None => {}
    }

    if let Some(weight) = values.get(COLUMN_WEIGHT) {
        let Some(weight) = weight.as_integer().filter(|value| *value >= 0) else {
            return Err(ProviderError::InvalidField(COLUMN_WEIGHT.to_string()));
        };
        normalized.put(COLUMN_WEIGHT, weight);
    }

    if let Some(column) = values
        .keys()
        .find(|column| *column == COLUMN_ID || !WRITABLE_COLUMNS.contains(column))
    {
        return Err(ProviderError::InvalidField(column.to_string()));
    }

    Ok(normalized)
}

fn present_text(value: &FieldValue) -> Option<String> {
    value.as_text().filter(|text| !text.trim().is_empty())
}

fn gender_code(value: &FieldValue) -> Option<i64> {
    value
        .as_integer()
        .filter(|code| Gender::is_valid_code(*code))
}
