//! Pet domain model.
//!
//! # Responsibility
//! - Define the record shape returned by read paths.
//! - Define the closed gender enumeration and its validity predicate.
//!
//! # Invariants
//! - `id` is engine-assigned and never changes for a stored record.
//! - `Gender` only holds codes `0..=2`; other codes are unrepresentable.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Engine-assigned row identifier.
pub type PetId = i64;

/// Closed gender enumeration persisted as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl Gender {
    /// Persisted integer code.
    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Male => 1,
            Self::Female => 2,
        }
    }

    /// Decodes a persisted code. Returns `None` outside the enumeration.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    /// Returns whether `code` is a member of the enumeration.
    pub fn is_valid_code(code: i64) -> bool {
        Self::from_code(code).is_some()
    }
}

impl From<Gender> for i64 {
    fn from(value: Gender) -> Self {
        value.code()
    }
}

impl TryFrom<i64> for Gender {
    type Error = InvalidGenderCode;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or(InvalidGenderCode(value))
    }
}

/// Gender code outside the closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidGenderCode(pub i64);

impl Display for InvalidGenderCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid gender code {}; expected 0|1|2", self.0)
    }
}

impl Error for InvalidGenderCode {}

/// One stored pet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetRecord {
    /// Serialized as `_id` to match the table column.
    #[serde(rename = "_id")]
    pub id: PetId,
    pub name: String,
    pub breed: Option<String>,
    pub gender: Gender,
    /// Storage default is `0` when a create payload omits it.
    pub weight: i64,
}

#[cfg(test)]
mod tests {
    use super::{Gender, InvalidGenderCode, PetRecord};

    #[test]
    fn gender_codes_roundtrip_through_enumeration() {
        for gender in [Gender::Unknown, Gender::Male, Gender::Female] {
            assert_eq!(Gender::from_code(gender.code()), Some(gender));
        }
    }

    #[test]
    fn gender_validity_is_closed() {
        assert!(Gender::is_valid_code(0));
        assert!(Gender::is_valid_code(2));
        assert!(!Gender::is_valid_code(-1));
        assert!(!Gender::is_valid_code(3));
        assert_eq!(Gender::try_from(9), Err(InvalidGenderCode(9)));
    }

    #[test]
    fn record_serializes_with_column_names() {
        let record = PetRecord {
            id: 1,
            name: "Fido".to_string(),
            breed: None,
            gender: Gender::Male,
            weight: 20,
        };

        let json = serde_json::to_value(&record).expect("record should serialize");
        assert_eq!(json["_id"], 1);
        assert_eq!(json["gender"], 1);
        assert!(json["breed"].is_null());

        let decoded: PetRecord = serde_json::from_value(json).expect("record should decode");
        assert_eq!(decoded, record);
    }

    #[test]
    fn record_rejects_out_of_range_gender_on_decode() {
        let json = serde_json::json!({
            "_id": 3,
            "name": "Rex",
            "breed": "Husky",
            "gender": 5,
            "weight": 4
        });
        assert!(serde_json::from_value::<PetRecord>(json).is_err());
    }
}
