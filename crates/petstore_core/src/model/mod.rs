//! Domain model for pet records and write payloads.
//!
//! # Responsibility
//! - Define the canonical `PetRecord` read model and the `Gender` enumeration.
//! - Define the loosely typed `ContentValues` payload used by write calls.
//!
//! # Invariants
//! - Record invariants are checked at the write boundary, not by these types.

pub mod pet;
pub mod values;
