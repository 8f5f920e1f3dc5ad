//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage-engine contract the record store dispatches into.
//! - Isolate SQLite query details from routing and validation.
//!
//! # Invariants
//! - Repository SQL only ever names known `pets` columns.
//! - Caller predicates are bound through positional parameters.

pub mod pet_repo;
