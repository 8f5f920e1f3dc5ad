//! Record store services.
//!
//! # Responsibility
//! - Route addressed CRUD requests, validate payloads and dispatch them to
//!   the repository layer.
//! - Keep callers decoupled from SQL and route-table details.

pub mod cursor;
pub mod pet_provider;
pub mod validation;
