//! Core of the pet record store.
//! Address-routed CRUD over a single SQLite table, with change notification.

pub mod config;
pub mod contract;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod router;
pub mod service;

pub use config::StoreConfig;
pub use contract::ContentType;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::pet::{Gender, InvalidGenderCode, PetId, PetRecord};
pub use model::values::{ContentValues, FieldValue};
pub use notify::{ChangeHub, ChangeNotifier, ChangeWatch, NoopNotifier};
pub use repo::pet_repo::{PetRepository, RepoError, RepoResult, Selection, SqlitePetRepository};
pub use router::{ContentAddress, Route, RouteError, RouteKind, RouteTable};
pub use service::cursor::Cursor;
pub use service::pet_provider::{PetProvider, ProviderError, ProviderResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
