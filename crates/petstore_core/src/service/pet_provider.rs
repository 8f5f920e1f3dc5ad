//! Address-routed CRUD engine for pet records.
//!
//! # Responsibility
//! - Resolve each request address against the route table.
//! - Validate write payloads, dispatch to the repository and emit change
//!   notifications after writes that altered state.
//!
//! # Invariants
//! - Unrecognized addresses fail every operation with `UnsupportedAddress`.
//! - Item addresses always replace the caller selection with `_id = ?`.
//! - Validation completes before any repository call.
//! - At most one notification is emitted per call, and only when rows changed.

use crate::contract::ContentType;
use crate::model::pet::PetId;
use crate::model::values::ContentValues;
use crate::notify::ChangeNotifier;
use crate::repo::pet_repo::{PetRepository, RepoError, Selection};
use crate::router::{ContentAddress, Route, RouteTable};
use crate::service::cursor::Cursor;
use crate::service::validation::{validate_insert, validate_update};
use log::{debug, error, info, warn};
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors surfaced by provider operations.
#[derive(Debug)]
pub enum ProviderError {
    /// Address matches no registered route.
    UnsupportedAddress(String),
    /// Operation is not defined for the address shape.
    UnsupportedOperation {
        operation: &'static str,
        address: String,
    },
    MissingRequiredField(&'static str),
    InvalidField(String),
    /// Storage engine rejected an update, delete or query.
    Storage(RepoError),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedAddress(address) => write!(f, "unsupported address: {address}"),
            Self::UnsupportedOperation { operation, address } => {
                write!(f, "{operation} is not supported for {address}")
            }
            Self::MissingRequiredField(field) => write!(f, "pet requires a {field}"),
            Self::InvalidField(field) => write!(f, "pet requires a valid {field}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProviderError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// Resolved target of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Collection,
    Item(PetId),
}

/// Record store entry point.
///
/// Holds the storage handle, an immutable route table and the notification
/// sink for the process lifetime. Calls run synchronously on the caller's
/// thread; the storage engine owns reader/writer concurrency.
pub struct PetProvider<R: PetRepository, N: ChangeNotifier> {
    repo: R,
    routes: RouteTable,
    notifier: N,
}

impl<R: PetRepository, N: ChangeNotifier> PetProvider<R, N> {
    pub fn new(repo: R, routes: RouteTable, notifier: N) -> Self {
        Self {
            repo,
            routes,
            notifier,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Reads records addressed by `address`.
    ///
    /// Collection reads pass `selection` and `sort_order` through. Item reads
    /// discard `selection` in favour of an exact id match.
    pub fn query(
        &self,
        address: &str,
        selection: &Selection,
        sort_order: Option<&str>,
    ) -> ProviderResult<Cursor> {
        let (address, scope) = self.resolve(address)?;
        let selection = scoped_selection(scope, selection);
        let rows = self.repo.query_pets(&selection, sort_order)?;

        debug!(
            "event=pet_query module=provider status=ok address={} rows={}",
            address,
            rows.len()
        );
        let watch = self.notifier.watch(&address);
        Ok(Cursor::new(address, rows, watch))
    }

    /// Inserts one record through the collection address.
    ///
    /// Returns `Ok(None)` when the storage engine rejects the row; the failure
    /// is logged and no notification is sent.
    ///
    /// # Errors
    /// - `UnsupportedOperation` for item addresses.
    /// - Validation errors from [`validate_insert`].
    pub fn insert(&self, address: &str, values: &ContentValues) -> ProviderResult<Option<PetId>> {
        let (address, scope) = self.resolve(address)?;
        if scope != Scope::Collection {
            return Err(ProviderError::UnsupportedOperation {
                operation: "insert",
                address: address.to_string(),
            });
        }
        let values =
            validate_insert(values).inspect_err(|err| log_rejected("pet_insert", &address, err))?;

        match self.repo.insert_pet(&values) {
            Ok(id) => {
                info!(
                    "event=pet_insert module=provider status=ok address={} id={}",
                    address, id
                );
                self.notifier.notify_change(&address);
                Ok(Some(id))
            }
            Err(err) => {
                error!(
                    "event=pet_insert module=provider status=error address={} error_code=insert_failed error={}",
                    address, err
                );
                Ok(None)
            }
        }
    }

    /// Applies a partial update; returns the number of affected rows.
    ///
    /// An empty payload is a no-op that never reaches storage.
    pub fn update(
        &self,
        address: &str,
        values: &ContentValues,
        selection: &Selection,
    ) -> ProviderResult<usize> {
        let (address, scope) = self.resolve(address)?;
        let values =
            validate_update(values).inspect_err(|err| log_rejected("pet_update", &address, err))?;
        if values.is_empty() {
            return Ok(0);
        }

        let selection = scoped_selection(scope, selection);
        let changed = self.repo.update_pets(&values, &selection)?;
        self.finish_write("pet_update", &address, changed);
        Ok(changed)
    }

    /// Deletes addressed records; returns the number of affected rows.
    pub fn delete(&self, address: &str, selection: &Selection) -> ProviderResult<usize> {
        let (address, scope) = self.resolve(address)?;
        let selection = scoped_selection(scope, selection);
        let changed = self.repo.delete_pets(&selection)?;
        self.finish_write("pet_delete", &address, changed);
        Ok(changed)
    }

    /// Returns the content-type tag for `address`.
    pub fn get_type(&self, address: &str) -> ProviderResult<ContentType> {
        let (_, scope) = self.resolve(address)?;
        Ok(match scope {
            Scope::Collection => ContentType::PetList,
            Scope::Item(_) => ContentType::PetItem,
        })
    }

    fn resolve(&self, raw: &str) -> ProviderResult<(ContentAddress, Scope)> {
        let unsupported = || ProviderError::UnsupportedAddress(raw.trim().to_string());
        let address = ContentAddress::parse(raw).ok_or_else(unsupported)?;
        match self.routes.classify(&address) {
            Route::Collection => Ok((address, Scope::Collection)),
            Route::Item(id) => Ok((address, Scope::Item(id))),
            Route::Unrecognized => Err(unsupported()),
        }
    }

    fn finish_write(&self, event: &str, address: &ContentAddress, changed: usize) {
        info!(
            "event={} module=provider status=ok address={} changed={}",
            event, address, changed
        );
        if changed > 0 {
            self.notifier.notify_change(address);
        }
    }
}

fn scoped_selection(scope: Scope, caller: &Selection) -> Cow<'_, Selection> {
    match scope {
        Scope::Collection => Cow::Borrowed(caller),
        Scope::Item(id) => Cow::Owned(Selection::by_id(id)),
    }
}

fn log_rejected(event: &str, address: &ContentAddress, err: &ProviderError) {
    warn!(
        "event={} module=provider status=rejected address={} error={}",
        event, address, err
    );
}

#[cfg(test)]
mod tests {
    use super::{PetProvider, ProviderError};
    use crate::model::pet::{Gender, PetId, PetRecord};
    use crate::model::values::ContentValues;
    use crate::notify::ChangeNotifier;
    use crate::repo::pet_repo::{PetRepository, RepoError, RepoResult, Selection};
    use crate::router::{ContentAddress, RouteTable};
    use std::cell::RefCell;

    /// Repository double that records calls and can be told to fail inserts.
    #[derive(Default)]
    struct ScriptedRepo {
        calls: RefCell<Vec<String>>,
        fail_insert: bool,
        affected: usize,
    }

    impl PetRepository for ScriptedRepo {
        fn query_pets(
            &self,
            selection: &Selection,
            _sort_order: Option<&str>,
        ) -> RepoResult<Vec<PetRecord>> {
            self.calls
                .borrow_mut()
                .push(format!("query {:?}", selection.clause()));
            Ok(vec![PetRecord {
                id: 1,
                name: "Fido".to_string(),
                breed: None,
                gender: Gender::Male,
                weight: 20,
            }])
        }

        fn insert_pet(&self, _values: &ContentValues) -> RepoResult<PetId> {
            self.calls.borrow_mut().push("insert".to_string());
            if self.fail_insert {
                return Err(RepoError::InvalidData("constraint failed".to_string()));
            }
            Ok(1)
        }

        fn update_pets(&self, _values: &ContentValues, selection: &Selection) -> RepoResult<usize> {
            self.calls
                .borrow_mut()
                .push(format!("update {:?}", selection.clause()));
            Ok(self.affected)
        }

        fn delete_pets(&self, selection: &Selection) -> RepoResult<usize> {
            self.calls
                .borrow_mut()
                .push(format!("delete {:?}", selection.clause()));
            Ok(self.affected)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: RefCell<Vec<String>>,
    }

    impl ChangeNotifier for RecordingNotifier {
        fn notify_change(&self, address: &ContentAddress) {
            self.sent.borrow_mut().push(address.to_string());
        }
    }

    fn provider(repo: ScriptedRepo) -> PetProvider<ScriptedRepo, RecordingNotifier> {
        PetProvider::new(
            repo,
            RouteTable::for_authority("com.example.petstore").expect("routes"),
            RecordingNotifier::default(),
        )
    }

    const PETS: &str = "content://com.example.petstore/pets";
    const PET_ONE: &str = "content://com.example.petstore/pets/1";

    #[test]
    fn failed_insert_reports_no_identity_without_notifying() {
        let provider = provider(ScriptedRepo {
            fail_insert: true,
            ..ScriptedRepo::default()
        });
        let values = ContentValues::new().with("name", "Fido").with("gender", 1);

        let id = provider.insert(PETS, &values).expect("engine failure is not fatal");

        assert_eq!(id, None);
        assert!(provider.notifier().sent.borrow().is_empty());
    }

    #[test]
    fn validation_failure_never_reaches_repository() {
        let provider = provider(ScriptedRepo::default());

        let err = provider
            .insert(PETS, &ContentValues::new().with("gender", 1))
            .expect_err("missing name must fail");
        assert!(matches!(err, ProviderError::MissingRequiredField("name")));
        assert!(provider.repo.calls.borrow().is_empty());
    }

    #[test]
    fn rejected_update_skips_storage_and_notification() {
        let provider = provider(ScriptedRepo {
            affected: 1,
            ..ScriptedRepo::default()
        });

        let err = provider
            .update(PET_ONE, &ContentValues::new().with("gender", 9), &Selection::all())
            .expect_err("out-of-range gender must fail");
        assert!(matches!(err, ProviderError::InvalidField(ref field) if field == "gender"));

        let err = provider
            .update(
                PETS,
                &ContentValues::new().with("name", None::<String>),
                &Selection::all(),
            )
            .expect_err("null name must fail");
        assert!(matches!(err, ProviderError::MissingRequiredField("name")));

        assert!(provider.repo.calls.borrow().is_empty());
        assert!(provider.notifier().sent.borrow().is_empty());
    }

    #[test]
    fn empty_update_skips_storage_and_notification() {
        let provider = provider(ScriptedRepo {
            affected: 3,
            ..ScriptedRepo::default()
        });

        let changed = provider
            .update(PETS, &ContentValues::new(), &Selection::all())
            .expect("empty update is a no-op");

        assert_eq!(changed, 0);
        assert!(provider.repo.calls.borrow().is_empty());
        assert!(provider.notifier().sent.borrow().is_empty());
    }

    #[test]
    fn item_scope_overrides_caller_selection() {
        let provider = provider(ScriptedRepo {
            affected: 1,
            ..ScriptedRepo::default()
        });
        let caller = Selection::new("name = ?", ["Rex"]);

        provider
            .update(PET_ONE, &ContentValues::new().with("weight", 25), &caller)
            .expect("update");
        provider.delete(PET_ONE, &caller).expect("delete");
        provider.query(PET_ONE, &caller, None).expect("query");

        assert_eq!(
            *provider.repo.calls.borrow(),
            vec![
                "update Some(\"_id = ?\")".to_string(),
                "delete Some(\"_id = ?\")".to_string(),
                "query Some(\"_id = ?\")".to_string(),
            ]
        );
        assert_eq!(
            *provider.notifier().sent.borrow(),
            vec![PET_ONE.to_string(), PET_ONE.to_string()]
        );
    }

    #[test]
    fn zero_row_writes_do_not_notify() {
        let provider = provider(ScriptedRepo::default());

        assert_eq!(provider.delete(PETS, &Selection::all()).expect("delete"), 0);
        assert_eq!(
            provider
                .update(PETS, &ContentValues::new().with("breed", "Pug"), &Selection::all())
                .expect("update"),
            0
        );
        assert!(provider.notifier().sent.borrow().is_empty());
    }

    #[test]
    fn insert_on_item_address_is_unsupported() {
        let provider = provider(ScriptedRepo::default());
        let values = ContentValues::new().with("name", "Fido").with("gender", 1);

        let err = provider.insert(PET_ONE, &values).expect_err("item insert");
        assert!(matches!(
            err,
            ProviderError::UnsupportedOperation {
                operation: "insert",
                ..
            }
        ));
    }
}
