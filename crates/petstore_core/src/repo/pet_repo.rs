//! Pet repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Translate predicate-scoped reads and writes into SQL over `pets`.
//! - Decode stored rows into `PetRecord` values.
//!
//! # Invariants
//! - Payload keys are checked against the known column list before any SQL
//!   text is built from them.
//! - Read paths report undecodable rows instead of masking them.

use crate::contract::{
    is_known_column, ALL_COLUMNS, COLUMN_BREED, COLUMN_GENDER, COLUMN_ID, COLUMN_NAME,
    COLUMN_WEIGHT, TABLE_NAME,
};
use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::pet::{Gender, PetId, PetRecord};
use crate::model::values::{ContentValues, FieldValue};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PET_SELECT_SQL: &str = "SELECT
    _id,
    name,
    breed,
    gender,
    weight
FROM pets";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for pet persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Payload names a column the table does not have.
    UnknownColumn(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
            Self::UnknownColumn(column) => write!(f, "unknown pets column: {column}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row predicate: an optional SQL `WHERE` body plus positional `?` arguments.
///
/// An absent or blank clause selects every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    clause: Option<String>,
    args: Vec<FieldValue>,
}

impl Selection {
    /// Selects every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<I, V>(clause: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self {
            clause: Some(clause.into()),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact match on the row identifier.
    pub fn by_id(id: PetId) -> Self {
        Self::new(format!("{COLUMN_ID} = ?"), [id])
    }

    pub fn clause(&self) -> Option<&str> {
        self.clause
            .as_deref()
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
    }

    pub fn args(&self) -> &[FieldValue] {
        &self.args
    }

    fn where_sql(&self) -> String {
        self.clause()
            .map(|clause| format!(" WHERE ({clause})"))
            .unwrap_or_default()
    }
}

/// Storage-engine contract behind the record store.
pub trait PetRepository {
    /// Returns rows matching `selection`, ordered by `sort_order` when given.
    fn query_pets(
        &self,
        selection: &Selection,
        sort_order: Option<&str>,
    ) -> RepoResult<Vec<PetRecord>>;
    /// Inserts one row and returns its engine-assigned id.
    fn insert_pet(&self, values: &ContentValues) -> RepoResult<PetId>;
    /// Applies `values` to every row matching `selection`; returns the count.
    fn update_pets(&self, values: &ContentValues, selection: &Selection) -> RepoResult<usize>;
    /// Deletes every row matching `selection`; returns the count.
    fn delete_pets(&self, selection: &Selection) -> RepoResult<usize>;
}

/// SQLite-backed pet repository.
pub struct SqlitePetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePetRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_pet_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PetRepository for SqlitePetRepository<'_> {
    fn query_pets(
        &self,
        selection: &Selection,
        sort_order: Option<&str>,
    ) -> RepoResult<Vec<PetRecord>> {
        let mut sql = format!("{PET_SELECT_SQL}{}", selection.where_sql());
        if let Some(order) = sort_order.map(str::trim).filter(|order| !order.is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values(selection.args())))?;
        let mut pets = Vec::new();

        while let Some(row) = rows.next()? {
            pets.push(parse_pet_row(row)?);
        }

        Ok(pets)
    }

    fn insert_pet(&self, values: &ContentValues) -> RepoResult<PetId> {
        let columns = checked_columns(values)?;

        if columns.is_empty() {
            self.conn
                .execute(&format!("INSERT INTO {TABLE_NAME} DEFAULT VALUES;"), [])?;
        } else {
            let placeholders = vec!["?"; columns.len()].join(", ");
            self.conn.execute(
                &format!(
                    "INSERT INTO {TABLE_NAME} ({}) VALUES ({placeholders});",
                    columns.join(", ")
                ),
                params_from_iter(values.iter().map(|(_, value)| Value::from(value))),
            )?;
        }

        Ok(self.conn.last_insert_rowid())
    }

    fn update_pets(&self, values: &ContentValues, selection: &Selection) -> RepoResult<usize> {
        let columns = checked_columns(values)?;
        if columns.is_empty() {
            return Ok(0);
        }

        let assignments = columns
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let bound = values
            .iter()
            .map(|(_, value)| Value::from(value))
            .chain(bind_values(selection.args()))
            .collect::<Vec<_>>();

        let changed = self.conn.execute(
            &format!(
                "UPDATE {TABLE_NAME} SET {assignments}{};",
                selection.where_sql()
            ),
            params_from_iter(bound),
        )?;
        Ok(changed)
    }

    fn delete_pets(&self, selection: &Selection) -> RepoResult<usize> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {TABLE_NAME}{};", selection.where_sql()),
            params_from_iter(bind_values(selection.args())),
        )?;
        Ok(changed)
    }
}

fn checked_columns(values: &ContentValues) -> RepoResult<Vec<&str>> {
    values
        .keys()
        .map(|column| {
            if is_known_column(column) {
                Ok(column)
            } else {
                Err(RepoError::UnknownColumn(column.to_string()))
            }
        })
        .collect()
}

fn bind_values(args: &[FieldValue]) -> impl Iterator<Item = Value> + '_ {
    args.iter().map(Value::from)
}

fn parse_pet_row(row: &Row<'_>) -> RepoResult<PetRecord> {
    let id: PetId = row.get(COLUMN_ID)?;
    let gender_code: i64 = row.get(COLUMN_GENDER)?;
    let gender = Gender::from_code(gender_code).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid gender code `{gender_code}` in pets.gender for row {id}"
        ))
    })?;

    Ok(PetRecord {
        id,
        name: row.get(COLUMN_NAME)?,
        breed: row.get(COLUMN_BREED)?,
        gender,
        weight: row.get(COLUMN_WEIGHT)?,
    })
}

fn ensure_pet_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, TABLE_NAME)? {
        return Err(RepoError::MissingRequiredTable(TABLE_NAME));
    }

    for &column in ALL_COLUMNS {
        if !table_has_column(conn, TABLE_NAME, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: TABLE_NAME,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
