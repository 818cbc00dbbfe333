//! Persistence gateway for the expense list.
//!
//! # Responsibility
//! - Load and save the full record sequence as one JSON blob.
//! - Keep SQL and serialization details inside the persistence boundary.
//!
//! # Invariants
//! - `save` replaces the whole blob in a single statement.
//! - `load` fails only when the blob itself is unreadable; single records
//!   that do not decode or break model invariants are skipped and logged.

use crate::db::DbError;
use crate::model::expense::ExpenseRecord;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Well-known slot name holding the expense list.
pub const EXPENSES_SLOT_KEY: &str = "expenses";

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Failure while reading or writing the stored expense list.
#[derive(Debug)]
pub enum PersistenceError {
    Db(DbError),
    /// Stored blob is not a JSON list.
    Corrupt(serde_json::Error),
    Encode(serde_json::Error),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Corrupt(err) => write!(f, "stored expense list is unreadable: {err}"),
            Self::Encode(err) => write!(f, "failed to encode expense list: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Corrupt(err) | Self::Encode(err) => Some(err),
        }
    }
}

impl From<DbError> for PersistenceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable storage contract for the record store.
pub trait ExpenseGateway {
    /// Returns the stored records in saved order, or an empty list when the
    /// slot was never written.
    fn load(&self) -> PersistenceResult<Vec<ExpenseRecord>>;
    /// Replaces the stored list with `records`.
    fn save(&self, records: &[ExpenseRecord]) -> PersistenceResult<()>;
}

/// Gateway storing the list as JSON in one `kv_slots` row.
pub struct SqliteExpenseGateway<'conn> {
    conn: &'conn Connection,
    key: String,
}

impl<'conn> SqliteExpenseGateway<'conn> {
    /// Creates a gateway over the default `expenses` slot.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_key(conn, EXPENSES_SLOT_KEY)
    }

    /// Creates a gateway over a caller-chosen slot.
    pub fn with_key(conn: &'conn Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn read_blob(&self) -> PersistenceResult<Option<String>> {
        let blob = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(blob)
    }
}

impl ExpenseGateway for SqliteExpenseGateway<'_> {
    fn load(&self) -> PersistenceResult<Vec<ExpenseRecord>> {
        let Some(blob) = self.read_blob()? else {
            info!(
                "event=slot_load module=repo status=ok key={} records=0 reason=empty_slot",
                self.key
            );
            return Ok(Vec::new());
        };

        let records = decode_records(&blob)?;
        info!(
            "event=slot_load module=repo status=ok key={} records={}",
            self.key,
            records.len()
        );
        Ok(records)
    }

    fn save(&self, records: &[ExpenseRecord]) -> PersistenceResult<()> {
        let blob = serde_json::to_string(records).map_err(PersistenceError::Encode)?;

        let result = self.conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), blob],
        );

        match result {
            Ok(_) => {
                info!(
                    "event=slot_save module=repo status=ok key={} records={} bytes={}",
                    self.key,
                    records.len(),
                    blob.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=slot_save module=repo status=error key={} error_code=slot_write_failed error={}",
                    self.key, err
                );
                Err(err.into())
            }
        }
    }
}

/// Decodes a stored blob, keeping every record that passes validation.
///
/// # Errors
/// - `Corrupt` when the blob is not a JSON list.
pub fn decode_records(blob: &str) -> PersistenceResult<Vec<ExpenseRecord>> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(blob).map_err(PersistenceError::Corrupt)?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let id = entry.get("id").and_then(serde_json::Value::as_i64);
        let checked = serde_json::from_value::<ExpenseRecord>(entry)
            .map_err(|err| err.to_string())
            .and_then(|record| {
                record
                    .validate()
                    .map(|()| record)
                    .map_err(|err| err.to_string())
            });
        match checked {
            Ok(record) => records.push(record),
            Err(reason) => warn!(
                "event=slot_load module=repo status=skipped index={} id={} error={}",
                index,
                id.map_or_else(|| "unknown".to_string(), |id| id.to_string()),
                reason
            ),
        }
    }
    Ok(records)
}
