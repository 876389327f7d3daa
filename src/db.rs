use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};
use tracing::warn;

use crate::error::Result;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the on-device store.
///
/// Holds only the file location. Every operation opens its own connection
/// and drops it before returning, whichever way it returns.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Point at a store file, creating its parent directory if needed.
    ///
    /// This does not create tables; call [`Database::ensure_schema`] once at
    /// startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // Cascades on labour_skills depend on this, and it is per-connection.
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    /// Run `f` inside one transaction on a fresh connection.
    ///
    /// Commits when `f` succeeds. Otherwise rolls back explicitly and returns
    /// the original error.
    pub(crate) fn write<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(operation, error = %rollback_err, "rollback failed");
                }
                warn!(operation, error = %err, "write rolled back");
                Err(err)
            }
        }
    }
}

/// `UPDATE table SET col = ?, ... WHERE id = ?`, returning rows changed.
///
/// Column names come from the per-entity field tables, never from callers.
pub(crate) fn update_columns(
    conn: &Connection,
    table: &'static str,
    assignments: &[(&'static str, Value)],
    id: i64,
) -> Result<usize> {
    let set = assignments
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE {table} SET {set} WHERE id = ?{}", assignments.len() + 1);

    let values = assignments
        .iter()
        .map(|(_, value)| value.clone())
        .chain(std::iter::once(Value::Integer(id)));
    Ok(conn.execute(&sql, params_from_iter(values))?)
}

/// Current time as ISO-8601 UTC with millisecond precision.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
