//! Tabular collection store contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose the worksheet-style primitives the tracker works against:
//!   read everything, clear, append, update one cell, replace wholesale.
//! - Keep SQL and cell encoding inside the persistence boundary.
//!
//! # Invariants
//! - `read_all` returns rows in append order; the first row is the header.
//! - Rows keep their `RowId` for their whole lifetime; positions are internal.
//! - `replace_all` on SQLite is one transaction: readers see the old rows or
//!   the new rows, never a mix.
//! - `summary_refreshes` keeps only the newest `SUMMARY_REFRESH_HISTORY`
//!   entries; older ones are pruned in the swap transaction.

use crate::db::{ensure_connection_ready, DbError};
use crate::model::collection::{Collection, RowId, StoredRow};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Number of summary swaps kept in `summary_refreshes`.
pub const SUMMARY_REFRESH_HISTORY: u32 = 50;

/// Errors raised by collection store implementations.
///
/// All of these are transport-level failures from the aggregator's point of
/// view and abort the current run.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Backing store refused or lost the request.
    Unavailable(String),
    RowNotFound {
        collection: Collection,
        row_id: RowId,
    },
    /// Persisted row cannot be decoded.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "collection store unavailable: {message}"),
            Self::RowNotFound { collection, row_id } => {
                write!(f, "row {row_id} not found in `{}`", collection.name())
            }
            Self::InvalidData(message) => write!(f, "invalid collection data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Worksheet-style access to the tracker collections.
pub trait CollectionStore {
    /// Returns every row including the header, in append order.
    fn read_all(&self, collection: Collection) -> StoreResult<Vec<StoredRow>>;
    /// Removes every row including the header.
    fn clear(&mut self, collection: Collection) -> StoreResult<()>;
    /// Appends one row and returns its new stable id.
    fn append_row(&mut self, collection: Collection, cells: Vec<String>) -> StoreResult<RowId>;
    /// Overwrites one cell, padding the row with blanks when `column` is past its end.
    fn update_cell(
        &mut self,
        collection: Collection,
        row_id: RowId,
        column: usize,
        value: String,
    ) -> StoreResult<()>;

    /// Swaps the full content of `collection` for `rows`.
    ///
    /// The default falls back to clear-then-append, which is observable
    /// mid-way. Implementations with transactions override it.
    fn replace_all(&mut self, collection: Collection, rows: Vec<Vec<String>>) -> StoreResult<()> {
        self.clear(collection)?;
        for cells in rows {
            self.append_row(collection, cells)?;
        }
        Ok(())
    }
}

impl<S: CollectionStore + ?Sized> CollectionStore for &mut S {
    fn read_all(&self, collection: Collection) -> StoreResult<Vec<StoredRow>> {
        (**self).read_all(collection)
    }

    fn clear(&mut self, collection: Collection) -> StoreResult<()> {
        (**self).clear(collection)
    }

    fn append_row(&mut self, collection: Collection, cells: Vec<String>) -> StoreResult<RowId> {
        (**self).append_row(collection, cells)
    }

    fn update_cell(
        &mut self,
        collection: Collection,
        row_id: RowId,
        column: usize,
        value: String,
    ) -> StoreResult<()> {
        (**self).update_cell(collection, row_id, column, value)
    }

    fn replace_all(&mut self, collection: Collection, rows: Vec<Vec<String>>) -> StoreResult<()> {
        (**self).replace_all(collection, rows)
    }
}

/// Bookkeeping entry written whenever the summary collection is swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRefresh {
    /// Epoch milliseconds.
    pub refreshed_at: i64,
    /// Data rows written, header excluded.
    pub row_count: u32,
}

/// SQLite-backed collection store.
pub struct SqliteCollectionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollectionStore<'conn> {
    /// Wraps a connection opened through `open_db*`.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Returns the most recent summary swap, if any.
    pub fn last_summary_refresh(&self) -> StoreResult<Option<SummaryRefresh>> {
        let refresh = self
            .conn
            .query_row(
                "SELECT refreshed_at, row_count
                 FROM summary_refreshes
                 ORDER BY id DESC
                 LIMIT 1;",
                [],
                |row| {
                    Ok(SummaryRefresh {
                        refreshed_at: row.get(0)?,
                        row_count: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(refresh)
    }
}

impl CollectionStore for SqliteCollectionStore<'_> {
    fn read_all(&self, collection: Collection) -> StoreResult<Vec<StoredRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT row_id, cells
             FROM collection_rows
             WHERE collection = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([collection.name()])?;
        let mut stored = Vec::new();
        while let Some(row) = rows.next()? {
            let row_id: String = row.get(0)?;
            let cells: String = row.get(1)?;
            stored.push(StoredRow {
                id: parse_row_id(&row_id)?,
                cells: decode_cells(&cells)?,
            });
        }
        Ok(stored)
    }

    fn clear(&mut self, collection: Collection) -> StoreResult<()> {
        let removed = self.conn.execute(
            "DELETE FROM collection_rows WHERE collection = ?1;",
            [collection.name()],
        )?;
        debug!(
            "event=collection_clear module=store status=ok collection={} rows={removed}",
            collection.name()
        );
        Ok(())
    }

    fn append_row(&mut self, collection: Collection, cells: Vec<String>) -> StoreResult<RowId> {
        let row_id = Uuid::new_v4();
        insert_row(self.conn, collection, row_id, &cells)?;
        Ok(row_id)
    }

    fn update_cell(
        &mut self,
        collection: Collection,
        row_id: RowId,
        column: usize,
        value: String,
    ) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let encoded: Option<String> = tx
            .query_row(
                "SELECT cells
                 FROM collection_rows
                 WHERE row_id = ?1
                   AND collection = ?2;",
                params![row_id.to_string(), collection.name()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(encoded) = encoded else {
            return Err(StoreError::RowNotFound { collection, row_id });
        };

        let mut cells = decode_cells(&encoded)?;
        if cells.len() <= column {
            cells.resize(column + 1, String::new());
        }
        cells[column] = value;

        tx.execute(
            "UPDATE collection_rows
             SET cells = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE row_id = ?1;",
            params![row_id.to_string(), encode_cells(&cells)?],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn replace_all(&mut self, collection: Collection, rows: Vec<Vec<String>>) -> StoreResult<()> {
        let started_at = Instant::now();
        let row_count = rows.len();
        let result = replace_in_transaction(self.conn, collection, &rows);
        match &result {
            Ok(()) => debug!(
                "event=collection_replace module=store status=ok collection={} rows={row_count} duration_ms={}",
                collection.name(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=collection_replace module=store status=error collection={} rows={row_count} duration_ms={} error={err}",
                collection.name(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

fn replace_in_transaction(
    conn: &Connection,
    collection: Collection,
    rows: &[Vec<String>],
) -> StoreResult<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    tx.execute(
        "DELETE FROM collection_rows WHERE collection = ?1;",
        [collection.name()],
    )?;
    for cells in rows {
        insert_row(&tx, collection, Uuid::new_v4(), cells)?;
    }
    if collection == Collection::Summary {
        tx.execute(
            "INSERT INTO summary_refreshes (row_count) VALUES (?1);",
            [rows.len().saturating_sub(1) as i64],
        )?;
        tx.execute(
            "DELETE FROM summary_refreshes
             WHERE id NOT IN (
                SELECT id
                FROM summary_refreshes
                ORDER BY id DESC
                LIMIT ?1
             );",
            [SUMMARY_REFRESH_HISTORY],
        )?;
    }
    tx.commit()?;
    Ok(())
}

fn insert_row(
    conn: &Connection,
    collection: Collection,
    row_id: RowId,
    cells: &[String],
) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO collection_rows (row_id, collection, position, cells)
         VALUES (
            ?1,
            ?2,
            (SELECT COALESCE(MAX(position), -1) + 1
             FROM collection_rows
             WHERE collection = ?2),
            ?3
         );",
        params![row_id.to_string(), collection.name(), encode_cells(cells)?],
    )?;
    Ok(())
}

fn encode_cells(cells: &[String]) -> StoreResult<String> {
    serde_json::to_string(cells)
        .map_err(|err| StoreError::InvalidData(format!("cannot encode row cells: {err}")))
}

fn decode_cells(value: &str) -> StoreResult<Vec<String>> {
    serde_json::from_str(value).map_err(|err| {
        StoreError::InvalidData(format!(
            "invalid cells value in collection_rows.cells: {err}"
        ))
    })
}

fn parse_row_id(value: &str) -> StoreResult<RowId> {
    Uuid::parse_str(value).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid row id `{value}` in collection_rows.row_id"
        ))
    })
}
