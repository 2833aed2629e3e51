//! SQLite results store: one row per completed simulation run.
//!
//! Every operation opens its own connection, so a [`ResultStore`] can be
//! shared across threads freely. Concurrent writers rely on SQLite locking
//! plus the configured busy timeout.

pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, Row};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::request::SimulationRequest;

pub use schema::{ColumnCheck, SchemaStatus, TABLE, TIMESTAMP_FORMAT};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("results store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("results store db error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A row about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub timestamp: NaiveDateTime,
    pub request: SimulationRequest,
    pub apogee: Option<f64>,
    pub graph_image_path: String,
}

/// A stored row, in table column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRecord {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub inclination: f64,
    pub heading: f64,
    pub rail_length: f64,
    pub cansat_mass: f64,
    pub drag_coefficient: f64,
    pub burn_time: f64,
    pub average_thrust: f64,
    pub elevation: f64,
    pub apogee: Option<f64>,
    /// `None` only for rows written before the column existed.
    pub graph_image_path: Option<String>,
}

impl SimulationRecord {
    pub fn request(&self) -> SimulationRequest {
        SimulationRequest {
            inclination: self.inclination,
            heading: self.heading,
            rail_length: self.rail_length,
            cansat_mass: self.cansat_mass,
            drag_coefficient: self.drag_coefficient,
            burn_time: self.burn_time,
            average_thrust: self.average_thrust,
            elevation: self.elevation,
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout: Duration::from_millis(5000) }
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-write connection; creates the parent directory and the file.
    fn open(&self) -> Result<Connection, StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    /// Read-only connection, or `None` when there is no store file yet.
    fn open_existing(&self) -> Result<Option<Connection>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(Some(conn))
    }

    pub fn ensure_schema(&self) -> Result<SchemaStatus, StorageError> {
        let conn = self.open()?;
        Ok(schema::ensure_schema(&conn)?)
    }

    /// Append one row and hand back the stored apogee.
    pub fn insert(&self, record: &NewRecord) -> Result<Option<f64>, StorageError> {
        let conn = self.open()?;
        if schema::ensure_image_column(&conn)? == ColumnCheck::Added {
            warn!(db_path = %self.path.display(), "image column was missing at insert time");
        }

        let r = &record.request;
        conn.execute(
            "INSERT INTO simulation_results (timestamp, inclination, heading, rail_length, cansat_mass,
                 drag_coeff, burn_time, avg_thrust, elevation, apogee, graph_image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                r.inclination,
                r.heading,
                r.rail_length,
                r.cansat_mass,
                r.drag_coefficient,
                r.burn_time,
                r.average_thrust,
                r.elevation,
                record.apogee,
                record.graph_image_path,
            ],
        )?;
        debug!(id = conn.last_insert_rowid(), apogee = ?record.apogee, "result stored");
        Ok(record.apogee)
    }

    /// All rows, newest first. Any failure yields an empty list; the cause is
    /// only visible in the logs.
    pub fn list_all(&self) -> Vec<SimulationRecord> {
        match self.try_list_all() {
            Ok(rows) => rows,
            Err(e) => {
                warn!(db_path = %self.path.display(), error = %e, "cannot read results");
                Vec::new()
            }
        }
    }

    /// Like [`list_all`](Self::list_all) but surfaces read errors. A missing
    /// store or table is still an empty list, and rows whose timestamp is NULL
    /// or unparsable are skipped with a warning.
    pub fn try_list_all(&self) -> Result<Vec<SimulationRecord>, StorageError> {
        let Some(conn) = self.open_existing()? else {
            info!(db_path = %self.path.display(), "results store does not exist");
            return Ok(Vec::new());
        };
        if !schema::table_exists(&conn)? {
            info!(db_path = %self.path.display(), "results table does not exist");
            return Ok(Vec::new());
        }

        let image = if schema::has_column(&conn, TABLE, schema::IMAGE_COLUMN)? {
            schema::IMAGE_COLUMN
        } else {
            "NULL"
        };
        let mut stmt = conn.prepare(&format!(
            "SELECT id, timestamp, inclination, heading, rail_length, cansat_mass, drag_coeff,
                    burn_time, avg_thrust, elevation, apogee, {image}
             FROM {TABLE}
             ORDER BY timestamp DESC, id DESC"
        ))?;

        let mut records = Vec::new();
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let raw = match row.get_ref(1)? {
                ValueRef::Null => None,
                ValueRef::Text(text) => Some(String::from_utf8_lossy(text).into_owned()),
                other => Some(format!("{other:?}")),
            };
            let Some(timestamp) = raw.as_deref().and_then(parse_timestamp) else {
                return Ok(Err((id, raw)));
            };
            Ok(Ok(SimulationRecord {
                id,
                timestamp,
                inclination: real(row, 2)?,
                heading: real(row, 3)?,
                rail_length: real(row, 4)?,
                cansat_mass: real(row, 5)?,
                drag_coefficient: real(row, 6)?,
                burn_time: real(row, 7)?,
                average_thrust: real(row, 8)?,
                elevation: real(row, 9)?,
                apogee: row.get(10)?,
                graph_image_path: row.get(11)?,
            }))
        })?;
        for row in rows {
            match row? {
                Ok(record) => records.push(record),
                Err((id, raw)) => warn!(id, timestamp = ?raw, "skipping row without a readable timestamp"),
            }
        }
        debug!(rows = records.len(), "results listed");
        Ok(records)
    }

    /// Drop the results table. The schema is not recreated.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        if !self.path.exists() {
            debug!(db_path = %self.path.display(), "nothing to clear");
            return Ok(());
        }
        let conn = self.open()?;
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {TABLE}"))?;
        info!(db_path = %self.path.display(), "results cleared");
        Ok(())
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

/// Nullable REAL column; NULL reads as NaN.
fn real(row: &Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or(f64::NAN))
}
