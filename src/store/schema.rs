use rusqlite::Connection;
use tracing::{info, warn};

pub const TABLE: &str = "simulation_results";
pub const IMAGE_COLUMN: &str = "graph_image_url";

/// Stored as `YYYY-MM-DD HH:MM:SS`, which sorts chronologically as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS simulation_results (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  timestamp TEXT NOT NULL,
  inclination REAL,
  heading REAL,
  rail_length REAL,
  cansat_mass REAL,
  drag_coeff REAL,
  burn_time REAL,
  avg_thrust REAL,
  elevation REAL,
  apogee REAL,
  graph_image_url TEXT
);
"#;

/// Outcome of the image-column check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnCheck {
    Present,
    Added,
    /// The check itself failed; the schema may still lack the column.
    Unverified(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatus {
    pub table_created: bool,
    pub image_column: ColumnCheck,
}

/// Create the results table if absent and add the image column to tables
/// that predate it. Safe to call any number of times.
///
/// Only table creation can fail; column-check errors are logged and reported
/// as [`ColumnCheck::Unverified`].
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<SchemaStatus> {
    let existed = table_exists(conn)?;
    conn.execute_batch(DDL)?;
    if !existed {
        info!(table = TABLE, "results table created");
    }

    let image_column = match ensure_image_column(conn) {
        Ok(check) => check,
        Err(e) => {
            warn!(table = TABLE, column = IMAGE_COLUMN, error = %e, "column check failed");
            ColumnCheck::Unverified(e.to_string())
        }
    };

    Ok(SchemaStatus { table_created: !existed, image_column })
}

/// Add the image column if the table lacks it.
pub fn ensure_image_column(conn: &Connection) -> rusqlite::Result<ColumnCheck> {
    if has_column(conn, TABLE, IMAGE_COLUMN)? {
        return Ok(ColumnCheck::Present);
    }
    match conn.execute_batch(&format!("ALTER TABLE {TABLE} ADD COLUMN {IMAGE_COLUMN} TEXT")) {
        Ok(()) => {
            info!(table = TABLE, column = IMAGE_COLUMN, "column added");
            Ok(ColumnCheck::Added)
        }
        // Another connection added it between the check and the ALTER
        Err(e) if e.to_string().contains("duplicate column name") => Ok(ColumnCheck::Present),
        Err(e) => Err(e),
    }
}

pub fn table_exists(conn: &Connection) -> rusqlite::Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [TABLE],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

pub fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
