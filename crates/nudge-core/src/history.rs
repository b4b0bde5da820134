//! Append-only log of applied adjustments, backed by SQLite.
//!
//! # Table design
//!
//! ```text
//! adjustments(id INTEGER PRIMARY KEY AUTOINCREMENT,
//!             magnitude REAL, sign TEXT ('+' | '-'), timestamp TEXT)
//! ```
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! width, so text ordering equals time ordering. `AUTOINCREMENT` keeps ids
//! strictly increasing even across deletions made outside this crate.
//!
//! A store is `Open` until [`HistoryStore::close`] is called. It is then
//! `Closed` for good, and every operation returns [`NudgeError::StoreClosed`].

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::delta::{Delta, Sign};
use crate::error::{InputError, NudgeError, Result};

pub const DEFAULT_RECENT_LIMIT: usize = 10;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS adjustments (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        magnitude REAL NOT NULL,
        sign      TEXT NOT NULL CHECK (sign IN ('+', '-')),
        timestamp TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_adjustments_recent
        ON adjustments (timestamp DESC, id DESC);
";

// ---------------------------------------------------------------------------
// AdjustmentEvent
// ---------------------------------------------------------------------------

/// One persisted adjustment. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentEvent {
    pub id: i64,
    pub magnitude: f64,
    pub sign: Sign,
    pub timestamp: DateTime<Utc>,
}

impl AdjustmentEvent {
    pub fn delta(&self) -> Delta {
        Delta {
            magnitude: self.magnitude,
            sign: self.sign,
        }
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// HistoryStore
// ---------------------------------------------------------------------------

pub struct HistoryStore {
    conn: Option<Connection>,
}

impl HistoryStore {
    /// Open or create the history database at `path`, creating parent
    /// directories and the schema as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            warn!(path = %path.display(), mode = %mode, "history store not in WAL mode");
        }
        let store = Self::init(conn)?;
        debug!(path = %path.display(), "history store opened");
        Ok(store)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(NudgeError::StoreClosed)
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Append one event and return its id.
    ///
    /// The insert and the id read-back share one transaction.
    pub fn record(&self, magnitude: f64, sign: Sign, timestamp: DateTime<Utc>) -> Result<i64> {
        let conn = self.conn()?;
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(InputError::InvalidMagnitude(magnitude).into());
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO adjustments (magnitude, sign, timestamp) VALUES (?1, ?2, ?3)",
            params![magnitude, sign.as_str(), format_timestamp(timestamp)],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(id, magnitude, sign = %sign, "adjustment recorded");
        Ok(id)
    }

    /// Up to `limit` events, newest first. Ties on timestamp go to the higher id.
    pub fn recent(&self, limit: usize) -> Result<Vec<AdjustmentEvent>> {
        let conn = self.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = conn.prepare(
            "SELECT id, magnitude, sign, timestamp FROM adjustments
             ORDER BY timestamp DESC, id DESC
             LIMIT ?1",
        )?;
        let events = stmt
            .query_map(params![limit], |row| {
                let sign_text: String = row.get(2)?;
                let sign = sign_text.parse::<Sign>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                })?;
                let ts_text: String = row.get(3)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_text)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                    })?
                    .with_timezone(&Utc);
                Ok(AdjustmentEvent {
                    id: row.get(0)?,
                    magnitude: row.get(1)?,
                    sign,
                    timestamp,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    /// Total number of recorded events.
    pub fn count(&self) -> Result<u64> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM adjustments", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// Release the database handle. The store stays closed afterwards.
    pub fn close(&mut self) -> Result<()> {
        let conn = self.conn.take().ok_or(NudgeError::StoreClosed)?;
        conn.close().map_err(|(_, e)| NudgeError::Persistence(e))?;
        debug!("history store closed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
