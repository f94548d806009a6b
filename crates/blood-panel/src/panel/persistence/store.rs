//! SQLite-backed structured store for finalized patient records.
//!
//! A connection is opened for each operation and dropped before returning,
//! so no handle outlives a single patient. Reads never create the database.

use super::{PersistenceError, ReportSink};
use crate::panel::report::views::StoreRecord;
use crate::panel::report::PatientRecord;
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS patient_reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name VARCHAR(100),
        age INTEGER,
        gender VARCHAR(10),
        abnormal_tests TEXT,
        diseases TEXT,
        doctor_advice TEXT
    );
";

#[derive(Debug, Clone)]
pub struct SqliteReportStore {
    path: PathBuf,
}

impl SqliteReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect_read_only(&self) -> Result<Connection, PersistenceError> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        debug!(path = %self.path.display(), "opened report store read-only");
        Ok(conn)
    }

    fn connect(&self) -> Result<Connection, PersistenceError> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %self.path.display(), "opened report store");
        Ok(conn)
    }

    pub fn insert(&self, row: &StoreRecord) -> Result<i64, PersistenceError> {
        let conn = self.connect()?;
        conn.execute(
            r"
            INSERT INTO patient_reports (
                name, age, gender, abnormal_tests, diseases, doctor_advice
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                row.name,
                row.age,
                row.gender,
                row.abnormal_tests,
                row.diseases,
                row.doctor_advice,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Every stored row, oldest first.
    pub fn records(&self) -> Result<Vec<StoreRecord>, PersistenceError> {
        let conn = self.connect_read_only()?;
        let mut stmt = conn.prepare(
            r"
            SELECT name, age, gender, abnormal_tests, diseases, doctor_advice
            FROM patient_reports
            ORDER BY id ASC
            ",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StoreRecord {
                    name: row.get(0)?,
                    age: row.get(1)?,
                    gender: row.get(2)?,
                    abnormal_tests: row.get(3)?,
                    diseases: row.get(4)?,
                    doctor_advice: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl ReportSink for SqliteReportStore {
    fn name(&self) -> &'static str {
        "report store"
    }

    fn persist(&self, record: &PatientRecord) -> Result<String, PersistenceError> {
        let id = self.insert(&record.store_record())?;
        info!(patient = %record.identity.name, id, "patient record stored");
        Ok(format!("{} (row {id})", self.path.display()))
    }
}
