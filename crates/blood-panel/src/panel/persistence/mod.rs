mod file;
mod store;

pub use file::{report_file_name, FileReportSink, MASTER_REPORT_FILE};
pub use store::SqliteReportStore;

use super::report::{MasterSummary, PatientRecord};

/// Output boundary for finalized records.
///
/// Sinks are independent: the session reports each failure on its own and
/// keeps going with the remaining sinks and patients.
pub trait ReportSink {
    fn name(&self) -> &'static str;

    /// Stores one record and returns where it went (a path, a row id).
    fn persist(&self, record: &PatientRecord) -> Result<String, PersistenceError>;

    /// Session-end hook receiving every processed record.
    fn finish(&self, _summary: &MasterSummary) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Sink that stored a record, with the location it reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReceipt {
    pub sink: &'static str,
    pub location: String,
}

/// Sink that could not store a record; the record itself is still kept.
#[derive(Debug)]
pub struct SinkFailure {
    pub sink: &'static str,
    pub error: PersistenceError,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("report store error: {0}")]
    Database(#[from] rusqlite::Error),
}
