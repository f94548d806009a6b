use super::{PersistenceError, ReportSink};
use crate::panel::report::{
    render_master_report, render_patient_report, MasterSummary, PatientRecord,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MASTER_REPORT_FILE: &str = "master_blood_report.txt";
const PATIENT_REPORT_SUFFIX: &str = "_blood_report.txt";

/// `Asha Rao` becomes `asha_rao_blood_report.txt`.
pub fn report_file_name(patient_name: &str) -> String {
    format!(
        "{}{PATIENT_REPORT_SUFFIX}",
        patient_name.to_lowercase().replace(' ', "_")
    )
}

/// Writes one text report per patient and the master report at session end.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    directory: PathBuf,
}

impl FileReportSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn patient_report_path(&self, patient_name: &str) -> PathBuf {
        self.directory.join(report_file_name(patient_name))
    }

    pub fn master_report_path(&self) -> PathBuf {
        self.directory.join(MASTER_REPORT_FILE)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PersistenceError> {
        let io_error = |source| PersistenceError::Io {
            path: path.display().to_string(),
            source,
        };
        fs::create_dir_all(&self.directory).map_err(io_error)?;
        fs::write(path, contents).map_err(io_error)
    }
}

impl ReportSink for FileReportSink {
    fn name(&self) -> &'static str {
        "report file"
    }

    fn persist(&self, record: &PatientRecord) -> Result<String, PersistenceError> {
        let path = self.patient_report_path(&record.identity.name);
        self.write(&path, &render_patient_report(&record.detail_view()))?;
        info!(patient = %record.identity.name, path = %path.display(), "patient report saved");
        Ok(path.display().to_string())
    }

    fn finish(&self, summary: &MasterSummary) -> Result<(), PersistenceError> {
        let path = self.master_report_path();
        self.write(&path, &render_master_report(&summary.view()))?;
        info!(patients = summary.len(), path = %path.display(), "master summary report saved");
        Ok(())
    }
}
