mod render;
mod summary;
pub mod views;

pub use render::{format_value, render_master_report, render_patient_report};
pub use summary::{finalize, AdvisedFinding, MasterSummary, PatientRecord, ReportError};
