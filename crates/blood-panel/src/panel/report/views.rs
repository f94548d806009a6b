use super::super::domain::Status;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct TestResultEntry {
    pub test: String,
    pub value: f64,
    pub status: Status,
    pub status_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindingAdviceEntry {
    pub label: String,
    pub advice: String,
}

/// Per-patient report: every test result plus the advised findings.
#[derive(Debug, Clone, Serialize)]
pub struct PatientDetailView {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub results: Vec<TestResultEntry>,
    pub findings: Vec<FindingAdviceEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusLine {
    pub test: String,
    pub status: Status,
    pub status_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientSummaryBlock {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub abnormal_tests: Vec<StatusLine>,
    pub findings: Vec<FindingAdviceEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MasterSummaryView {
    pub patients: Vec<PatientSummaryBlock>,
}

/// Row shape of the `patient_reports` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub abnormal_tests: String,
    pub diseases: String,
    pub doctor_advice: String,
}
