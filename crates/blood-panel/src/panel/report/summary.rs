use super::super::domain::{PatientIdentity, StatusMap};
use super::super::rules::Finding;
use super::views::{
    FindingAdviceEntry, MasterSummaryView, PatientDetailView, PatientSummaryBlock, StatusLine,
    StoreRecord, TestResultEntry,
};
use serde::Serialize;

/// Raised when a record would be built from findings still missing advice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("finding '{label}' has no advice attached")]
    IncompleteRecord { label: String },
}

/// Finding whose advice has been collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisedFinding {
    pub label: String,
    pub advice: String,
}

/// Finalized outcome for one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRecord {
    pub identity: PatientIdentity,
    pub statuses: StatusMap,
    pub findings: Vec<AdvisedFinding>,
}

/// Builds the record for one patient; every finding must carry advice.
pub fn finalize(
    identity: PatientIdentity,
    statuses: StatusMap,
    findings: Vec<Finding>,
) -> Result<PatientRecord, ReportError> {
    let findings = findings
        .into_iter()
        .map(|finding| match finding.advice {
            Some(advice) => Ok(AdvisedFinding {
                label: finding.label,
                advice,
            }),
            None => Err(ReportError::IncompleteRecord {
                label: finding.label,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PatientRecord {
        identity,
        statuses,
        findings,
    })
}

impl PatientRecord {
    pub fn detail_view(&self) -> PatientDetailView {
        PatientDetailView {
            name: self.identity.name.clone(),
            age: self.identity.age,
            gender: self.identity.gender.clone(),
            results: self
                .statuses
                .entries()
                .iter()
                .map(|entry| TestResultEntry {
                    test: entry.test.clone(),
                    value: entry.value,
                    status: entry.status,
                    status_label: entry.status.label(),
                })
                .collect(),
            findings: self.advice_entries(),
        }
    }

    pub fn summary_block(&self) -> PatientSummaryBlock {
        PatientSummaryBlock {
            name: self.identity.name.clone(),
            age: self.identity.age,
            gender: self.identity.gender.clone(),
            abnormal_tests: self
                .statuses
                .abnormal()
                .map(|entry| StatusLine {
                    test: entry.test.clone(),
                    status: entry.status,
                    status_label: entry.status.label(),
                })
                .collect(),
            findings: self.advice_entries(),
        }
    }

    /// Flattened row for the `patient_reports` table.
    pub fn store_record(&self) -> StoreRecord {
        let abnormal_tests = self
            .statuses
            .abnormal()
            .map(|entry| format!("{}={}", entry.test, entry.status))
            .collect::<Vec<_>>()
            .join(", ");

        let diseases = self
            .findings
            .iter()
            .map(|finding| finding.label.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let doctor_advice = self
            .findings
            .iter()
            .map(|finding| format!("{}: {}", finding.label, finding.advice))
            .collect::<Vec<_>>()
            .join("; ");

        StoreRecord {
            name: self.identity.name.clone(),
            age: self.identity.age,
            gender: self.identity.gender.clone(),
            abnormal_tests,
            diseases,
            doctor_advice,
        }
    }

    fn advice_entries(&self) -> Vec<FindingAdviceEntry> {
        self.findings
            .iter()
            .map(|finding| FindingAdviceEntry {
                label: finding.label.clone(),
                advice: finding.advice.clone(),
            })
            .collect()
    }
}

/// Every record processed in a session, in processing order.
///
/// A summary only exists once the first patient has been finalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterSummary {
    records: Vec<PatientRecord>,
}

impl MasterSummary {
    pub fn start(first: PatientRecord) -> Self {
        Self {
            records: vec![first],
        }
    }

    pub fn append(mut self, record: PatientRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn view(&self) -> MasterSummaryView {
        MasterSummaryView {
            patients: self.records.iter().map(PatientRecord::summary_block).collect(),
        }
    }
}
