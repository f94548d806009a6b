//! Blood panel interpretation: reference ranges, status classification,
//! rule-based findings, and the report structures handed to persistence.

pub mod classifier;
pub mod domain;
pub mod intake;
pub mod persistence;
pub mod reference;
pub mod report;
pub mod rules;
pub mod session;

#[cfg(test)]
mod tests;

pub use classifier::{classify, classify_panel, ClassificationError};
pub use domain::{PatientIdentity, Status, StatusEntry, StatusMap, TestDefinition, TestReading};
pub use intake::{ConsoleIntake, IntakeError, PatientIntake, ValidationError};
pub use persistence::{
    FileReportSink, PersistenceError, ReportSink, SinkFailure, SinkReceipt, SqliteReportStore,
};
pub use reference::{ReferenceError, ReferenceTable};
pub use report::{finalize, AdvisedFinding, MasterSummary, PatientRecord, ReportError};
pub use rules::{DiseaseRule, Finding, RuleEngine, NO_MAJOR_DISEASE};
pub use session::{PanelSession, PatientError, PatientOutcome, SessionReport};
