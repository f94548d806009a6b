use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::panel::domain::{PatientIdentity, Status, StatusMap, TestDefinition, TestReading};
use crate::panel::intake::{IntakeError, PatientIntake};
use crate::panel::persistence::{PersistenceError, ReportSink, SinkFailure, SinkReceipt};
use crate::panel::reference::ReferenceTable;
use crate::panel::report::{finalize, MasterSummary, PatientRecord};
use crate::panel::rules::Finding;

pub(crate) fn reference_table() -> ReferenceTable {
    ReferenceTable::standard()
}

/// Readings for the standard table, values in declaration order.
pub(crate) fn readings(values: [f64; 6]) -> Vec<TestReading> {
    reference_table()
        .definitions()
        .iter()
        .zip(values)
        .map(|(definition, value)| TestReading::new(definition.name.clone(), value))
        .collect()
}

pub(crate) fn status_map_from<const N: usize>(entries: [(&'static str, Status); N]) -> StatusMap {
    entries.into_iter().collect()
}

pub(crate) fn all_normal() -> StatusMap {
    reference_table()
        .definitions()
        .iter()
        .fold(StatusMap::default(), |mut map, definition| {
            map.insert(&definition.name, definition.low, Status::Normal);
            map
        })
}

pub(crate) fn labels(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|finding| finding.label.as_str()).collect()
}

pub(crate) fn labels_of(record: &PatientRecord) -> Vec<&str> {
    record
        .findings
        .iter()
        .map(|finding| finding.label.as_str())
        .collect()
}

pub(crate) fn identity(name: &str) -> PatientIdentity {
    PatientIdentity::new(name, 42, "Female")
}

pub(crate) fn advised_record(
    name: &str,
    statuses: StatusMap,
    findings: &[(&str, &str)],
) -> PatientRecord {
    let findings = findings
        .iter()
        .map(|(label, advice)| Finding::new(*label).with_advice(*advice))
        .collect();
    finalize(identity(name), statuses, findings).expect("advice supplied for every finding")
}

/// Patient queued on a [`ScriptedIntake`].
struct ScriptedPatient {
    identity: PatientIdentity,
    values: VecDeque<f64>,
    misnamed: Option<&'static str>,
}

/// Intake replaying canned patients; advice answers are always blank.
///
/// Running out of values mid-patient behaves like closed console input.
#[derive(Default)]
pub(crate) struct ScriptedIntake {
    patients: VecDeque<ScriptedPatient>,
    current: Option<ScriptedPatient>,
    guidance: Vec<Option<String>>,
    acknowledged: Vec<usize>,
}

impl ScriptedIntake {
    pub(crate) fn patient(self, name: &str, values: [f64; 6]) -> Self {
        self.queue(name, &values, None)
    }

    /// Only the first `values.len()` readings are ever answered.
    pub(crate) fn patient_cut_short(self, name: &str, values: &[f64]) -> Self {
        self.queue(name, values, None)
    }

    /// The reading for `test` comes back under a different name.
    pub(crate) fn patient_misnaming(
        self,
        name: &str,
        values: [f64; 6],
        test: &'static str,
    ) -> Self {
        self.queue(name, &values, Some(test))
    }

    fn queue(mut self, name: &str, values: &[f64], misnamed: Option<&'static str>) -> Self {
        self.patients.push_back(ScriptedPatient {
            identity: identity(name),
            values: values.iter().copied().collect(),
            misnamed,
        });
        self
    }

    pub(crate) fn guidance_seen(&self) -> Vec<Option<String>> {
        self.guidance.clone()
    }

    pub(crate) fn acknowledged_failures(&self) -> Vec<usize> {
        self.acknowledged.clone()
    }
}

impl PatientIntake for ScriptedIntake {
    fn next_patient(&mut self) -> Result<Option<PatientIdentity>, IntakeError> {
        self.current = self.patients.pop_front();
        Ok(self
            .current
            .as_ref()
            .map(|patient| patient.identity.clone()))
    }

    fn reading(&mut self, definition: &TestDefinition) -> Result<TestReading, IntakeError> {
        let patient = self
            .current
            .as_mut()
            .ok_or_else(|| IntakeError::Closed(definition.name.clone()))?;
        let value = patient
            .values
            .pop_front()
            .ok_or_else(|| IntakeError::Closed(definition.name.clone()))?;

        let test = match patient.misnamed {
            Some(test) if test == definition.name => format!("{test} (retest)"),
            _ => definition.name.clone(),
        };
        Ok(TestReading::new(test, value))
    }

    fn advice(
        &mut self,
        _finding: &Finding,
        guidance: Option<&str>,
    ) -> Result<String, IntakeError> {
        self.guidance.push(guidance.map(str::to_string));
        Ok(String::new())
    }

    fn acknowledge(
        &mut self,
        _record: &PatientRecord,
        _saved: &[SinkReceipt],
        failures: &[SinkFailure],
    ) -> Result<(), IntakeError> {
        self.acknowledged.push(failures.len());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct RecordingSink {
    persisted: Arc<Mutex<Vec<String>>>,
    finished: Arc<Mutex<Option<usize>>>,
}

impl RecordingSink {
    pub(crate) fn persisted(&self) -> Vec<String> {
        self.persisted.lock().expect("sink mutex poisoned").clone()
    }

    pub(crate) fn finished_with(&self) -> Option<usize> {
        *self.finished.lock().expect("sink mutex poisoned")
    }
}

impl ReportSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn persist(&self, record: &PatientRecord) -> Result<String, PersistenceError> {
        self.persisted
            .lock()
            .expect("sink mutex poisoned")
            .push(record.identity.name.clone());
        Ok(format!("memory:{}", record.identity.name))
    }

    fn finish(&self, summary: &MasterSummary) -> Result<(), PersistenceError> {
        *self.finished.lock().expect("sink mutex poisoned") = Some(summary.len());
        Ok(())
    }
}

pub(crate) struct FailingSink;

impl ReportSink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn persist(&self, _record: &PatientRecord) -> Result<String, PersistenceError> {
        Err(offline())
    }

    fn finish(&self, _summary: &MasterSummary) -> Result<(), PersistenceError> {
        Err(offline())
    }
}

fn offline() -> PersistenceError {
    PersistenceError::Io {
        path: "offline".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotConnected, "sink offline"),
    }
}
