use super::classifier::{classify_panel, ClassificationError};
use super::domain::PatientIdentity;
use super::intake::{IntakeError, PatientIntake};
use super::persistence::{ReportSink, SinkFailure, SinkReceipt};
use super::reference::ReferenceTable;
use super::report::{finalize, MasterSummary, PatientRecord, ReportError};
use super::rules::RuleEngine;
use tracing::{error, info, warn};

/// Failure that abandons the current patient without ending the session.
#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug)]
pub struct PatientOutcome {
    pub patient: String,
    pub saved: Vec<SinkReceipt>,
    pub sink_failures: Vec<SinkFailure>,
}

/// End-of-session tally handed back to the caller.
///
/// `interrupted` holds the intake failure that ended the session early;
/// patients finished before it are still summarized and persisted.
#[derive(Debug, Default)]
pub struct SessionReport {
    pub summary: Option<MasterSummary>,
    pub rejected: Vec<(String, PatientError)>,
    pub sink_failures: Vec<SinkFailure>,
    pub interrupted: Option<IntakeError>,
}

impl SessionReport {
    pub fn processed(&self) -> usize {
        self.summary.as_ref().map_or(0, MasterSummary::len)
    }
}

/// Runs the per-patient pipeline and owns the growing master summary.
pub struct PanelSession {
    table: ReferenceTable,
    engine: RuleEngine,
    sinks: Vec<Box<dyn ReportSink>>,
    summary: Option<MasterSummary>,
}

impl PanelSession {
    pub fn new(table: ReferenceTable, engine: RuleEngine) -> Self {
        Self {
            table,
            engine,
            sinks: Vec::new(),
            summary: None,
        }
    }

    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn summary(&self) -> Option<&MasterSummary> {
        self.summary.as_ref()
    }

    /// Readings, classification, findings, advice, then every sink.
    ///
    /// Intake failures end the session; everything else stays with this
    /// patient.
    pub fn process_patient<I: PatientIntake>(
        &mut self,
        identity: PatientIdentity,
        intake: &mut I,
    ) -> Result<Result<PatientOutcome, PatientError>, IntakeError> {
        let readings = self
            .table
            .definitions()
            .iter()
            .map(|definition| intake.reading(definition))
            .collect::<Result<Vec<_>, _>>()?;

        let statuses = match classify_panel(&self.table, &readings) {
            Ok(statuses) => statuses,
            Err(err) => return Ok(Err(err.into())),
        };

        let mut findings = self.engine.evaluate(&statuses);
        for finding in &mut findings {
            let guidance = self.engine.guidance_for(&finding.label);
            finding.advice = Some(intake.advice(finding, guidance)?);
        }

        let record = match finalize(identity, statuses, findings) {
            Ok(record) => record,
            Err(err) => return Ok(Err(err.into())),
        };

        let (saved, sink_failures) = self.persist(&record);
        intake.acknowledge(&record, &saved, &sink_failures)?;

        let patient = record.identity.name.clone();
        self.summary = Some(match self.summary.take() {
            Some(summary) => summary.append(record),
            None => MasterSummary::start(record),
        });

        Ok(Ok(PatientOutcome {
            patient,
            saved,
            sink_failures,
        }))
    }

    /// Processes patients until intake signals the end of the session or
    /// fails; either way the summary of finished patients is handed to the
    /// sinks.
    pub fn run<I: PatientIntake>(mut self, intake: &mut I) -> SessionReport {
        let mut report = SessionReport::default();

        loop {
            let identity = match intake.next_patient() {
                Ok(Some(identity)) => identity,
                Ok(None) => break,
                Err(err) => {
                    report.interrupted = Some(err);
                    break;
                }
            };

            let patient = identity.name.clone();
            match self.process_patient(identity, intake) {
                Ok(Ok(outcome)) => {
                    info!(
                        patient = %outcome.patient,
                        saved = outcome.saved.len(),
                        failed_sinks = outcome.sink_failures.len(),
                        "patient processed"
                    );
                    report.sink_failures.extend(outcome.sink_failures);
                }
                Ok(Err(err)) => {
                    error!(%patient, error = %err, "patient abandoned");
                    report.rejected.push((patient, err));
                }
                Err(err) => {
                    report.interrupted = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = &report.interrupted {
            error!(error = %err, "intake failed; ending session");
        }

        match &self.summary {
            Some(summary) => {
                for sink in &self.sinks {
                    if let Err(err) = sink.finish(summary) {
                        warn!(sink = sink.name(), error = %err, "failed to write session summary");
                        report.sink_failures.push(SinkFailure {
                            sink: sink.name(),
                            error: err,
                        });
                    }
                }
            }
            None => info!("no patient data entered; master summary not created"),
        }

        report.summary = self.summary;
        report
    }

    fn persist(&self, record: &PatientRecord) -> (Vec<SinkReceipt>, Vec<SinkFailure>) {
        let mut saved = Vec::new();
        let mut failures = Vec::new();
        for sink in &self.sinks {
            match sink.persist(record) {
                Ok(location) => saved.push(SinkReceipt {
                    sink: sink.name(),
                    location,
                }),
                Err(err) => {
                    warn!(
                        sink = sink.name(),
                        patient = %record.identity.name,
                        error = %err,
                        "failed to persist patient record"
                    );
                    failures.push(SinkFailure {
                        sink: sink.name(),
                        error: err,
                    });
                }
            }
        }
        (saved, failures)
    }
}
