use crate::cli::{EvaluateArgs, HistoryArgs, RangesArgs, SessionArgs};
use crate::infra::{build_session, load_config, load_reference_table, parse_reading};
use blood_panel::error::AppError;
use blood_panel::panel::persistence::MASTER_REPORT_FILE;
use blood_panel::panel::report::views::StoreRecord;
use blood_panel::panel::report::format_value;
use blood_panel::panel::{
    classify_panel, ConsoleIntake, Finding, ReferenceTable, RuleEngine, SessionReport,
    SqliteReportStore, StatusMap,
};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Serialize)]
struct EvaluationResponse<'a> {
    statuses: &'a StatusMap,
    findings: Vec<EvaluatedFinding<'a>>,
}

#[derive(Debug, Serialize)]
struct EvaluatedFinding<'a> {
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    guidance: Option<&'static str>,
}

pub(crate) fn run_session(args: SessionArgs) -> Result<(), AppError> {
    let SessionArgs {
        output_dir,
        database,
        no_file_sink,
        no_store,
        reference_table,
    } = args;

    let mut config = load_config()?;
    if let Some(dir) = output_dir {
        config.reports.output_dir = dir;
    }
    if let Some(path) = database {
        config.reports.database_path = path;
    }
    if no_file_sink {
        config.reports.file_sink_enabled = false;
    }
    if no_store {
        config.reports.store_sink_enabled = false;
    }

    let table = load_reference_table(reference_table, &config)?;
    let session = build_session(table, &config.reports);

    println!("\nBLOOD TEST REPORT ANALYZER - DOCTOR DIAGNOSTIC VERSION");
    println!("{}", "-".repeat(55));

    let stdin = io::stdin();
    let mut intake = ConsoleIntake::new(stdin.lock(), io::stdout());
    let mut report = session.run(&mut intake);

    let master_path = config
        .reports
        .file_sink_enabled
        .then(|| config.reports.output_dir.join(MASTER_REPORT_FILE));
    write_session_outcome(&mut io::stdout().lock(), &report, master_path.as_deref())?;

    match report.interrupted.take() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

pub(crate) fn run_ranges(args: RangesArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let table = load_reference_table(args.reference_table, &config)?;
    write_ranges(&mut io::stdout().lock(), &table)?;
    Ok(())
}

pub(crate) fn run_rules() -> Result<(), AppError> {
    write_rules(&mut io::stdout().lock(), &RuleEngine::standard())?;
    Ok(())
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        readings,
        reference_table,
        json,
    } = args;

    let config = load_config()?;
    let table = load_reference_table(reference_table, &config)?;
    let readings = readings
        .iter()
        .map(|raw| parse_reading(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let statuses =
        classify_panel(&table, &readings).map_err(|err| AppError::Usage(err.to_string()))?;
    let engine = RuleEngine::standard();
    let findings = engine.evaluate(&statuses);

    let mut out = io::stdout().lock();
    if json {
        let response = EvaluationResponse {
            statuses: &statuses,
            findings: evaluated_findings(&engine, &findings),
        };
        serde_json::to_writer_pretty(&mut out, &response)?;
        writeln!(out)?;
    } else {
        write_evaluation(&mut out, &engine, &statuses, &findings)?;
    }
    Ok(())
}

pub(crate) fn run_history(args: HistoryArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let path = args.database.unwrap_or(config.reports.database_path);
    let rows = SqliteReportStore::new(path).records()?;

    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &rows)?;
        writeln!(out)?;
    } else {
        write_history(&mut out, &rows)?;
    }
    Ok(())
}

fn evaluated_findings<'a>(
    engine: &RuleEngine,
    findings: &'a [Finding],
) -> Vec<EvaluatedFinding<'a>> {
    findings
        .iter()
        .map(|finding| EvaluatedFinding {
            label: &finding.label,
            guidance: engine.guidance_for(&finding.label),
        })
        .collect()
}

fn write_session_outcome<W: Write>(
    out: &mut W,
    report: &SessionReport,
    master_path: Option<&std::path::Path>,
) -> io::Result<()> {
    for (patient, err) in &report.rejected {
        writeln!(out, "Report for {patient} was not completed: {err}")?;
    }
    if report.interrupted.is_some() {
        writeln!(out, "\nSession ended early; patients entered so far were kept.")?;
    }

    if report.summary.is_none() {
        writeln!(out, "\nNo patient data entered. Master summary not created.")?;
        return Ok(());
    }

    writeln!(out, "\nProcessed {} patient(s).", report.processed())?;
    if !report.sink_failures.is_empty() {
        writeln!(
            out,
            "{} report(s) could not be saved; see the log for details.",
            report.sink_failures.len()
        )?;
    }
    if let Some(path) = master_path {
        writeln!(out, "Master summary report: {}", path.display())?;
    }
    Ok(())
}

fn write_ranges<W: Write>(out: &mut W, table: &ReferenceTable) -> io::Result<()> {
    writeln!(out, "Reference ranges (inclusive)")?;
    for definition in table.definitions() {
        writeln!(
            out,
            "- {:<25} {} - {}",
            definition.name,
            format_value(definition.low),
            format_value(definition.high)
        )?;
    }
    Ok(())
}

fn write_rules<W: Write>(out: &mut W, engine: &RuleEngine) -> io::Result<()> {
    writeln!(out, "Disease rules (evaluated in order)")?;
    for (position, rule) in engine.rules().iter().enumerate() {
        writeln!(out, "{}. {}: {}", position + 1, rule.label, rule.criteria)?;
        writeln!(out, "   suggested advice: {}", rule.guidance)?;
    }
    Ok(())
}

fn write_evaluation<W: Write>(
    out: &mut W,
    engine: &RuleEngine,
    statuses: &StatusMap,
    findings: &[Finding],
) -> io::Result<()> {
    writeln!(out, "Test results")?;
    for entry in statuses.entries() {
        writeln!(
            out,
            "- {:<25}: {:<10} -> {}",
            entry.test,
            format_value(entry.value),
            entry.status
        )?;
    }

    writeln!(out, "\nPossible diseases")?;
    for finding in evaluated_findings(engine, findings) {
        match finding.guidance {
            Some(guidance) => writeln!(out, "- {} ({})", finding.label, guidance)?,
            None => writeln!(out, "- {}", finding.label)?,
        }
    }
    Ok(())
}

fn write_history<W: Write>(out: &mut W, rows: &[StoreRecord]) -> io::Result<()> {
    if rows.is_empty() {
        writeln!(out, "No stored patient reports.")?;
        return Ok(());
    }

    for row in rows {
        writeln!(
            out,
            "{} (age {}, {})\n  abnormal: {}\n  diseases: {}\n  advice: {}",
            row.name,
            row.age,
            row.gender,
            if row.abnormal_tests.is_empty() {
                "none"
            } else {
                row.abnormal_tests.as_str()
            },
            row.diseases,
            row.doctor_advice
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blood_panel::panel::{IntakeError, TestReading};

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        write(&mut buffer).expect("writing to memory succeeds");
        String::from_utf8(buffer).expect("utf8 output")
    }

    fn cholesterol_panel() -> (ReferenceTable, StatusMap) {
        let table = ReferenceTable::standard();
        let readings: Vec<TestReading> = table
            .definitions()
            .iter()
            .zip([14.0, 5.0, 7000.0, 300000.0, 90.0, 220.0])
            .map(|(definition, value)| TestReading::new(definition.name.clone(), value))
            .collect();
        let statuses = classify_panel(&table, &readings).expect("complete panel");
        (table, statuses)
    }

    #[test]
    fn evaluation_output_lists_guidance() {
        let (_, statuses) = cholesterol_panel();
        let engine = RuleEngine::standard();
        let findings = engine.evaluate(&statuses);

        let text = render(|out| write_evaluation(out, &engine, &statuses, &findings));

        assert!(text.contains("Cholesterol"));
        assert!(text.contains("-> High"));
        assert!(text.contains("- High Cholesterol (Avoid fatty foods and exercise regularly)"));
    }

    #[test]
    fn evaluation_json_carries_statuses_and_findings() {
        let (_, statuses) = cholesterol_panel();
        let engine = RuleEngine::standard();
        let findings = engine.evaluate(&statuses);
        let response = EvaluationResponse {
            statuses: &statuses,
            findings: evaluated_findings(&engine, &findings),
        };

        let value = serde_json::to_value(&response).expect("serializes");

        assert_eq!(value["statuses"]["entries"][5]["status"], "High");
        assert_eq!(value["findings"][0]["label"], "High Cholesterol");
    }

    #[test]
    fn ranges_and_rules_are_listed_in_order() {
        let ranges = render(|out| write_ranges(out, &ReferenceTable::standard()));
        let rules = render(|out| write_rules(out, &RuleEngine::standard()));

        assert!(ranges.contains("Platelet Count"));
        assert!(ranges.contains("150000.0 - 450000.0"));
        let malaria = rules.find("1. Malaria").expect("malaria listed");
        let cholesterol = rules.find("5. High Cholesterol").expect("cholesterol listed");
        assert!(malaria < cholesterol);
    }

    #[test]
    fn interrupted_session_says_earlier_patients_were_kept() {
        let report = SessionReport {
            interrupted: Some(IntakeError::Closed("RBC Count".to_string())),
            ..SessionReport::default()
        };

        let text = render(|out| write_session_outcome(out, &report, None));

        assert!(text.contains("Session ended early"));
        assert!(text.contains("No patient data entered."));
    }

    #[test]
    fn empty_session_reports_missing_master_summary() {
        let text = render(|out| write_session_outcome(out, &SessionReport::default(), None));
        assert!(text.contains("No patient data entered. Master summary not created."));
    }

    #[test]
    fn history_marks_rows_without_abnormal_tests() {
        let rows = vec![StoreRecord {
            name: "Ben Ortiz".to_string(),
            age: 35,
            gender: "Male".to_string(),
            abnormal_tests: String::new(),
            diseases: "No major disease detected".to_string(),
            doctor_advice: "No major disease detected: ".to_string(),
        }];

        let text = render(|out| write_history(out, &rows));

        assert!(text.starts_with("Ben Ortiz (age 35, Male)"));
        assert!(text.contains("abnormal: none"));
        assert_eq!(render(|out| write_history(out, &[])), "No stored patient reports.\n");
    }
}
