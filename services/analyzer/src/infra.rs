use blood_panel::config::{AppConfig, ReportConfig};
use blood_panel::error::AppError;
use blood_panel::panel::intake::parse_value;
use blood_panel::panel::{
    FileReportSink, PanelSession, ReferenceTable, RuleEngine, SqliteReportStore, TestReading,
};
use blood_panel::telemetry;
use std::path::PathBuf;
use tracing::info;

/// Loads configuration and installs the log subscriber before any command runs.
pub(crate) fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

/// Reference table from an explicit CSV, the configured CSV, or the standard ranges.
pub(crate) fn load_reference_table(
    override_path: Option<PathBuf>,
    config: &AppConfig,
) -> Result<ReferenceTable, AppError> {
    match override_path.or_else(|| config.reference_table_path.clone()) {
        Some(path) => {
            let table = ReferenceTable::from_path(&path)?;
            info!(path = %path.display(), tests = table.len(), "loaded reference table");
            Ok(table)
        }
        None => Ok(ReferenceTable::standard()),
    }
}

pub(crate) fn build_session(table: ReferenceTable, reports: &ReportConfig) -> PanelSession {
    let mut session = PanelSession::new(table, RuleEngine::standard());

    if reports.file_sink_enabled {
        session = session.with_sink(FileReportSink::new(&reports.output_dir));
    }
    if reports.store_sink_enabled {
        session = session.with_sink(SqliteReportStore::new(&reports.database_path));
    }

    session
}

/// Parses `NAME=VALUE`; the name may itself contain spaces and parentheses.
pub(crate) fn parse_reading(raw: &str) -> Result<TestReading, AppError> {
    let (name, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| AppError::Usage(format!("expected NAME=VALUE, got '{raw}'")))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Usage(format!("missing test name in '{raw}'")));
    }

    let value = parse_value(name, value).map_err(|err| AppError::Usage(err.to_string()))?;
    Ok(TestReading::new(name, value))
}
