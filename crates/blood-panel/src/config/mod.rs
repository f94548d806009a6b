use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the analyzer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub reports: ReportConfig,
    pub reference_table_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let output_dir = env::var("REPORT_OUTPUT_DIR").unwrap_or_else(|_| ".".to_string());
        let database_path =
            env::var("REPORT_DATABASE_PATH").unwrap_or_else(|_| "blood_analyzer.db".to_string());

        let reports = ReportConfig {
            output_dir: PathBuf::from(output_dir),
            database_path: PathBuf::from(database_path),
            file_sink_enabled: flag("REPORT_FILE_SINK", true)?,
            store_sink_enabled: flag("REPORT_STORE_SINK", true)?,
        };

        let reference_table_path = env::var("REFERENCE_TABLE_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            reports,
            reference_table_path,
        })
    }
}

/// Where and whether finalized records are persisted.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub database_path: PathBuf,
    pub file_sink_enabled: bool,
    pub store_sink_enabled: bool,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidFlag { name, value }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("REPORT_OUTPUT_DIR");
        env::remove_var("REPORT_DATABASE_PATH");
        env::remove_var("REPORT_FILE_SINK");
        env::remove_var("REPORT_STORE_SINK");
        env::remove_var("REFERENCE_TABLE_PATH");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.reports.output_dir, PathBuf::from("."));
        assert_eq!(
            config.reports.database_path,
            PathBuf::from("blood_analyzer.db")
        );
        assert!(config.reports.file_sink_enabled);
        assert!(config.reports.store_sink_enabled);
        assert!(config.reference_table_path.is_none());
    }

    #[test]
    fn sink_flags_and_paths_follow_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("REPORT_STORE_SINK", "off");
        env::set_var("REPORT_OUTPUT_DIR", "/tmp/reports");
        env::set_var("REFERENCE_TABLE_PATH", "ranges.csv");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Production);
        assert!(config.reports.file_sink_enabled);
        assert!(!config.reports.store_sink_enabled);
        assert_eq!(config.reports.output_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(config.reference_table_path, Some(PathBuf::from("ranges.csv")));
    }

    #[test]
    fn rejects_unrecognised_flag_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REPORT_FILE_SINK", "sometimes");
        let err = AppConfig::load().expect_err("flag is invalid");
        reset_env();

        assert!(matches!(
            err,
            ConfigError::InvalidFlag { name: "REPORT_FILE_SINK", .. }
        ));
    }
}
