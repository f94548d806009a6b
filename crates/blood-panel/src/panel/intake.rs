//! Acquisition of patient details, readings and doctor advice.
//!
//! [`PatientIntake`] is the seam the session drives; [`ConsoleIntake`]
//! implements it over any line-oriented reader/writer pair, re-prompting
//! locally whenever a value fails validation.

use super::domain::{PatientIdentity, TestDefinition, TestReading};
use super::report::{format_value, PatientRecord};
use super::persistence::{SinkFailure, SinkReceipt};
use super::rules::Finding;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Word that ends the session when entered as a patient name.
pub const EXIT_COMMAND: &str = "exit";

/// Recoverable input problems; the console re-prompts instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("patient name cannot be empty")]
    EmptyName,
    #[error("{field} must be a number, got '{input}'")]
    NotANumber { field: String, input: String },
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("console input failed: {0}")]
    Io(#[from] io::Error),
    #[error("input ended while waiting for {0}")]
    Closed(String),
}

pub trait PatientIntake {
    /// Next patient to process, or `None` when the session should end.
    fn next_patient(&mut self) -> Result<Option<PatientIdentity>, IntakeError>;

    fn reading(&mut self, definition: &TestDefinition) -> Result<TestReading, IntakeError>;

    /// Advice for one finding; `guidance` is the rule's suggested text.
    fn advice(
        &mut self,
        finding: &Finding,
        guidance: Option<&str>,
    ) -> Result<String, IntakeError>;

    /// Called once a record is finalized and handed to every sink.
    fn acknowledge(
        &mut self,
        _record: &PatientRecord,
        _saved: &[SinkReceipt],
        _failures: &[SinkFailure],
    ) -> Result<(), IntakeError> {
        Ok(())
    }
}

pub fn parse_name(raw: &str) -> Result<Option<String>, ValidationError> {
    let name = raw.trim();
    if name.eq_ignore_ascii_case(EXIT_COMMAND) {
        return Ok(None);
    }
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(Some(name.to_string()))
}

/// Any whole number; no range check is applied.
pub fn parse_age(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber {
            field: "age".to_string(),
            input: raw.trim().to_string(),
        })
}

/// Anything `f64` parses, including `inf` and `NaN`.
pub fn parse_value(field: &str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber {
            field: field.to_string(),
            input: raw.trim().to_string(),
        })
}

/// Interactive intake reading answers line by line.
pub struct ConsoleIntake<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleIntake<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>, IntakeError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn require(&mut self, prompt: &str, waiting_for: &str) -> Result<String, IntakeError> {
        self.ask(prompt)?
            .ok_or_else(|| IntakeError::Closed(waiting_for.to_string()))
    }

    fn reject(&mut self, err: &ValidationError, hint: &str) -> Result<(), IntakeError> {
        debug!(%err, "re-prompting after invalid input");
        writeln!(self.output, "Invalid input. {hint}")?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> PatientIntake for ConsoleIntake<R, W> {
    fn next_patient(&mut self) -> Result<Option<PatientIdentity>, IntakeError> {
        let name = loop {
            let Some(raw) = self.ask("\nEnter patient name (or type 'exit' to finish): ")? else {
                return Ok(None);
            };
            match parse_name(&raw) {
                Ok(Some(name)) => break name,
                Ok(None) => return Ok(None),
                Err(err) => self.reject(&err, "Please enter a patient name.")?,
            }
        };

        let age = loop {
            let raw = self.require("Enter age: ", "age")?;
            match parse_age(&raw) {
                Ok(age) => break age,
                Err(err) => self.reject(&err, "Please enter a whole number for age.")?,
            }
        };

        let gender = self.require("Enter gender (Male/Female): ", "gender")?;

        writeln!(self.output, "\nEnter blood test values for {name}:")?;
        Ok(Some(PatientIdentity::new(name, age, gender.trim())))
    }

    fn reading(&mut self, definition: &TestDefinition) -> Result<TestReading, IntakeError> {
        loop {
            let raw = self.require(&format!("{}: ", definition.name), &definition.name)?;
            match parse_value(&definition.name, &raw) {
                Ok(value) => return Ok(TestReading::new(definition.name.clone(), value)),
                Err(err) => self.reject(&err, "Please enter a numeric value.")?,
            }
        }
    }

    fn advice(
        &mut self,
        finding: &Finding,
        guidance: Option<&str>,
    ) -> Result<String, IntakeError> {
        let prompt = match guidance {
            Some(hint) => format!("Advice for {} [{}]: ", finding.label, hint),
            None => format!("Advice for {}: ", finding.label),
        };
        let answer = self.require(&prompt, &format!("advice on {}", finding.label))?;
        let answer = answer.trim();

        Ok(match guidance {
            Some(hint) if answer.is_empty() => hint.to_string(),
            _ => answer.to_string(),
        })
    }

    fn acknowledge(
        &mut self,
        record: &PatientRecord,
        saved: &[SinkReceipt],
        failures: &[SinkFailure],
    ) -> Result<(), IntakeError> {
        let rule = "-".repeat(50);
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "\n=== Test Summary ===")?;
        for entry in record.statuses.entries() {
            writeln!(
                self.output,
                "{:<25}: {:<10} -> {}",
                entry.test,
                format_value(entry.value),
                entry.status
            )?;
        }

        for receipt in saved {
            writeln!(self.output, "Report saved as {}", receipt.location)?;
        }
        for failure in failures {
            writeln!(
                self.output,
                "Could not save report to {}: {}",
                failure.sink, failure.error
            )?;
        }
        writeln!(
            self.output,
            "Take care of your health. Small daily changes make a big difference!"
        )?;
        writeln!(self.output, "{rule}")?;
        Ok(())
    }
}
