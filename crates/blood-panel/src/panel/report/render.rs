use super::views::{MasterSummaryView, PatientDetailView};
use std::fmt::Write;

const PATIENT_RULE: &str = "-----------------------------------";
const MASTER_RULE: &str = "--------------------------------";
const BLOCK_RULE_WIDTH: usize = 50;

/// Text body of `<slug>_blood_report.txt`.
pub fn render_patient_report(view: &PatientDetailView) -> String {
    let mut out = String::new();

    line(&mut out, "BLOOD TEST ANALYSIS REPORT");
    line(&mut out, PATIENT_RULE);
    line(&mut out, format_args!("Patient Name: {}", view.name));
    line(&mut out, format_args!("Age: {}", view.age));
    line(&mut out, format_args!("Gender: {}", view.gender));
    line(&mut out, "");

    line(&mut out, "Test Results:");
    for result in &view.results {
        line(
            &mut out,
            format_args!(
                "{}: {} -> {}",
                result.test,
                format_value(result.value),
                result.status_label
            ),
        );
    }

    line(&mut out, "");
    line(&mut out, "Possible Diseases & Doctor Advice:");
    for finding in &view.findings {
        line(&mut out, format_args!("{}: {}", finding.label, finding.advice));
    }

    out
}

/// Text body of `master_blood_report.txt`.
pub fn render_master_report(view: &MasterSummaryView) -> String {
    let mut out = String::new();

    line(&mut out, "MASTER BLOOD TEST SUMMARY REPORT");
    line(&mut out, MASTER_RULE);

    for patient in &view.patients {
        line(&mut out, "");
        line(
            &mut out,
            format_args!(
                "Patient Name: {}, Age: {}, Gender: {}",
                patient.name, patient.age, patient.gender
            ),
        );

        line(&mut out, "Abnormal Tests:");
        if patient.abnormal_tests.is_empty() {
            line(&mut out, "  - None");
        }
        for entry in &patient.abnormal_tests {
            line(&mut out, format_args!("  - {}: {}", entry.test, entry.status_label));
        }

        line(&mut out, "Diseases & Doctor Advice:");
        for finding in &patient.findings {
            line(&mut out, format_args!("  - {}: {}", finding.label, finding.advice));
        }
        line(&mut out, "-".repeat(BLOCK_RULE_WIDTH));
    }

    out
}

/// Whole numbers keep one decimal place (`300000.0`), the rest print as-is.
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn line(out: &mut String, content: impl std::fmt::Display) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{content}");
}
