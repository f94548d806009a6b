mod table;

pub use table::DiseaseRule;

use super::domain::StatusMap;
use serde::Serialize;

/// Label of the finding emitted when no disease rule matches.
pub const NO_MAJOR_DISEASE: &str = "No major disease detected";

/// Stateless evaluator over the fixed, ordered disease rule table.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<DiseaseRule>,
}

impl RuleEngine {
    pub fn standard() -> Self {
        Self {
            rules: table::standard_rules(),
        }
    }

    pub fn rules(&self) -> &[DiseaseRule] {
        &self.rules
    }

    /// Runs every rule once, in table order; never returns an empty list.
    pub fn evaluate(&self, statuses: &StatusMap) -> Vec<Finding> {
        let mut findings: Vec<Finding> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(statuses))
            .map(DiseaseRule::finding)
            .collect();

        if findings.is_empty() {
            findings.push(Finding::sentinel());
        }

        findings
    }

    /// Suggested advice for a finding label, if the label belongs to a rule.
    pub fn guidance_for(&self, label: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.label == label)
            .map(|rule| rule.guidance)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Candidate condition awaiting (or holding) the doctor's advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

impl Finding {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            advice: None,
        }
    }

    pub fn sentinel() -> Self {
        Self::new(NO_MAJOR_DISEASE)
    }

    pub fn is_sentinel(&self) -> bool {
        self.label == NO_MAJOR_DISEASE
    }

    pub fn with_advice(mut self, advice: impl Into<String>) -> Self {
        self.advice = Some(advice.into());
        self
    }
}
