use super::Finding;
use crate::panel::domain::{Status, StatusMap};
use crate::panel::reference::{
    BLOOD_SUGAR_FASTING, CHOLESTEROL, HEMOGLOBIN, PLATELET_COUNT, RBC_COUNT, WBC_COUNT,
};
use std::fmt;

/// One hand-authored inference: a predicate over the panel and the
/// condition it suggests.
#[derive(Clone, Copy)]
pub struct DiseaseRule {
    pub label: &'static str,
    pub guidance: &'static str,
    pub criteria: &'static str,
    predicate: fn(&StatusMap) -> bool,
}

impl DiseaseRule {
    pub fn matches(&self, statuses: &StatusMap) -> bool {
        (self.predicate)(statuses)
    }

    pub(crate) fn finding(&self) -> Finding {
        Finding::new(self.label)
    }
}

impl fmt::Debug for DiseaseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiseaseRule")
            .field("label", &self.label)
            .field("criteria", &self.criteria)
            .finish()
    }
}

fn is(statuses: &StatusMap, test: &str, status: Status) -> bool {
    statuses.get(test) == Some(status)
}

fn malaria(statuses: &StatusMap) -> bool {
    is(statuses, HEMOGLOBIN, Status::Low) && is(statuses, PLATELET_COUNT, Status::Low)
}

// A panel without a WBC entry still counts; the standard table always
// classifies WBC Count, so that branch only matters for custom tables.
fn dengue(statuses: &StatusMap) -> bool {
    is(statuses, PLATELET_COUNT, Status::Low)
        && matches!(statuses.get(WBC_COUNT), Some(Status::High) | None)
}

fn diabetes(statuses: &StatusMap) -> bool {
    is(statuses, BLOOD_SUGAR_FASTING, Status::High)
}

fn anemia(statuses: &StatusMap) -> bool {
    is(statuses, HEMOGLOBIN, Status::Low) && is(statuses, RBC_COUNT, Status::Low)
}

fn high_cholesterol(statuses: &StatusMap) -> bool {
    is(statuses, CHOLESTEROL, Status::High)
}

pub(super) fn standard_rules() -> Vec<DiseaseRule> {
    vec![
        DiseaseRule {
            label: "Malaria",
            guidance: "Take antimalarial drugs and rest",
            criteria: "Hemoglobin Low and Platelet Count Low",
            predicate: malaria,
        },
        DiseaseRule {
            label: "Dengue",
            guidance: "Monitor platelet count and stay hydrated",
            criteria: "Platelet Count Low and WBC Count High or not measured",
            predicate: dengue,
        },
        DiseaseRule {
            label: "Diabetes",
            guidance: "Reduce sugar intake, exercise regularly",
            criteria: "Blood Sugar (Fasting) High",
            predicate: diabetes,
        },
        DiseaseRule {
            label: "Anemia",
            guidance: "Iron supplements and diet rich in iron",
            criteria: "Hemoglobin Low and RBC Count Low",
            predicate: anemia,
        },
        DiseaseRule {
            label: "High Cholesterol",
            guidance: "Avoid fatty foods and exercise regularly",
            criteria: "Cholesterol High",
            predicate: high_cholesterol,
        },
    ]
}
