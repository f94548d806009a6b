use serde::{Deserialize, Serialize};
use std::fmt;

/// Named blood test with its inclusive reference range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDefinition {
    pub name: String,
    pub low: f64,
    pub high: f64,
}

impl TestDefinition {
    pub fn new(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            low,
            high,
        }
    }
}

/// Raw numeric value captured for one test during a patient session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReading {
    pub test: String,
    pub value: f64,
}

impl TestReading {
    pub fn new(test: impl Into<String>, value: f64) -> Self {
        Self {
            test: test.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Low,
    Normal,
    High,
}

impl Status {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
        }
    }

    pub const fn is_abnormal(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Patient details captured before any readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentity {
    pub name: String,
    pub age: i64,
    pub gender: String,
}

impl PatientIdentity {
    pub fn new(name: impl Into<String>, age: i64, gender: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age,
            gender: gender.into(),
        }
    }
}

/// Classified reading kept alongside its raw value for detail reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusEntry {
    pub test: String,
    pub value: f64,
    pub status: Status,
}

/// Status per configured test, in reference-table declaration order.
///
/// Only the classifier builds one; lookups return `None` for tests that were
/// never classified so rules can tell "absent" apart from any status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusMap {
    entries: Vec<StatusEntry>,
}

impl StatusMap {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, test: &str, value: f64, status: Status) {
        match self.entries.iter_mut().find(|entry| entry.test == test) {
            Some(entry) => {
                entry.value = value;
                entry.status = status;
            }
            None => self.entries.push(StatusEntry {
                test: test.to_string(),
                value,
                status,
            }),
        }
    }

    pub fn get(&self, test: &str) -> Option<Status> {
        self.entries
            .iter()
            .find(|entry| entry.test == test)
            .map(|entry| entry.status)
    }

    pub fn contains(&self, test: &str) -> bool {
        self.get(test).is_some()
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn abnormal(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status.is_abnormal())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
impl FromIterator<(&'static str, Status)> for StatusMap {
    fn from_iter<T: IntoIterator<Item = (&'static str, Status)>>(iter: T) -> Self {
        let mut map = StatusMap::default();
        for (test, status) in iter {
            map.insert(test, 0.0, status);
        }
        map
    }
}
