use super::domain::TestDefinition;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

pub const HEMOGLOBIN: &str = "Hemoglobin";
pub const RBC_COUNT: &str = "RBC Count";
pub const WBC_COUNT: &str = "WBC Count";
pub const PLATELET_COUNT: &str = "Platelet Count";
pub const BLOOD_SUGAR_FASTING: &str = "Blood Sugar (Fasting)";
pub const CHOLESTEROL: &str = "Cholesterol";

/// Ordered set of test definitions used for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    definitions: Vec<TestDefinition>,
}

impl ReferenceTable {
    pub fn standard() -> Self {
        Self {
            definitions: standard_definitions(),
        }
    }

    pub fn new(definitions: Vec<TestDefinition>) -> Result<Self, ReferenceError> {
        if definitions.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let mut seen = HashSet::new();
        for definition in &definitions {
            if definition.name.trim().is_empty() {
                return Err(ReferenceError::BlankName);
            }
            if !seen.insert(definition.name.as_str()) {
                return Err(ReferenceError::DuplicateTest(definition.name.clone()));
            }
            if !definition.low.is_finite()
                || !definition.high.is_finite()
                || definition.low > definition.high
            {
                return Err(ReferenceError::InvalidRange {
                    test: definition.name.clone(),
                    low: definition.low,
                    high: definition.high,
                });
            }
        }

        Ok(Self { definitions })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads a `name,low,high` CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReferenceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut definitions = Vec::new();
        for row in csv_reader.deserialize::<ReferenceRow>() {
            let row = row?;
            definitions.push(TestDefinition::new(row.name, row.low, row.high));
        }

        Self::new(definitions)
    }

    pub fn definitions(&self) -> &[TestDefinition] {
        &self.definitions
    }

    pub fn get(&self, name: &str) -> Option<&TestDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.name == name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    name: String,
    low: f64,
    high: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference table has no tests")]
    Empty,
    #[error("reference table contains a test with a blank name")]
    BlankName,
    #[error("test '{0}' is defined more than once")]
    DuplicateTest(String),
    #[error("test '{test}' has an invalid range [{low}, {high}]")]
    InvalidRange { test: String, low: f64, high: f64 },
    #[error("failed to read reference table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid reference table CSV: {0}")]
    Csv(#[from] csv::Error),
}

fn standard_definitions() -> Vec<TestDefinition> {
    vec![
        TestDefinition::new(HEMOGLOBIN, 13.0, 17.0),
        TestDefinition::new(RBC_COUNT, 4.5, 5.9),
        TestDefinition::new(WBC_COUNT, 4000.0, 11000.0),
        TestDefinition::new(PLATELET_COUNT, 150000.0, 450000.0),
        TestDefinition::new(BLOOD_SUGAR_FASTING, 70.0, 110.0),
        TestDefinition::new(CHOLESTEROL, 125.0, 200.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn standard_table_lists_six_tests_in_declaration_order() {
        let table = ReferenceTable::standard();
        let names: Vec<&str> = table
            .definitions()
            .iter()
            .map(|definition| definition.name.as_str())
            .collect();

        assert_eq!(
            names,
            vec![
                HEMOGLOBIN,
                RBC_COUNT,
                WBC_COUNT,
                PLATELET_COUNT,
                BLOOD_SUGAR_FASTING,
                CHOLESTEROL
            ]
        );
        let platelets = table.get(PLATELET_COUNT).expect("platelets defined");
        assert_eq!((platelets.low, platelets.high), (150000.0, 450000.0));
    }

    #[test]
    fn csv_reader_builds_table() {
        let csv = "name,low,high\nHemoglobin, 12.0, 16.0\nFerritin,30,400\n";
        let table = ReferenceTable::from_reader(Cursor::new(csv)).expect("csv parses");

        assert_eq!(table.len(), 2);
        assert_eq!(table.definitions()[0], TestDefinition::new(HEMOGLOBIN, 12.0, 16.0));
        assert_eq!(table.definitions()[1].name, "Ferritin");
    }

    #[test]
    fn csv_reader_rejects_non_numeric_bounds() {
        let csv = "name,low,high\nHemoglobin,low,16\n";
        let err = ReferenceTable::from_reader(Cursor::new(csv)).expect_err("bad bound");
        assert!(matches!(err, ReferenceError::Csv(_)));
    }

    #[test]
    fn rejects_inverted_range_and_duplicates() {
        let inverted = ReferenceTable::new(vec![TestDefinition::new("Cholesterol", 200.0, 125.0)]);
        assert!(matches!(
            inverted,
            Err(ReferenceError::InvalidRange { ref test, .. }) if test == "Cholesterol"
        ));

        let duplicated = ReferenceTable::new(vec![
            TestDefinition::new("Hemoglobin", 13.0, 17.0),
            TestDefinition::new("Hemoglobin", 12.0, 16.0),
        ]);
        assert!(matches!(duplicated, Err(ReferenceError::DuplicateTest(name)) if name == "Hemoglobin"));

        assert!(matches!(ReferenceTable::new(Vec::new()), Err(ReferenceError::Empty)));
    }
}
