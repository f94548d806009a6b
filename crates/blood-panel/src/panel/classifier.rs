use super::domain::{Status, StatusMap, TestDefinition, TestReading};
use super::reference::ReferenceTable;
use tracing::warn;

/// Contract violations raised while classifying a panel.
///
/// Intake always supplies one reading per configured test, so these mean a
/// caller bug and abort the current patient.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassificationError {
    #[error("reading for '{found}' was classified against definition '{expected}'")]
    MismatchedTest { expected: String, found: String },
    #[error("no reading supplied for '{test}'")]
    MissingReading { test: String },
}

/// Places one reading against its inclusive reference range.
pub fn classify(
    reading: &TestReading,
    definition: &TestDefinition,
) -> Result<Status, ClassificationError> {
    if reading.test != definition.name {
        return Err(ClassificationError::MismatchedTest {
            expected: definition.name.clone(),
            found: reading.test.clone(),
        });
    }

    let status = if reading.value < definition.low {
        Status::Low
    } else if reading.value > definition.high {
        Status::High
    } else {
        Status::Normal
    };

    Ok(status)
}

/// Classifies every test in `table`, in declaration order.
pub fn classify_panel(
    table: &ReferenceTable,
    readings: &[TestReading],
) -> Result<StatusMap, ClassificationError> {
    let mut map = StatusMap::with_capacity(table.len());

    for definition in table.definitions() {
        let reading = readings
            .iter()
            .find(|reading| reading.test == definition.name)
            .ok_or_else(|| ClassificationError::MissingReading {
                test: definition.name.clone(),
            })?;

        let status = classify(reading, definition)?;
        map.insert(&definition.name, reading.value, status);
    }

    for reading in readings {
        if table.get(&reading.test).is_none() {
            warn!(test = %reading.test, "ignoring reading with no reference range");
        }
    }

    Ok(map)
}
