use serde::{Deserialize, Serialize};

/// One result line recovered from a lab report.
///
/// Every field stays textual: values such as "<5" or ">200" and free-form
/// ranges like "70-99 (fasting)" survive untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultRow {
    pub test_name: String,
    pub value: String,
    pub units: String,
    pub reference_range: String,
}

impl ResultRow {
    pub fn new(
        test_name: impl Into<String>,
        value: impl Into<String>,
        units: impl Into<String>,
        reference_range: impl Into<String>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            value: value.into(),
            units: units.into(),
            reference_range: reference_range.into(),
        }
    }

    /// Row carrying only a name and a value (two-column tables).
    pub fn name_value(test_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(test_name, value, "", "")
    }

    pub fn has_reference_range(&self) -> bool {
        !self.reference_range.is_empty()
    }
}
