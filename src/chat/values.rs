use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::intelligence::LabTest;

/// Numeric values found in an analysis text, keyed by test.
/// Iteration follows the canonical test order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractedValues(BTreeMap<LabTest, f64>);

impl ExtractedValues {
    pub fn get(&self, test: LabTest) -> Option<f64> {
        self.0.get(&test).copied()
    }

    pub fn get_key(&self, key: &str) -> Option<f64> {
        LabTest::from_key(key).and_then(|t| self.get(t))
    }

    /// Record `value` unless the test already has one.
    pub fn insert_first(&mut self, test: LabTest, value: f64) -> bool {
        if self.0.contains_key(&test) {
            return false;
        }
        self.0.insert(test, value);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (LabTest, f64)> + '_ {
        self.0.iter().map(|(t, v)| (*t, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(LabTest, f64)> for ExtractedValues {
    fn from_iter<I: IntoIterator<Item = (LabTest, f64)>>(iter: I) -> Self {
        let mut values = Self::default();
        for (test, value) in iter {
            values.insert_first(test, value);
        }
        values
    }
}

/// Compiled `<name> is <number>` patterns per test, in profile order.
static VALUE_PATTERNS: LazyLock<Vec<(LabTest, Vec<Regex>)>> = LazyLock::new(|| {
    LabTest::ALL
        .into_iter()
        .map(|test| {
            let regexes = test
                .profile()
                .value_patterns
                .iter()
                .map(|fragment| value_pattern(fragment))
                .collect();
            (test, regexes)
        })
        .collect()
});

fn value_pattern(fragment: &str) -> Regex {
    let source = format!(r"(?i)\b(?:{fragment})\s+is\s+([0-9]+(?:\.[0-9]+)?)");
    Regex::new(&source).expect("Invalid value pattern")
}

/// Pull test values out of free-form analysis text.
///
/// Each test takes the first of its patterns that matches. Only when no
/// pattern matched at all does a token scan run: a token equal to a
/// single-word test key followed by a numeric token.
pub fn extract_values(analysis: &str) -> ExtractedValues {
    let mut values = ExtractedValues::default();

    for (test, regexes) in VALUE_PATTERNS.iter() {
        let found = regexes
            .iter()
            .find_map(|re| re.captures(analysis))
            .and_then(|caps| caps[1].parse::<f64>().ok());
        if let Some(value) = found {
            values.insert_first(*test, value);
        }
    }

    if values.is_empty() {
        scan_tokens(analysis, &mut values);
    }

    tracing::debug!(found = values.len(), "Values extracted from analysis");
    values
}

fn scan_tokens(analysis: &str, values: &mut ExtractedValues) {
    let tokens: Vec<&str> = analysis.split_whitespace().collect();
    for pair in tokens.windows(2) {
        let Some(test) = LabTest::from_key(pair[0]) else {
            continue;
        };
        if let Some(value) = parse_numeric_token(pair[1]) {
            values.insert_first(test, value);
        }
    }
}

/// ASCII digits with at most one '.', e.g. "105", "1.2", "105.".
fn parse_numeric_token(token: &str) -> Option<f64> {
    let stripped = token.replacen('.', "", 1);
    if stripped.is_empty() || !stripped.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_independent_keys() {
        let values = extract_values("glucose is 105 and bun is 15");
        assert_eq!(values.len(), 2);
        assert_eq!(values.get(LabTest::Glucose), Some(105.0));
        assert_eq!(values.get(LabTest::Bun), Some(15.0));
    }

    #[test]
    fn patterns_are_case_insensitive_and_accept_aliases() {
        let values = extract_values(
            "Your Blood Sugar is 92. Blood Urea Nitrogen is 18.5 and the White Blood Cells count is 7.2",
        );
        assert_eq!(values.get(LabTest::Glucose), Some(92.0));
        assert_eq!(values.get(LabTest::Bun), Some(18.5));
        assert_eq!(values.get(LabTest::Wbc), Some(7.2));
    }

    #[test]
    fn first_pattern_wins_within_a_test() {
        let values = extract_values("blood sugar is 80 but glucose is 120");
        assert_eq!(values.get(LabTest::Glucose), Some(120.0));
    }

    #[test]
    fn first_occurrence_wins_for_repeated_key() {
        let values = extract_values("glucose is 90, later glucose is 140");
        assert_eq!(values.get(LabTest::Glucose), Some(90.0));
    }

    #[test]
    fn multi_word_keys_match_by_pattern() {
        let values = extract_values("Vitamin D is 32 and hemoglobin A1c is 5.9");
        assert_eq!(values.get(LabTest::VitaminD), Some(32.0));
        assert_eq!(values.get(LabTest::A1c), Some(5.9));
        assert_eq!(values.get(LabTest::Hemoglobin), None);
    }

    #[test]
    fn word_boundary_keeps_short_keys_apart() {
        let values = extract_values("the result is 5 and salt is 3");
        assert!(values.get(LabTest::Alt).is_none());
    }

    #[test]
    fn token_fallback_when_no_pattern_matched() {
        let values = extract_values("Glucose 105 mg/dL, BUN 15.5 mg/dL, glucose 200");
        assert_eq!(values.get(LabTest::Glucose), Some(105.0));
        assert_eq!(values.get(LabTest::Bun), Some(15.5));
    }

    #[test]
    fn token_fallback_skipped_once_a_pattern_matched() {
        let values = extract_values("glucose is 105; BUN 15");
        assert_eq!(values.get(LabTest::Glucose), Some(105.0));
        assert_eq!(values.get(LabTest::Bun), None);
    }

    #[test]
    fn token_fallback_needs_plain_number() {
        let values = extract_values("glucose high, bun 1.2.3, iron ~50");
        assert!(values.is_empty());
    }

    #[test]
    fn no_values_in_plain_prose() {
        assert!(extract_values("Your results look fine overall.").is_empty());
        assert!(extract_values("").is_empty());
    }

    #[test]
    fn lookup_by_key_string() {
        let values = extract_values("iron is 80");
        assert_eq!(values.get_key("IRON"), Some(80.0));
        assert_eq!(values.get_key("zinc"), None);
    }

    #[test]
    fn serializes_with_canonical_keys_in_order() {
        let values = extract_values("iron is 80 and glucose is 105 and vitamin d is 30");
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"{"glucose":105.0,"vitamin d":30.0,"iron":80.0}"#
        );
    }

    #[test]
    fn numeric_token_rules() {
        assert_eq!(parse_numeric_token("105"), Some(105.0));
        assert_eq!(parse_numeric_token("1.5"), Some(1.5));
        assert_eq!(parse_numeric_token("1.2.3"), None);
        assert_eq!(parse_numeric_token("."), None);
        assert_eq!(parse_numeric_token("-5"), None);
        assert_eq!(parse_numeric_token("105mg"), None);
    }
}
