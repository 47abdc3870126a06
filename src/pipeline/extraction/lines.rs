use crate::models::ResultRow;

use super::sanitize::normalize;

/// Fewest whitespace tokens a result line can have (name, value, one more).
const MIN_TOKENS: usize = 3;

/// Unit strings whose presence marks a line as a probable result.
/// `Î¼IU/mL` is how `μIU/mL` reads after a Latin-1 mis-decode.
const UNIT_MARKERS: &[&str] = &[
    "g/dL", "mg/dL", "mmol/L", "U/L", "ng/mL", "μIU/mL", "Î¼IU/mL", "x10^3", "%",
];

/// Split every line of a report's text into result rows, in document order.
///
/// Text is normalized first; lines that do not look like results are dropped.
pub fn extract_rows(text: &str) -> Vec<ResultRow> {
    let normalized = normalize(text);
    let rows: Vec<ResultRow> = normalized.lines().filter_map(classify_and_split).collect();
    tracing::debug!(rows = rows.len(), "Parsed result rows from report text");
    rows
}

/// Decide whether `line` is a lab result and, if so, split it into fields.
///
/// Layout assumption: a run of non-numeric tokens names the test, the first
/// token carrying a digit starts the value, the next token is the unit and a
/// later dash-bearing token starts the reference range ("70-99").
///
/// Test names containing digits ("Vitamin B12") split early at the digit;
/// this is a known limitation of the heuristic.
pub fn classify_and_split(line: &str) -> Option<ResultRow> {
    if line.trim().is_empty() {
        return None;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_TOKENS {
        return None;
    }

    if !looks_like_result(line) {
        return None;
    }

    let (name_tokens, value_tokens) = split_name_and_value(&tokens)?;
    let test_name = name_tokens.join(" ");
    let (value, units, reference_range) = decompose_value(value_tokens);

    if test_name.is_empty() || value.is_empty() {
        return None;
    }

    Some(ResultRow {
        test_name,
        value,
        units,
        reference_range,
    })
}

/// A line needs a digit plus a unit, a dash or the word "normal".
fn looks_like_result(line: &str) -> bool {
    let has_numbers = line.chars().any(|c| c.is_ascii_digit());
    if !has_numbers {
        return false;
    }
    let has_units = UNIT_MARKERS.iter().any(|unit| line.contains(unit));
    has_units || line.contains('-') || line.to_lowercase().contains("normal")
}

fn has_digit(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

/// Name = leading digit-free tokens, value = the rest. When either side
/// comes out empty, the last token alone becomes the value.
fn split_name_and_value<'a>(tokens: &'a [&'a str]) -> Option<(&'a [&'a str], &'a [&'a str])> {
    let split_at = tokens
        .iter()
        .position(|t| has_digit(t))
        .unwrap_or(tokens.len());
    let (name, value) = tokens.split_at(split_at);

    if !name.is_empty() && !value.is_empty() {
        return Some((name, value));
    }

    if tokens.len() < 2 {
        return None;
    }
    Some(tokens.split_at(tokens.len() - 1))
}

/// Break the value region into (value, units, reference range).
fn decompose_value(tokens: &[&str]) -> (String, String, String) {
    let value = tokens.first().map(|t| t.to_string()).unwrap_or_default();
    let mut units = tokens.get(1).map(|t| t.to_string()).unwrap_or_default();
    let mut reference_range = String::new();

    if let Some(offset) = tokens.iter().skip(1).position(|t| t.contains('-')) {
        let index = offset + 1;
        reference_range = tokens[index..].join(" ");
        if index > 1 {
            units = tokens[1..index].join(" ");
        }
    }

    (value, units, reference_range)
}
