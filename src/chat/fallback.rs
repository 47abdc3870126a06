//! Deterministic answers used when the generative model is unavailable.

use std::sync::LazyLock;

use regex::Regex;

use super::values::ExtractedValues;
use crate::intelligence::LabTest;

pub const NO_VALUES_RESPONSE: &str = "I don't see any specific test values in the information provided. Please share your test results or ask about a specific test.";

pub const CLARIFY_MEANING_RESPONSE: &str = "Based on the test analysis provided, I can see some values from your bloodwork. To give you a more specific interpretation, could you ask about a particular test or value you're concerned about?";

pub const NORMAL_RANGES_RESPONSE: &str = "Normal ranges for blood tests vary depending on the specific test, your age, gender, and the laboratory that performed the test. The test results typically indicate the reference range next to your result. If you're asking about a specific test, please mention which one you're interested in.";

pub const DEFAULT_RESPONSE: &str = "I'm here to help you understand your blood test results. Based on the information provided, I can see some basic test data. If you have specific questions about particular values or tests, please let me know which ones you're interested in.";

const SUMMARY_HEADER: &str = "Here's a summary of your test results:\n\n";
const SUMMARY_FOOTER: &str = "\nWould you like more detailed information about any specific test?";

/// Requests for an overview of every result.
static SUMMARY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\btell\s+me\s+about\s+my\s+(?:test\s+)?results\b",
        r"(?i)\bexplain\s+my\s+(?:test\s+)?results\b",
        r"(?i)\bwhat\s+do\s+my\s+(?:test\s+)?results\s+mean\b",
        r"(?i)\bsummari[sz]e\s+my\s+(?:test\s+)?results\b",
        r"(?i)\boverview\s+of\s+my\s+(?:test\s+)?results\b",
        r"(?i)\binterpret\s+my\s+(?:test\s+)?results\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("Invalid summary pattern"))
    .collect()
});

/// Whole-word question aliases per test.
static QUESTION_ALIASES: LazyLock<Vec<(LabTest, Vec<Regex>)>> = LazyLock::new(|| {
    LabTest::ALL
        .into_iter()
        .map(|test| {
            let regexes = test
                .profile()
                .question_aliases
                .iter()
                .map(|alias| {
                    Regex::new(&format!(r"(?i)\b(?:{alias})\b")).expect("Invalid question alias")
                })
                .collect();
            (test, regexes)
        })
        .collect()
});

pub fn is_summary_request(question: &str) -> bool {
    SUMMARY_PATTERNS.iter().any(|re| re.is_match(question))
}

#[derive(Debug, Clone, Copy)]
struct Mention {
    test: LabTest,
    start: usize,
    end: usize,
}

impl Mention {
    fn len(&self) -> usize {
        self.end - self.start
    }

    /// A longer match of another test spans this one.
    fn is_shadowed_by(&self, other: &Mention) -> bool {
        other.test != self.test
            && other.start <= self.start
            && other.end >= self.end
            && other.len() > self.len()
    }
}

/// Tests named in `question`, in order of first appearance.
///
/// Where aliases overlap the longest match wins, so "hemoglobin a1c" is
/// A1C and "hdl cholesterol" is HDL.
pub fn mentioned_tests(question: &str) -> Vec<LabTest> {
    let mentions: Vec<Mention> = QUESTION_ALIASES
        .iter()
        .flat_map(|(test, regexes)| {
            regexes.iter().flat_map(move |re| {
                re.find_iter(question).map(move |m| Mention {
                    test: *test,
                    start: m.start(),
                    end: m.end(),
                })
            })
        })
        .collect();

    let mut kept: Vec<Mention> = mentions
        .iter()
        .filter(|m| !mentions.iter().any(|other| m.is_shadowed_by(other)))
        .copied()
        .collect();
    kept.sort_by_key(|m| (m.start, std::cmp::Reverse(m.len())));

    let mut tests = Vec::new();
    for mention in kept {
        if !tests.contains(&mention.test) {
            tests.push(mention.test);
        }
    }
    tests
}

/// Multi-line overview of every extracted value in canonical order.
pub fn summarize(values: &ExtractedValues) -> String {
    if values.is_empty() {
        return NO_VALUES_RESPONSE.to_string();
    }

    let mut summary = String::from(SUMMARY_HEADER);
    for (test, value) in values.iter() {
        summary.push_str(&format!("• {}: {} ", test.key().to_uppercase(), value));
        match test.reference() {
            Some(table) => {
                summary.push_str(&format!("({})\n", table.range));
                if let Some(rule) = table.classify(value) {
                    summary.push_str(&format!("  - {}\n", rule.summary));
                }
            }
            None => summary.push_str("(no reference range available)\n"),
        }
    }
    summary.push_str(SUMMARY_FOOTER);
    summary
}

/// Answer `question` from the extracted values alone.
///
/// Checked in order: overview request, a mentioned test with a value and a
/// reference table, any mentioned test, generic "what ... mean" and
/// "normal" questions, then a default offer to help.
pub fn answer(values: &ExtractedValues, question: &str) -> String {
    if is_summary_request(question) {
        return summarize(values);
    }

    let mentioned = mentioned_tests(question);

    let banded = mentioned.iter().find_map(|test| {
        let value = values.get(*test)?;
        let rule = test.reference()?.classify(value)?;
        Some(rule.render_answer(value))
    });
    if let Some(text) = banded {
        return text;
    }

    if let Some(test) = mentioned.first() {
        let description = test.profile().description;
        return match values.get(*test) {
            Some(value) => format!(
                "Your {} result is {}. {}",
                test.key().to_uppercase(),
                value,
                description
            ),
            None => description.to_string(),
        };
    }

    let lower = question.to_lowercase();
    if lower.contains("what") && lower.contains("mean") {
        return CLARIFY_MEANING_RESPONSE.to_string();
    }
    if lower.contains("normal") {
        return NORMAL_RANGES_RESPONSE.to_string();
    }

    DEFAULT_RESPONSE.to_string()
}
