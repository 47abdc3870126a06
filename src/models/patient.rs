use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Optional patient details sent alongside an uploaded report.
///
/// Accepts the upload form's JSON as-is: `diseases` is read as `history`,
/// `age` may be a number or a numeric string, unknown keys are ignored.
/// A field of the wrong type is dropped on its own; the others are kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawPatientContext")]
pub struct PatientContext {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub history: Option<String>,
}

/// Upload form fields before type checks. `history` wins over `diseases`.
#[derive(Deserialize)]
struct RawPatientContext {
    #[serde(default)]
    age: Option<Value>,
    #[serde(default)]
    gender: Option<Value>,
    #[serde(default)]
    history: Option<Value>,
    #[serde(default)]
    diseases: Option<Value>,
}

impl From<RawPatientContext> for PatientContext {
    fn from(raw: RawPatientContext) -> Self {
        Self {
            age: raw.age.and_then(lenient_age),
            gender: raw.gender.and_then(lenient_text),
            history: raw
                .history
                .and_then(lenient_text)
                .or_else(|| raw.diseases.and_then(lenient_text)),
        }
    }
}

impl PatientContext {
    /// Parse the upload boundary's JSON. Malformed input yields `None`
    /// (logged) rather than failing the upload.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(raw) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed patient info");
                None
            }
        }
    }

    /// Age, if present and non-zero.
    pub fn age(&self) -> Option<u32> {
        self.age.filter(|a| *a > 0)
    }

    pub fn gender(&self) -> Option<&str> {
        non_blank(self.gender.as_deref())
    }

    pub fn history(&self) -> Option<&str> {
        non_blank(self.history.as_deref())
    }

    /// True when no field would be rendered.
    pub fn is_empty(&self) -> bool {
        self.age().is_none() && self.gender().is_none() && self.history().is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn lenient_age(value: Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strings pass through; numbers and booleans keep their JSON spelling.
fn lenient_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_form_json() {
        let ctx =
            PatientContext::from_json(r#"{"age": 54, "gender": "female", "diseases": "asthma"}"#)
                .unwrap();
        assert_eq!(ctx.age(), Some(54));
        assert_eq!(ctx.gender(), Some("female"));
        assert_eq!(ctx.history(), Some("asthma"));
    }

    #[test]
    fn age_as_string_is_accepted() {
        let ctx = PatientContext::from_json(r#"{"age": "41"}"#).unwrap();
        assert_eq!(ctx.age(), Some(41));
    }

    #[test]
    fn unparseable_age_is_dropped() {
        let ctx = PatientContext::from_json(r#"{"age": "forty", "gender": "male"}"#).unwrap();
        assert_eq!(ctx.age(), None);
        assert_eq!(ctx.gender(), Some("male"));
    }

    #[test]
    fn blank_and_null_fields_count_as_absent() {
        let ctx =
            PatientContext::from_json(r#"{"age": null, "gender": "  ", "history": ""}"#).unwrap();
        assert!(ctx.is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let ctx = PatientContext::from_json(r#"{"name": "Ana", "age": 30}"#).unwrap();
        assert_eq!(ctx.age(), Some(30));
    }

    #[test]
    fn malformed_json_returns_none() {
        assert!(PatientContext::from_json("{not json").is_none());
    }

    #[test]
    fn zero_age_is_absent() {
        let ctx = PatientContext::from_json(r#"{"age": 0}"#).unwrap();
        assert!(ctx.is_empty());
    }

    #[test]
    fn badly_typed_gender_keeps_other_fields() {
        let ctx = PatientContext::from_json(r#"{"age": 54, "gender": 1}"#).unwrap();
        assert_eq!(ctx.age(), Some(54));
        assert_eq!(ctx.gender(), Some("1"));

        let ctx = PatientContext::from_json(r#"{"age": 54, "gender": {"value": "f"}}"#).unwrap();
        assert_eq!(ctx.age(), Some(54));
        assert_eq!(ctx.gender(), None);
    }

    #[test]
    fn history_wins_over_diseases() {
        let ctx =
            PatientContext::from_json(r#"{"age": 54, "history": "a", "diseases": "b"}"#).unwrap();
        assert_eq!(ctx.age(), Some(54));
        assert_eq!(ctx.history(), Some("a"));

        let ctx =
            PatientContext::from_json(r#"{"history": ["x"], "diseases": "asthma"}"#).unwrap();
        assert_eq!(ctx.history(), Some("asthma"));
    }

    #[test]
    fn non_object_json_returns_none() {
        assert!(PatientContext::from_json("\"54\"").is_none());
    }
}
