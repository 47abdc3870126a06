//! One-shot report analysis: rows (or a saved table) plus optional patient
//! details go to the analysis model as a single prompt.

pub mod prompt;

pub use prompt::*;

use std::path::Path;

use crate::config::ANALYSIS_MODEL;
use crate::models::{PatientContext, ResultRow};
use crate::pipeline::generation::LlmClient;
use crate::pipeline::storage::read_table_file;

/// Prefix of the text returned in place of an analysis when it fails.
pub const ANALYSIS_ERROR_PREFIX: &str = "Error analyzing bloodwork: ";

fn failure(error: impl std::fmt::Display) -> String {
    format!("{ANALYSIS_ERROR_PREFIX}{error}")
}

/// True when `text` is the failure sentinel rather than a model reply.
pub fn is_analysis_error(text: &str) -> bool {
    text.starts_with(ANALYSIS_ERROR_PREFIX)
}

/// Send the composed prompt to the analysis model. Returns the reply
/// verbatim, or the failure sentinel; never errors.
pub fn analyze(
    rows: &[ResultRow],
    context: Option<&PatientContext>,
    client: &dyn LlmClient,
) -> String {
    let prompt = compose_prompt(rows, context);
    tracing::info!(
        rows = rows.len(),
        with_context = context.is_some_and(|c| !c.is_empty()),
        "Requesting report analysis"
    );

    match client.generate(ANALYSIS_MODEL, &prompt) {
        Ok(text) => {
            tracing::debug!(chars = text.len(), "Analysis received");
            text
        }
        Err(e) => {
            tracing::warn!(error = %e, "Report analysis failed");
            failure(e)
        }
    }
}

/// `analyze` over a previously saved results table.
pub fn analyze_table(
    path: &Path,
    context: Option<&PatientContext>,
    client: &dyn LlmClient,
) -> String {
    match read_table_file(path) {
        Ok(rows) => analyze(&rows, context, client),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read results table");
            failure(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generation::MockLlmClient;
    use crate::pipeline::storage::save_table;

    #[test]
    fn returns_model_reply_verbatim() {
        let client = MockLlmClient::new("Summary:\nAll good.");
        let rows = vec![ResultRow::new("Glucose", "90", "mg/dL", "70-99")];
        let reply = analyze(&rows, None, &client);
        assert_eq!(reply, "Summary:\nAll good.");

        let calls = client.calls();
        assert_eq!(calls[0].0, ANALYSIS_MODEL);
        assert!(calls[0].1.contains("Glucose: 90 mg/dL (Reference Range: 70-99)"));
    }

    #[test]
    fn failure_becomes_sentinel() {
        let reply = analyze(&[], None, &MockLlmClient::failing());
        assert!(is_analysis_error(&reply));
        assert!(reply.starts_with("Error analyzing bloodwork: "));
    }

    #[test]
    fn analyze_table_reads_saved_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        save_table(&[ResultRow::new("BUN", "15", "mg/dL", "7-20")], &path).unwrap();

        let client = MockLlmClient::new("ok");
        let ctx = PatientContext {
            age: Some(40),
            ..PatientContext::default()
        };
        assert_eq!(analyze_table(&path, Some(&ctx), &client), "ok");

        let prompt = &client.calls()[0].1;
        assert!(prompt.contains("BUN: 15 mg/dL (Reference Range: 7-20)"));
        assert!(prompt.contains("Patient Age: 40 years"));
    }

    #[test]
    fn unreadable_table_becomes_sentinel_without_model_call() {
        let client = MockLlmClient::new("unused");
        let reply = analyze_table(Path::new("/nonexistent/labwise/report.csv"), None, &client);
        assert!(is_analysis_error(&reply));
        assert!(client.calls().is_empty());
    }
}
