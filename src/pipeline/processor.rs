//! Document processing orchestrator.
//!
//! Drives the upload pipeline for one report:
//! extract text → split result rows → save table → analyze.
//!
//! The PDF backend and the model client are injected so the whole pipeline
//! runs against mocks in tests.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::{PatientContext, ResultRow};
use crate::pipeline::analysis::analyze;
use crate::pipeline::extraction::{extract_rows, DocumentExtractor};
use crate::pipeline::generation::LlmClient;
use crate::pipeline::storage::{save_table, StorageError, TableLayout};

/// Errors that stop a document from being processed.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to save results table: {0}")]
    Storage(#[from] StorageError),
}

/// Everything produced for one uploaded report.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedReport {
    pub rows: Vec<ResultRow>,
    pub table_path: PathBuf,
    pub table_layout: TableLayout,
    pub analysis: String,
}

/// Where the results table for `document` is written: next to it, with a
/// `.csv` extension. A document that already is a `.csv` gets a
/// `.results.csv` sibling instead of being overwritten.
pub fn table_path_for(document: &Path) -> PathBuf {
    let is_csv = document
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        document.with_extension("results.csv")
    } else {
        document.with_extension("csv")
    }
}

pub struct DocumentProcessor<'a> {
    extractor: DocumentExtractor,
    client: &'a dyn LlmClient,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(extractor: DocumentExtractor, client: &'a dyn LlmClient) -> Self {
        Self { extractor, client }
    }

    /// Extract, persist and analyze the report at `path`.
    ///
    /// An unreadable document is not an error: it yields zero rows and the
    /// analysis runs on an empty results block.
    pub fn process(
        &self,
        path: &Path,
        context: Option<&PatientContext>,
    ) -> Result<ProcessedReport, ProcessingError> {
        let text = self.extractor.extract_or_empty(path);
        let rows = extract_rows(&text);
        tracing::info!(path = %path.display(), rows = rows.len(), "Result rows extracted");

        let table_path = table_path_for(path);
        let table_layout = save_table(&rows, &table_path)?;

        let analysis = analyze(&rows, context, self.client);

        Ok(ProcessedReport {
            rows,
            table_path,
            table_layout,
            analysis,
        })
    }
}

/// Process a report with the default extractor.
pub fn process_document(
    path: &Path,
    context: Option<&PatientContext>,
    client: &dyn LlmClient,
) -> Result<ProcessedReport, ProcessingError> {
    DocumentProcessor::new(DocumentExtractor::default(), client).process(path, context)
}
