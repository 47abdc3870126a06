use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;

use labwise::chat::{self, parse_transcript, read_transcript, UNREADABLE_TRANSCRIPT_RESPONSE};
use labwise::config::{self, GenerativeConfig};
use labwise::models::PatientContext;
use labwise::pipeline::extraction::{extract_rows, DocumentExtractor};
use labwise::pipeline::generation::GeminiClient;
use labwise::pipeline::processor::process_document;
use labwise::pipeline::storage::{save_table, write_table};

#[derive(Debug, Parser)]
#[command(
    name = "labwise",
    version,
    about = "Extract lab-report results, analyze them, and answer questions about them"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract results from a report, save them as CSV and print the analysis as JSON
    Analyze {
        /// Lab report (PDF or plain text)
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Patient details, e.g. '{"age": 54, "gender": "female", "diseases": "asthma"}'
        #[arg(long, value_name = "JSON")]
        patient_info: Option<String>,
    },

    /// Extract result rows and write them as CSV
    Extract {
        /// Lab report (PDF or plain text)
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,

        /// Write the table here instead of stdout
        #[arg(short, long, value_name = "CSV")]
        output: Option<PathBuf>,
    },

    /// Answer the last user message of a chat transcript file
    Chat {
        /// File holding `TEST_ANALYSIS:<text>`, a blank line, then `User:`/`AI:` lines
        #[arg(value_name = "TRANSCRIPT")]
        transcript: PathBuf,
    },
}

fn main() -> ExitCode {
    labwise::init_tracing();
    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            document,
            patient_info,
        } => run_analyze(&document, patient_info.as_deref()),
        Command::Extract { document, output } => run_extract(&document, output.as_deref()),
        Command::Chat { transcript } => run_chat(&transcript),
    }
}

/// Always prints exactly one JSON object on stdout.
fn run_analyze(document: &Path, patient_info: Option<&str>) -> ExitCode {
    let context = patient_info.and_then(PatientContext::from_json);

    let output = match GeminiClient::new(GenerativeConfig::from_env()) {
        Ok(client) => match process_document(document, context.as_ref(), &client) {
            Ok(report) => json!({ "analysis": report.analysis }),
            Err(e) => json!({ "error": e.to_string() }),
        },
        Err(e) => json!({ "error": e.to_string() }),
    };

    println!("{output}");
    ExitCode::SUCCESS
}

fn run_extract(document: &Path, output: Option<&Path>) -> ExitCode {
    let text = DocumentExtractor::default().extract_or_empty(document);
    let rows = extract_rows(&text);

    let result = match output {
        Some(path) => save_table(&rows, path).map(|layout| {
            tracing::info!(path = %path.display(), ?layout, "Table written");
        }),
        None => write_table(&rows).and_then(|bytes| {
            std::io::stdout()
                .write_all(&bytes)
                .map_err(Into::into)
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Could not write results table");
            ExitCode::FAILURE
        }
    }
}

fn run_chat(transcript: &Path) -> ExitCode {
    let text = match read_transcript(transcript) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(path = %transcript.display(), error = %e, "Cannot read transcript");
            println!("{UNREADABLE_TRANSCRIPT_RESPONSE}");
            return ExitCode::FAILURE;
        }
    };

    let parsed = parse_transcript(&text);
    let reply = match GeminiClient::new(GenerativeConfig::from_env()) {
        Ok(client) => chat::respond_to(&parsed, &client),
        Err(e) => {
            tracing::warn!(error = %e, "Chat model client unavailable");
            chat::fallback_reply(&parsed)
        }
    };

    println!("{}", reply.to_display());
    ExitCode::SUCCESS
}
