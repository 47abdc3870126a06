//! Chat turn handling: parse the transcript, ask the chat model, and fall
//! back to canned answers built from the values in the prior analysis.

pub mod fallback;
pub mod prompt;
pub mod transcript;
pub mod values;

pub use fallback::answer;
pub use prompt::build_chat_prompt;
pub use transcript::{parse_transcript, read_transcript, ParsedTranscript};
pub use values::{extract_values, ExtractedValues};

use serde::Serialize;

use crate::config::CHAT_MODEL;
use crate::pipeline::generation::LlmClient;

/// Reply when the transcript holds no user question.
pub const NO_QUESTION_RESPONSE: &str =
    "I'm here to help with your blood test results. What would you like to know?";

/// Reply when the transcript file cannot be read.
pub const UNREADABLE_TRANSCRIPT_RESPONSE: &str =
    "I'm sorry, I encountered an error. Please try again.";

const GENERATIVE_PREFIX: &str = "[Gemini 1.5 Flash] ";
const FALLBACK_PREFIX: &str = "[Mock Response] ";

/// Which path produced a chat reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Generative,
    Fallback,
    NoQuestion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplySource,
}

impl ChatReply {
    /// Reply as shown to the user, tagged with where it came from.
    pub fn to_display(&self) -> String {
        match self.source {
            ReplySource::Generative => format!("{GENERATIVE_PREFIX}{}", self.text),
            ReplySource::Fallback => format!("{FALLBACK_PREFIX}{}", self.text),
            ReplySource::NoQuestion => self.text.clone(),
        }
    }
}

/// Answer the last user message of a raw transcript.
pub fn respond(transcript: &str, client: &dyn LlmClient) -> ChatReply {
    respond_to(&parse_transcript(transcript), client)
}

pub fn respond_to(parsed: &ParsedTranscript, client: &dyn LlmClient) -> ChatReply {
    if !parsed.has_question() {
        return fallback_reply(parsed);
    }

    let prompt = build_chat_prompt(parsed);
    match client.generate(CHAT_MODEL, &prompt) {
        Ok(text) => {
            tracing::info!(chars = text.len(), "Chat reply from generative model");
            ChatReply {
                text,
                source: ReplySource::Generative,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Chat model failed, using fallback answers");
            fallback_reply(parsed)
        }
    }
}

/// Answer without the model, from the values in the prior analysis.
pub fn fallback_reply(parsed: &ParsedTranscript) -> ChatReply {
    if !parsed.has_question() {
        return ChatReply {
            text: NO_QUESTION_RESPONSE.to_string(),
            source: ReplySource::NoQuestion,
        };
    }
    let values = extract_values(&parsed.prior_analysis);
    ChatReply {
        text: answer(&values, &parsed.last_user_message),
        source: ReplySource::Fallback,
    }
}
