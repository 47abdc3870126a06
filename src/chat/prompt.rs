use super::transcript::ParsedTranscript;

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful medical assistant chatbot that can answer questions about blood test results.
You should provide accurate, helpful information based on the blood test analysis provided.
Be conversational and friendly, but professional. If you don't know something, admit it.
Keep your responses concise and focused on the user's question.";

/// Build the prompt for one chat turn.
pub fn build_chat_prompt(transcript: &ParsedTranscript) -> String {
    let mut prompt = String::from(CHAT_SYSTEM_PROMPT);
    prompt.push_str("\n\n");

    prompt.push_str("Blood Test Analysis:\n");
    prompt.push_str(&transcript.prior_analysis);
    prompt.push_str("\n\n");

    prompt.push_str("Previous conversation:\n");
    prompt.push_str(&transcript.conversation);
    prompt.push_str("\n\n");

    prompt.push_str(&format!("User: {}\nAI:", transcript.last_user_message));
    prompt
}
