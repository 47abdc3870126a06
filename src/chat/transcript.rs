use std::path::Path;

use serde::Serialize;

/// Prefix marking the prior analysis at the top of a chat transcript.
pub const ANALYSIS_PREFIX: &str = "TEST_ANALYSIS:";

const USER_PREFIX: &str = "User:";

/// A chat transcript split into its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedTranscript {
    pub prior_analysis: String,
    pub conversation: String,
    pub last_user_message: String,
}

impl ParsedTranscript {
    pub fn has_question(&self) -> bool {
        !self.last_user_message.is_empty()
    }
}

/// Split `TEST_ANALYSIS:<text>\n\n<conversation lines>`.
///
/// Only the first blank line separates the two parts; the analysis is
/// recognised only when the first part carries the prefix. Any shape of
/// input parses, missing parts come back empty.
pub fn parse_transcript(text: &str) -> ParsedTranscript {
    let text = text.replace("\r\n", "\n");
    let (head, conversation) = match text.split_once("\n\n") {
        Some((head, rest)) => (head, rest),
        None => (text.as_str(), ""),
    };

    let prior_analysis = head
        .strip_prefix(ANALYSIS_PREFIX)
        .map(|a| a.trim().to_string())
        .unwrap_or_default();

    let last_user_message = conversation
        .split('\n')
        .filter_map(|line| line.strip_prefix(USER_PREFIX))
        .last()
        .map(|m| m.trim().to_string())
        .unwrap_or_default();

    ParsedTranscript {
        prior_analysis,
        conversation: conversation.to_string(),
        last_user_message,
    }
}

/// Read a transcript file. Bytes that are not UTF-8 become U+FFFD, so
/// only a missing or unreadable file is an error.
pub fn read_transcript(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_analysis_and_conversation() {
        let parsed = parse_transcript(
            "TEST_ANALYSIS: glucose is 105\n\nUser: hi\nAI: hello\nUser:  what about my glucose? ",
        );
        assert_eq!(parsed.prior_analysis, "glucose is 105");
        assert_eq!(parsed.conversation, "User: hi\nAI: hello\nUser:  what about my glucose? ");
        assert_eq!(parsed.last_user_message, "what about my glucose?");
        assert!(parsed.has_question());
    }

    #[test]
    fn only_first_blank_line_splits() {
        let parsed = parse_transcript("TEST_ANALYSIS: a\n\nUser: one\n\nUser: two");
        assert_eq!(parsed.conversation, "User: one\n\nUser: two");
        assert_eq!(parsed.last_user_message, "two");
    }

    #[test]
    fn analysis_requires_prefix() {
        let parsed = parse_transcript("glucose is 105\n\nUser: hi");
        assert_eq!(parsed.prior_analysis, "");
        assert_eq!(parsed.last_user_message, "hi");
    }

    #[test]
    fn multi_line_analysis_is_kept_up_to_blank_line() {
        let parsed = parse_transcript("TEST_ANALYSIS: glucose is 105\nbun is 15\n\nUser: q");
        assert_eq!(parsed.prior_analysis, "glucose is 105\nbun is 15");
    }

    #[test]
    fn no_separator_means_no_conversation() {
        let parsed = parse_transcript("TEST_ANALYSIS: glucose is 105\nUser: hi");
        assert_eq!(parsed.conversation, "");
        assert!(!parsed.has_question());
    }

    #[test]
    fn indented_user_lines_are_ignored() {
        let parsed = parse_transcript("TEST_ANALYSIS: x\n\n  User: hidden\nAI: ok");
        assert_eq!(parsed.last_user_message, "");
    }

    #[test]
    fn crlf_transcripts_parse_like_lf() {
        let parsed = parse_transcript("TEST_ANALYSIS: glucose is 105\r\n\r\nUser: hi\r\nUser: glucose?\r\n");
        assert_eq!(parsed.prior_analysis, "glucose is 105");
        assert_eq!(parsed.last_user_message, "glucose?");
    }

    #[test]
    fn empty_input_parses_to_empty_parts() {
        assert_eq!(parse_transcript(""), ParsedTranscript::default());
    }

    #[test]
    fn invalid_utf8_transcript_is_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.txt");
        std::fs::write(&path, b"TEST_ANALYSIS: glucose is 105\n\nUser: hi \xff\xfe").unwrap();

        let text = read_transcript(&path).unwrap();
        let parsed = parse_transcript(&text);
        assert_eq!(parsed.prior_analysis, "glucose is 105");
        assert_eq!(parsed.last_user_message, "hi \u{FFFD}\u{FFFD}");

        std::fs::write(&path, [0xC3u8, 0x28, 0xA0]).unwrap();
        assert!(!parse_transcript(&read_transcript(&path).unwrap()).has_question());
    }

    #[test]
    fn missing_transcript_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_transcript(&dir.path().join("absent.txt")).is_err());
    }
}
