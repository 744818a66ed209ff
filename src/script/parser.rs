//! Parsers for the `speaker: text` script format and plain documents

use tracing::debug;

use super::{ScriptLine, VoiceSet};
use crate::error::ScriptError;

/// Parse a `speaker: text` script into ordered lines.
///
/// Blank lines are skipped but still counted, so reported line numbers
/// match the source file. The speaker part is trimmed and lower-cased
/// before the voice lookup; the colon separator is mandatory.
pub fn parse_script(content: &str, voices: &VoiceSet) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some((speaker_part, text_part)) = trimmed.split_once(':') else {
            return Err(ScriptError::MissingSeparator { line: line_no });
        };

        let speaker = speaker_part.trim().to_lowercase();
        let text = text_part.trim();

        if !voices.contains(&speaker) {
            return Err(ScriptError::UnknownSpeaker {
                line: line_no,
                speaker,
            });
        }
        if text.is_empty() {
            return Err(ScriptError::EmptyText { line: line_no });
        }

        lines.push(ScriptLine::new(speaker, text));
    }

    debug!("Parsed {} script lines", lines.len());
    Ok(lines)
}

/// Split a document into trimmed, non-empty paragraphs.
///
/// Paragraphs are separated by blank lines. Runs of blank lines
/// collapse, so the result never contains empty entries.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
