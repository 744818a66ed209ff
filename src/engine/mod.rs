//! Engine capability traits and their HTTP implementations.
//!
//! Pipelines take these traits as `&dyn` handles, so any synthesis,
//! transcription or chat backend can be swapped in, including mocks
//! in tests.

mod chat;
mod speech;
mod transcribe;
pub mod types;

pub use chat::OllamaChat;
pub use speech::HttpSynthesizer;
pub use transcribe::HttpTranscriber;
pub use types::{SynthesisRequest, SynthesizedAudio, Transcript, TranscriptSegment};

use crate::error::EngineError;

/// Build the error for a non-success HTTP response, keeping whatever
/// detail the server put in the body.
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> EngineError {
    let body = body.trim();
    if body.is_empty() {
        EngineError::Request(format!("Status: {}", status))
    } else {
        EngineError::Request(format!("Status: {}: {}", status, body))
    }
}

/// Text-to-speech capability
#[cfg_attr(test, mockall::automock)]
pub trait SpeechSynthesizer: Send + Sync {
    /// List the voice identifiers the engine accepts
    fn voices(&self) -> Result<Vec<String>, EngineError>;

    /// Synthesize one piece of text into mono audio
    fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, EngineError>;
}

/// Speech-to-text capability
#[cfg_attr(test, mockall::automock)]
pub trait Transcriber: Send + Sync {
    /// Transcribe mono audio into text with timed segments
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<Transcript, EngineError>;
}

/// Chat completion capability
#[cfg_attr(test, mockall::automock)]
pub trait ChatModel: Send + Sync {
    /// List available model names, sorted
    fn models(&self) -> Result<Vec<String>, EngineError>;

    /// Generate a reply for the prompt
    fn generate(&self, model: &str, prompt: &str) -> Result<String, EngineError>;
}
