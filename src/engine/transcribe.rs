//! HTTP client for an OpenAI-compatible transcription server

use serde::Deserialize;
use tracing::debug;

use super::types::{Transcript, TranscriptSegment};
use super::{status_error, Transcriber};
use crate::audio::io::encode_wav_bytes;
use crate::error::EngineError;

/// Client for a Whisper-style `/v1/audio/transcriptions` server
pub struct HttpTranscriber {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
    /// Seconds-based segments from `verbose_json`
    #[serde(default)]
    segments: Vec<SegmentResponse>,
}

#[derive(Deserialize)]
struct SegmentResponse {
    start: f64,
    end: f64,
    text: String,
}

impl From<TranscriptionResponse> for Transcript {
    fn from(response: TranscriptionResponse) -> Self {
        let segments = response
            .segments
            .into_iter()
            .map(|s| TranscriptSegment {
                text: s.text.trim().to_string(),
                start_ms: (s.start * 1000.0).round() as i64,
                end_ms: (s.end * 1000.0).round() as i64,
            })
            .collect();

        Transcript {
            text: response.text.trim().to_string(),
            segments,
        }
    }
}

impl HttpTranscriber {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }
}

impl Transcriber for HttpTranscriber {
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<Transcript, EngineError> {
        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        debug!(
            "Transcribing {:.2}s of audio",
            samples.len() as f32 / sample_rate as f32
        );

        let wav = encode_wav_bytes(samples, sample_rate)
            .map_err(|e| EngineError::Request(e.to_string()))?;

        let file_part = reqwest::blocking::multipart::Part::bytes(wav)
            .file_name("audio.wav".to_string())
            .mime_str("audio/wav")
            .map_err(|e| EngineError::Request(e.to_string()))?;

        let form = reqwest::blocking::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json".to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        Ok(parsed.into())
    }
}
