//! HTTP client for an OpenAI-compatible speech server

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{SynthesisRequest, SynthesizedAudio};
use super::{status_error, SpeechSynthesizer};
use crate::audio::io::decode_wav_bytes;
use crate::error::EngineError;

/// Client for a Kokoro-style `/v1/audio/speech` server
pub struct HttpSynthesizer {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'a str,
    lang_code: &'a str,
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<String>,
}

impl HttpSynthesizer {
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

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SpeechSynthesizer for HttpSynthesizer {
    fn voices(&self) -> Result<Vec<String>, EngineError> {
        let url = format!("{}/v1/audio/voices", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: VoicesResponse = response
            .json()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let mut voices = parsed.voices;
        voices.sort();
        Ok(voices)
    }

    fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, EngineError> {
        let url = format!("{}/v1/audio/speech", self.base_url);
        debug!(
            "Synthesizing {} chars with voice '{}'",
            request.text.len(),
            request.voice
        );

        let body = SpeechRequest {
            model: &self.model,
            input: &request.text,
            voice: &request.voice,
            speed: request.speed,
            response_format: "wav",
            lang_code: &request.language,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let bytes = response
            .bytes()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let (samples, sample_rate) =
            decode_wav_bytes(&bytes).map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        if samples.is_empty() {
            return Err(EngineError::InvalidResponse(
                "engine returned empty audio".to_string(),
            ));
        }

        Ok(SynthesizedAudio {
            samples,
            sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voices_response_deserialization() {
        let json = r#"{"voices": ["af_sky", "af_sarah", "am_adam"]}"#;
        let parsed: VoicesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.voices.len(), 3);
        assert_eq!(parsed.voices[0], "af_sky");
    }

    #[test]
    fn test_speech_request_serialization() {
        let body = SpeechRequest {
            model: "kokoro",
            input: "Hello there",
            voice: "af_sky",
            speed: 1.25,
            response_format: "wav",
            lang_code: "en-us",
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "kokoro");
        assert_eq!(value["input"], "Hello there");
        assert_eq!(value["voice"], "af_sky");
        assert_eq!(value["response_format"], "wav");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let synth = HttpSynthesizer::new("http://localhost:8880/", "kokoro", 30).unwrap();
        assert_eq!(synth.base_url(), "http://localhost:8880");
    }
}
