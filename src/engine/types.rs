//! Request and response records shared by the engine traits

/// Parameters for one synthesis call
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    /// Text to speak
    pub text: String,
    /// Voice identifier
    pub voice: String,
    /// Speed multiplier (1.0 = normal)
    pub speed: f32,
    /// Language code (e.g. "en-us")
    pub language: String,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            speed: 1.0,
            language: "en-us".to_string(),
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Mono audio returned by a synthesis engine
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    /// Samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl SynthesizedAudio {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// One timed segment of a transcription
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Transcribed text
    pub text: String,
    /// Start time in milliseconds
    pub start_ms: i64,
    /// End time in milliseconds
    pub end_ms: i64,
}

/// Complete transcription result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    /// Full transcribed text
    pub text: String,
    /// Timed segments
    pub segments: Vec<TranscriptSegment>,
}
