//! Configuration structures for the voxstudio system

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engines: EngineConfig,
    pub synthesis: SynthesisConfig,
    pub pacing: PacingConfig,
    pub enhance: EnhanceConfig,
    pub chat: ChatConfig,
    pub subtitle: SubtitleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engines: EngineConfig::default(),
            synthesis: SynthesisConfig::default(),
            pacing: PacingConfig::default(),
            enhance: EnhanceConfig::default(),
            chat: ChatConfig::default(),
            subtitle: SubtitleConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, crate::error::ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| {
            crate::error::ConfigError::FileNotFound(path.display().to_string())
        })?;

        toml::from_str(&content)
            .map_err(|e| crate::error::ConfigError::Parse(e.to_string()))
    }

    /// Check numeric ranges before any pipeline runs
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;

        let invalid = |field: &str, value: String| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        };

        if self.pacing.dialogue_pause_min_secs < 0.0
            || self.pacing.dialogue_pause_max_secs < self.pacing.dialogue_pause_min_secs
        {
            return Err(invalid(
                "pacing.dialogue_pause",
                format!(
                    "{}..{}",
                    self.pacing.dialogue_pause_min_secs, self.pacing.dialogue_pause_max_secs
                ),
            ));
        }
        if self.pacing.narration_pause_secs < 0.0 {
            return Err(invalid(
                "pacing.narration_pause_secs",
                self.pacing.narration_pause_secs.to_string(),
            ));
        }
        if self.pacing.fallback_sample_rate == 0 {
            return Err(invalid("pacing.fallback_sample_rate", "0".to_string()));
        }
        if self.synthesis.speed <= 0.0 {
            return Err(invalid("synthesis.speed", self.synthesis.speed.to_string()));
        }
        if self.chat.history_limit == 0 {
            return Err(invalid("chat.history_limit", "0".to_string()));
        }
        self.enhance
            .validate()
            .map_err(|e| invalid("enhance", e.to_string()))?;

        Ok(())
    }
}

/// Engine endpoints and model identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the OpenAI-compatible speech server
    pub speech_url: String,
    /// Model name sent with synthesis requests
    pub speech_model: String,
    /// Base URL of the OpenAI-compatible transcription server
    pub transcribe_url: String,
    /// Model name sent with transcription requests
    pub transcribe_model: String,
    /// Base URL of the Ollama server
    pub chat_url: String,
    /// Default chat model (None = pick the first listed)
    pub chat_model: Option<String>,
    /// HTTP request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speech_url: "http://localhost:8880".to_string(),
            speech_model: "kokoro".to_string(),
            transcribe_url: "http://localhost:8000".to_string(),
            transcribe_model: "whisper-1".to_string(),
            chat_url: "http://localhost:11434".to_string(),
            chat_model: None,
            timeout_secs: 120,
        }
    }
}

/// Synthesis defaults applied when flags don't override them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Default narrator voice
    pub voice: String,
    /// Speech speed multiplier
    pub speed: f32,
    /// Language code passed to the engine
    pub language: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            voice: "af_sky".to_string(),
            speed: 1.0,
            language: "en-us".to_string(),
        }
    }
}

/// Pause durations inserted between assembled segments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Shortest pause between dialogue lines (seconds)
    pub dialogue_pause_min_secs: f32,
    /// Longest pause between dialogue lines (seconds)
    pub dialogue_pause_max_secs: f32,
    /// Fixed pause between narration paragraphs (seconds)
    pub narration_pause_secs: f32,
    /// Sample rate of an empty program (Hz)
    pub fallback_sample_rate: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            dialogue_pause_min_secs: 0.5,
            dialogue_pause_max_secs: 1.0,
            narration_pause_secs: 0.5,
            fallback_sample_rate: 24000,
        }
    }
}

/// Parameters for one enhancement run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Output sample rate (Hz)
    pub sample_rate: u32,
    /// Enable spectral noise reduction
    pub noise_reduction: bool,
    /// Treat the noise floor as stationary
    pub noise_stationary: bool,
    /// Proportion of the estimated noise to remove (0.0 - 1.0)
    pub noise_prop_decrease: f32,
    /// Noise gate threshold (dB)
    pub gate_threshold_db: f32,
    /// Noise gate expansion ratio
    pub gate_ratio: f32,
    /// Noise gate release time (ms)
    pub gate_release_ms: f32,
    /// Compressor threshold (dB)
    pub comp_threshold_db: f32,
    /// Compressor ratio
    pub comp_ratio: f32,
    /// Low-shelf filter cutoff (Hz)
    pub low_shelf_cutoff_hz: f32,
    /// Low-shelf filter gain (dB)
    pub low_shelf_gain_db: f32,
    /// Final output gain (dB)
    pub output_gain_db: f32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            noise_reduction: true,
            noise_stationary: true,
            noise_prop_decrease: 0.75,
            gate_threshold_db: -30.0,
            gate_ratio: 1.5,
            gate_release_ms: 250.0,
            comp_threshold_db: -16.0,
            comp_ratio: 2.5,
            low_shelf_cutoff_hz: 400.0,
            low_shelf_gain_db: 10.0,
            output_gain_db: 10.0,
        }
    }
}

impl EnhanceConfig {
    /// Validate parameter ranges before processing starts
    pub fn validate(&self) -> Result<(), crate::error::AudioError> {
        use crate::error::AudioError;

        let invalid = |name: &str, value: String| AudioError::InvalidParameter {
            name: name.to_string(),
            value,
        };

        if self.sample_rate == 0 {
            return Err(invalid("sample_rate", "0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.noise_prop_decrease) {
            return Err(invalid(
                "noise_prop_decrease",
                self.noise_prop_decrease.to_string(),
            ));
        }
        if self.gate_ratio < 1.0 {
            return Err(invalid("gate_ratio", self.gate_ratio.to_string()));
        }
        if self.gate_release_ms <= 0.0 {
            return Err(invalid("gate_release_ms", self.gate_release_ms.to_string()));
        }
        if self.comp_ratio < 1.0 {
            return Err(invalid("comp_ratio", self.comp_ratio.to_string()));
        }
        let nyquist = self.sample_rate as f32 / 2.0;
        if self.low_shelf_cutoff_hz <= 0.0 || self.low_shelf_cutoff_hz >= nyquist {
            return Err(invalid(
                "low_shelf_cutoff_hz",
                self.low_shelf_cutoff_hz.to_string(),
            ));
        }

        Ok(())
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Most recent turns kept in the prompt history
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { history_limit: 20 }
    }
}

/// Subtitle style defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleConfig {
    pub font_size: u32,
    pub color: String,
    pub stroke_width: u32,
    pub stroke_color: String,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            font_size: 24,
            color: "#FFFFFF".to_string(),
            stroke_width: 1,
            stroke_color: "#000000".to_string(),
        }
    }
}
