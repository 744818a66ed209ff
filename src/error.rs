//! Custom error types for the voxstudio system

use thiserror::Error;

/// Main error type for the voxstudio system
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Color error: {0}")]
    Color(#[from] ColorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Script validation errors. Line numbers are 1-based and count
/// skipped rows, so they match what the author sees in their editor.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("line {line}: missing ':' separator between speaker and text")]
    MissingSeparator { line: usize },

    #[error("line {line}: unknown speaker '{speaker}'")]
    UnknownSpeaker { line: usize, speaker: String },

    #[error("line {line}: empty text")]
    EmptyText { line: usize },
}

/// Audio processing errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("Failed to encode audio: {0}")]
    Encode(String),

    #[error("Resampling error: {0}")]
    Resampling(String),

    #[error("Filter error: {0}")]
    Filter(String),

    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: String },

    #[error("Channel count mismatch: expected {expected}, got {got}")]
    ChannelMismatch { expected: usize, got: usize },
}

/// Errors from the synthesis, transcription and chat engines
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to reach engine: {0}")]
    Connection(String),

    #[error("Engine request failed: {0}")]
    Request(String),

    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
}

/// Subtitle color format errors
#[derive(Error, Debug)]
pub enum ColorError {
    #[error("Expected 4 color components (r, g, b, a), got {got}")]
    ComponentCount { got: usize },

    #[error("Non-numeric color component: '{0}'")]
    NonNumeric(String),

    #[error("Unrecognized color format: '{0}'")]
    Unrecognized(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, StudioError>;
