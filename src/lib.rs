//! Voice Studio
//!
//! A Rust toolkit for turning scripts and documents into finished speech
//! audio: multi-speaker podcast assembly, audiobook narration, an audio
//! enhancement chain, subtitle generation, and a voice chat playground,
//! all driven by locally hosted speech and language model servers.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `script`: Script parsing, validation, and audio assembly
//! - `audio`: Buffers, WAV I/O, resampling, and the enhancement chain
//! - `engine`: Capability traits for synthesis, transcription, and chat,
//!   plus HTTP clients for local servers
//! - `subtitle`: SRT/WebVTT documents and subtitle styling
//! - `playground`: Conversational transcribe-chat-speak loop
//! - `config`: Configuration structures
//! - `error`: Error types
//!
//! # Example
//!
//! ```no_run
//! use voxstudio::{
//!     Assembler, AssemblyMode, Config, HttpSynthesizer, ScriptLine, SpeechSynthesizer, VoiceSet,
//! };
//!
//! let config = Config::default();
//!
//! let engine = HttpSynthesizer::new(
//!     &config.engines.speech_url,
//!     &config.engines.speech_model,
//!     config.engines.timeout_secs,
//! ).unwrap();
//!
//! let voices = VoiceSet::new(engine.voices().unwrap());
//! let lines = vec![
//!     ScriptLine::new("af_sky", "Welcome back to the show."),
//!     ScriptLine::new("am_adam", "Glad to be here."),
//! ];
//!
//! let mut assembler = Assembler::new(
//!     AssemblyMode::Dialogue,
//!     config.pacing.clone(),
//!     config.synthesis.speed,
//!     &config.synthesis.language,
//! );
//! let program = assembler.assemble(&engine, &voices, &lines).unwrap();
//! ```

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod playground;
pub mod script;
pub mod subtitle;

// Re-exports for convenience
pub use audio::{enhance_buffer, enhance_file, AudioBuffer};
pub use config::{Config, EnhanceConfig, PacingConfig, SynthesisConfig};
pub use engine::{
    ChatModel, HttpSynthesizer, HttpTranscriber, OllamaChat, SpeechSynthesizer, Transcriber,
};
pub use error::{AudioError, ColorError, EngineError, Result, ScriptError, StudioError};
pub use playground::{ChatSession, Exchange, Playground};
pub use script::{parse_script, split_paragraphs, Assembler, AssemblyMode, ScriptLine, VoiceSet};
pub use subtitle::{srt_document, validate_color, vtt_document, ColorValue, SubtitleStyle};
