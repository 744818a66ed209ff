//! Voice chat loop: transcribe a prompt, ask a model, speak the reply

use tracing::{debug, info};

use crate::config::SynthesisConfig;
use crate::engine::types::{SynthesisRequest, SynthesizedAudio};
use crate::engine::{ChatModel, SpeechSynthesizer, Transcriber};
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One turn of conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// Rolling conversation history with a bounded turn count
#[derive(Debug, Clone)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
    limit: usize,
}

impl ChatSession {
    pub fn new(limit: usize) -> Self {
        Self {
            turns: Vec::new(),
            limit,
        }
    }

    /// Record one user/assistant exchange, dropping the oldest turns
    /// once the history exceeds the limit.
    pub fn push_exchange(&mut self, user: &str, assistant: &str) {
        self.turns.push(ChatTurn {
            role: Role::User,
            text: user.to_string(),
        });
        self.turns.push(ChatTurn {
            role: Role::Assistant,
            text: assistant.to_string(),
        });
        if self.turns.len() > self.limit {
            let excess = self.turns.len() - self.limit;
            self.turns.drain(..excess);
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Render the history and a new prompt as one completion prompt.
    fn render_prompt(&self, prompt: &str) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            let label = match turn.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            out.push_str(&format!("{}: {}\n", label, turn.text));
        }
        out.push_str(&format!("User: {}\nAssistant:", prompt));
        out
    }
}

/// The result of one playground round trip
#[derive(Debug, Clone)]
pub struct Exchange {
    pub reply: String,
    pub audio: SynthesizedAudio,
}

/// Conversational pipeline over injected chat, synthesis and
/// transcription engines.
///
/// History only advances on a successful exchange; a failed engine
/// call leaves the session untouched.
pub struct Playground<'a> {
    chat: &'a dyn ChatModel,
    synthesizer: &'a dyn SpeechSynthesizer,
    transcriber: &'a dyn Transcriber,
    session: ChatSession,
    model: String,
    voice: String,
    speed: f32,
    language: String,
}

impl<'a> Playground<'a> {
    pub fn new(
        chat: &'a dyn ChatModel,
        synthesizer: &'a dyn SpeechSynthesizer,
        transcriber: &'a dyn Transcriber,
        model: &str,
        synthesis: &SynthesisConfig,
        history_limit: usize,
    ) -> Self {
        Self {
            chat,
            synthesizer,
            transcriber,
            session: ChatSession::new(history_limit),
            model: model.to_string(),
            voice: synthesis.voice.clone(),
            speed: synthesis.speed,
            language: synthesis.language.clone(),
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Ask the model for a reply and synthesize it.
    pub fn respond_to_text(&mut self, prompt: &str) -> Result<Exchange> {
        let prompt = prompt.trim();
        let full_prompt = self.session.render_prompt(prompt);
        debug!(
            "Prompting {} with {} history turns",
            self.model,
            self.session.turns().len()
        );

        let reply = self.chat.generate(&self.model, &full_prompt)?;
        let reply = reply.trim().to_string();
        if reply.is_empty() {
            return Err(EngineError::InvalidResponse(
                "chat model returned an empty reply".to_string(),
            )
            .into());
        }

        let request = SynthesisRequest::new(reply.as_str(), self.voice.as_str())
            .with_speed(self.speed)
            .with_language(self.language.as_str());
        let audio = self.synthesizer.synthesize(&request)?;

        self.session.push_exchange(prompt, &reply);
        Ok(Exchange { reply, audio })
    }

    /// Transcribe spoken input, then respond to it as text.
    ///
    /// Returns what the transcriber heard alongside the exchange.
    pub fn respond_to_audio(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<(String, Exchange)> {
        let transcript = self.transcriber.transcribe(samples, sample_rate)?;
        let heard = transcript.text.trim().to_string();
        if heard.is_empty() {
            return Err(EngineError::InvalidResponse(
                "transcriber heard nothing".to_string(),
            )
            .into());
        }
        info!("Heard: {}", heard);

        let exchange = self.respond_to_text(&heard)?;
        Ok((heard, exchange))
    }
}
