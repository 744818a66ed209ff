//! Turns validated script lines into one concatenated audio buffer

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::{parser::split_paragraphs, ScriptLine, VoiceSet};
use crate::audio::AudioBuffer;
use crate::config::PacingConfig;
use crate::engine::types::SynthesisRequest;
use crate::engine::SpeechSynthesizer;
use crate::error::{Result, ScriptError};

/// Channel layout and pacing rule for one assembly run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyMode {
    /// Stereo output with a randomized pause after each line
    Dialogue,
    /// Mono output with a fixed pause after each paragraph
    Narration,
}

impl AssemblyMode {
    fn channel_count(self) -> usize {
        match self {
            AssemblyMode::Dialogue => 2,
            AssemblyMode::Narration => 1,
        }
    }
}

/// Drives a speech engine over a script and concatenates the results.
///
/// Pacing values are taken as configured; [`crate::config::Config::validate`]
/// is expected to have run before an assembler is built from them.
pub struct Assembler {
    mode: AssemblyMode,
    pacing: PacingConfig,
    speed: f32,
    language: String,
    rng: StdRng,
}

impl Assembler {
    pub fn new(mode: AssemblyMode, pacing: PacingConfig, speed: f32, language: &str) -> Self {
        Self::with_rng(mode, pacing, speed, language, StdRng::from_os_rng())
    }

    /// Like [`Assembler::new`] but with a caller-supplied randomness
    /// source, so pause durations can be reproduced.
    pub fn with_rng(
        mode: AssemblyMode,
        pacing: PacingConfig,
        speed: f32,
        language: &str,
        rng: StdRng,
    ) -> Self {
        Self {
            mode,
            pacing,
            speed,
            language: language.to_string(),
            rng,
        }
    }

    /// Synthesize every line and join the segments with pauses.
    ///
    /// The whole script is validated before the engine is called, so a
    /// script with any invalid line produces no audio at all. Rows that
    /// are blank in both fields are skipped; they still count toward
    /// the 1-based line numbers in errors. An empty script yields an
    /// empty buffer at the configured fallback sample rate.
    pub fn assemble(
        &mut self,
        engine: &dyn SpeechSynthesizer,
        voices: &VoiceSet,
        lines: &[ScriptLine],
    ) -> Result<AudioBuffer> {
        let channel_count = self.mode.channel_count();

        let mut plan: Vec<(&str, &str)> = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            let line_no = index + 1;
            let speaker = line.speaker.trim();
            let text = line.text.trim();

            if speaker.is_empty() && text.is_empty() {
                debug!("Skipping blank row {}", line_no);
                continue;
            }
            if !voices.contains(speaker) {
                return Err(ScriptError::UnknownSpeaker {
                    line: line_no,
                    speaker: speaker.to_string(),
                }
                .into());
            }
            if text.is_empty() {
                return Err(ScriptError::EmptyText { line: line_no }.into());
            }
            plan.push((speaker, text));
        }

        let mut output: Option<AudioBuffer> = None;
        for (speaker, text) in plan {
            let request = SynthesisRequest::new(text, speaker)
                .with_speed(self.speed)
                .with_language(self.language.as_str());
            let audio = engine.synthesize(&request)?;
            let sample_rate = audio.sample_rate;

            // The first segment fixes the output rate; later segments
            // are trusted to match it.
            let segment = match self.mode {
                AssemblyMode::Dialogue => AudioBuffer::stereo_from_mono(audio.samples, sample_rate),
                AssemblyMode::Narration => AudioBuffer::mono(audio.samples, sample_rate),
            };
            let pause = AudioBuffer::silence(self.pause_secs(), channel_count, sample_rate);

            let buffer = output
                .get_or_insert_with(|| AudioBuffer::empty(channel_count, sample_rate));
            buffer.append(&segment)?;
            buffer.append(&pause)?;
        }

        let buffer = output.unwrap_or_else(|| {
            AudioBuffer::empty(channel_count, self.pacing.fallback_sample_rate)
        });
        info!(
            "Assembled {:.2}s of audio from {} lines",
            buffer.duration_secs(),
            lines.len()
        );
        Ok(buffer)
    }

    /// Assemble a plain document read by a single narrator.
    ///
    /// The document is split into paragraphs on blank-line boundaries;
    /// each paragraph becomes one line spoken by `narrator`.
    pub fn assemble_document(
        &mut self,
        engine: &dyn SpeechSynthesizer,
        voices: &VoiceSet,
        text: &str,
        narrator: &str,
    ) -> Result<AudioBuffer> {
        let lines: Vec<ScriptLine> = split_paragraphs(text)
            .into_iter()
            .map(|paragraph| ScriptLine::new(narrator, paragraph))
            .collect();
        self.assemble(engine, voices, &lines)
    }

    fn pause_secs(&mut self) -> f32 {
        match self.mode {
            AssemblyMode::Dialogue => self.rng.random_range(
                self.pacing.dialogue_pause_min_secs..=self.pacing.dialogue_pause_max_secs,
            ),
            AssemblyMode::Narration => self.pacing.narration_pause_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::SynthesizedAudio;
    use crate::engine::MockSpeechSynthesizer;
    use crate::error::StudioError;

    fn pacing() -> PacingConfig {
        PacingConfig {
            dialogue_pause_min_secs: 0.5,
            dialogue_pause_max_secs: 1.0,
            narration_pause_secs: 0.5,
            fallback_sample_rate: 24_000,
        }
    }

    fn seeded(mode: AssemblyMode) -> Assembler {
        Assembler::with_rng(mode, pacing(), 1.0, "en-us", StdRng::seed_from_u64(7))
    }

    fn voices() -> VoiceSet {
        VoiceSet::new(["alice", "bob"])
    }

    fn tone(samples: usize, sample_rate: u32) -> SynthesizedAudio {
        SynthesizedAudio {
            samples: vec![0.25; samples],
            sample_rate,
        }
    }

    #[test]
    fn test_narration_pause_is_fixed() {
        let mut engine = MockSpeechSynthesizer::new();
        engine
            .expect_synthesize()
            .times(1)
            .returning(|_| Ok(tone(800, 8_000)));

        let mut assembler = seeded(AssemblyMode::Narration);
        let lines = [ScriptLine::new("alice", "One paragraph.")];
        let buffer = assembler.assemble(&engine, &voices(), &lines).unwrap();

        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.sample_rate(), 8_000);
        // 800 synthesized frames plus a 0.5 s pause
        assert_eq!(buffer.num_frames(), 800 + 4_000);
    }

    #[test]
    fn test_dialogue_is_stereo_with_bounded_pauses() {
        let mut engine = MockSpeechSynthesizer::new();
        engine
            .expect_synthesize()
            .times(2)
            .returning(|_| Ok(tone(1_000, 10_000)));

        let mut assembler = seeded(AssemblyMode::Dialogue);
        let lines = [
            ScriptLine::new("alice", "Hello."),
            ScriptLine::new("bob", "Hi."),
        ];
        let buffer = assembler.assemble(&engine, &voices(), &lines).unwrap();

        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.channels()[0], buffer.channels()[1]);

        // Two 0.1 s segments plus two pauses of 0.5 to 1.0 s each
        let frames = buffer.num_frames();
        assert!(frames >= 2_000 + 2 * 5_000, "too short: {frames}");
        assert!(frames <= 2_000 + 2 * 10_000, "too long: {frames}");
    }

    #[test]
    fn test_seeded_assembly_is_reproducible() {
        let lines = [
            ScriptLine::new("alice", "Hello."),
            ScriptLine::new("bob", "Hi."),
        ];

        let run = || {
            let mut engine = MockSpeechSynthesizer::new();
            engine
                .expect_synthesize()
                .returning(|_| Ok(tone(1_000, 10_000)));
            seeded(AssemblyMode::Dialogue)
                .assemble(&engine, &voices(), &lines)
                .unwrap()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_request_carries_speed_and_language() {
        let mut engine = MockSpeechSynthesizer::new();
        engine
            .expect_synthesize()
            .times(1)
            .withf(|request| {
                request.voice == "alice"
                    && request.text == "Hello."
                    && (request.speed - 1.3).abs() < f32::EPSILON
                    && request.language == "en-gb"
            })
            .returning(|_| Ok(tone(100, 8_000)));

        let mut assembler = Assembler::with_rng(
            AssemblyMode::Narration,
            pacing(),
            1.3,
            "en-gb",
            StdRng::seed_from_u64(1),
        );
        let lines = [ScriptLine::new("alice", "Hello.")];
        assembler.assemble(&engine, &voices(), &lines).unwrap();
    }

    #[test]
    fn test_invalid_speaker_synthesizes_nothing() {
        let mut engine = MockSpeechSynthesizer::new();
        engine.expect_synthesize().times(0);

        let mut assembler = seeded(AssemblyMode::Dialogue);
        let lines = [
            ScriptLine::new("alice", "Fine."),
            ScriptLine::new("carol", "Who am I?"),
        ];
        let err = assembler.assemble(&engine, &voices(), &lines).unwrap_err();

        match err {
            StudioError::Script(ScriptError::UnknownSpeaker { line, speaker }) => {
                assert_eq!(line, 2);
                assert_eq!(speaker, "carol");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_rows_skipped_but_counted() {
        let mut engine = MockSpeechSynthesizer::new();
        engine.expect_synthesize().times(0);

        let mut assembler = seeded(AssemblyMode::Dialogue);
        let lines = [
            ScriptLine::new("alice", "First."),
            ScriptLine::new("", ""),
            ScriptLine::new("alice", "   "),
        ];
        let err = assembler.assemble(&engine, &voices(), &lines).unwrap_err();

        assert!(matches!(
            err,
            StudioError::Script(ScriptError::EmptyText { line: 3 })
        ));
    }

    #[test]
    fn test_blank_rows_produce_no_segments() {
        let mut engine = MockSpeechSynthesizer::new();
        engine
            .expect_synthesize()
            .times(1)
            .returning(|_| Ok(tone(400, 8_000)));

        let mut assembler = seeded(AssemblyMode::Narration);
        let lines = [
            ScriptLine::new("", ""),
            ScriptLine::new("alice", "Only me."),
            ScriptLine::new("", "  "),
        ];
        let buffer = assembler.assemble(&engine, &voices(), &lines).unwrap();
        assert_eq!(buffer.num_frames(), 400 + 4_000);
    }

    #[test]
    fn test_empty_script_yields_empty_buffer() {
        let mut engine = MockSpeechSynthesizer::new();
        engine.expect_synthesize().times(0);

        let mut assembler = seeded(AssemblyMode::Dialogue);
        let buffer = assembler.assemble(&engine, &voices(), &[]).unwrap();

        assert!(buffer.is_empty());
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.sample_rate(), 24_000);
    }

    #[test]
    fn test_document_assembly_uses_narrator() {
        let mut engine = MockSpeechSynthesizer::new();
        engine
            .expect_synthesize()
            .times(2)
            .withf(|request| request.voice == "af_sky")
            .returning(|_| Ok(tone(500, 8_000)));

        let mut assembler = seeded(AssemblyMode::Narration);
        let voices = VoiceSet::new(["af_sky"]);
        let buffer = assembler
            .assemble_document(&engine, &voices, "One.\n\nTwo.", "af_sky")
            .unwrap();

        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.num_frames(), 2 * (500 + 4_000));
    }
}
