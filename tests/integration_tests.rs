//! Integration tests for voxstudio

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::StdRng;
use rand::SeedableRng;

use voxstudio::audio::io::{read_wav, write_wav};
use voxstudio::engine::{SynthesisRequest, SynthesizedAudio, Transcript, TranscriptSegment};
use voxstudio::{
    enhance_buffer, enhance_file, parse_script, split_paragraphs, srt_document, validate_color,
    vtt_document, Assembler, AssemblyMode, AudioBuffer, ChatModel, ColorValue, Config, EngineError,
    Playground, ScriptError, ScriptLine, SpeechSynthesizer, StudioError, Transcriber, VoiceSet,
};

/// Generate synthetic audio that simulates speech
fn generate_speech(sample_rate: u32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            // Mix of frequencies to simulate speech formants
            let f1 = 300.0;
            let f2 = 1000.0;
            let f3 = 2500.0;

            amplitude
                * (0.5 * (2.0 * std::f32::consts::PI * f1 * t).sin()
                    + 0.3 * (2.0 * std::f32::consts::PI * f2 * t).sin()
                    + 0.2 * (2.0 * std::f32::consts::PI * f3 * t).sin())
        })
        .collect()
}

/// Deterministic stand-in for a speech engine
struct SineSynth {
    sample_rate: u32,
    segment_secs: f32,
    calls: AtomicUsize,
}

impl SineSynth {
    fn new(sample_rate: u32, segment_secs: f32) -> Self {
        Self {
            sample_rate,
            segment_secs,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SpeechSynthesizer for SineSynth {
    fn voices(&self) -> Result<Vec<String>, EngineError> {
        Ok(vec![
            "af_sarah".to_string(),
            "am_michael".to_string(),
            "af_nicole".to_string(),
        ])
    }

    fn synthesize(&self, _request: &SynthesisRequest) -> Result<SynthesizedAudio, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let num_samples = (self.sample_rate as f32 * self.segment_secs) as usize;
        let samples = (0..num_samples)
            .map(|i| {
                let t = i as f32 / self.sample_rate as f32;
                0.3 * (2.0 * std::f32::consts::PI * 220.0 * t).sin()
            })
            .collect();

        Ok(SynthesizedAudio {
            samples,
            sample_rate: self.sample_rate,
        })
    }
}

struct CannedChat {
    reply: String,
}

impl ChatModel for CannedChat {
    fn models(&self) -> Result<Vec<String>, EngineError> {
        Ok(vec!["test-model".to_string()])
    }

    fn generate(&self, _model: &str, _prompt: &str) -> Result<String, EngineError> {
        Ok(self.reply.clone())
    }
}

struct NullTranscriber;

impl Transcriber for NullTranscriber {
    fn transcribe(&self, _samples: &[f32], _sample_rate: u32) -> Result<Transcript, EngineError> {
        Ok(Transcript::default())
    }
}

fn seeded_assembler(config: &Config, mode: AssemblyMode) -> Assembler {
    Assembler::with_rng(
        mode,
        config.pacing.clone(),
        config.synthesis.speed,
        &config.synthesis.language,
        StdRng::seed_from_u64(42),
    )
}

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.synthesis.voice, "af_sky");
    assert_eq!(config.synthesis.speed, 1.0);
    assert_eq!(config.synthesis.language, "en-us");
    assert_eq!(config.pacing.dialogue_pause_min_secs, 0.5);
    assert_eq!(config.pacing.dialogue_pause_max_secs, 1.0);
    assert_eq!(config.pacing.narration_pause_secs, 0.5);
    assert_eq!(config.enhance.sample_rate, 44100);
    assert!(config.enhance.noise_reduction);
    assert_eq!(config.enhance.noise_prop_decrease, 0.75);
    assert_eq!(config.chat.history_limit, 20);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
        [synthesis]
        voice = "am_adam"
        speed = 1.2

        [pacing]
        narration_pause_secs = 0.25

        [enhance]
        noise_reduction = false
        sample_rate = 22050

        [engines]
        chat_url = "http://ollama.local:11434"
    "#;

    let config: Config = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.synthesis.voice, "am_adam");
    assert_eq!(config.synthesis.speed, 1.2);
    assert_eq!(config.pacing.narration_pause_secs, 0.25);
    assert!(!config.enhance.noise_reduction);
    assert_eq!(config.enhance.sample_rate, 22050);
    assert_eq!(config.engines.chat_url, "http://ollama.local:11434");
    // Untouched sections keep their defaults
    assert_eq!(config.engines.speech_url, "http://localhost:8880");
    assert_eq!(config.subtitle.font_size, 24);
}

#[test]
fn test_podcast_assembly_duration() {
    let config = Config::default();
    let synth = SineSynth::new(24_000, 0.2);
    let voices = VoiceSet::new(synth.voices().unwrap());

    let lines = vec![
        ScriptLine::new("af_sarah", "Welcome to the show."),
        ScriptLine::new("am_michael", "Great to be here."),
        ScriptLine::new("af_sarah", "Let's get started."),
    ];

    let mut assembler = seeded_assembler(&config, AssemblyMode::Dialogue);
    let program = assembler.assemble(&synth, &voices, &lines).unwrap();

    assert_eq!(synth.call_count(), 3);
    assert_eq!(program.channel_count(), 2);
    assert_eq!(program.sample_rate(), 24_000);
    assert_eq!(program.channels()[0], program.channels()[1]);

    // Three 0.2 s segments plus three pauses of 0.5 to 1.0 s each
    let frames = program.num_frames();
    assert!(
        frames >= 3 * 4_800 + 3 * 12_000,
        "program too short: {} frames",
        frames
    );
    assert!(
        frames <= 3 * 4_800 + 3 * 24_000,
        "program too long: {} frames",
        frames
    );
}

#[test]
fn test_audiobook_document_flow() {
    let config = Config::default();
    let synth = SineSynth::new(24_000, 0.2);
    let voices = VoiceSet::new(synth.voices().unwrap());

    let document = "First paragraph.\n\nSecond paragraph.\n\n\nThird paragraph.";
    let mut assembler = seeded_assembler(&config, AssemblyMode::Narration);
    let program = assembler
        .assemble_document(&synth, &voices, document, "af_sarah")
        .unwrap();

    assert_eq!(synth.call_count(), 3);
    assert_eq!(program.channel_count(), 1);
    // Each paragraph is 0.2 s of speech plus a fixed 0.5 s pause
    assert_eq!(program.num_frames(), 3 * (4_800 + 12_000));
}

#[test]
fn test_invalid_speaker_aborts_whole_script() {
    let config = Config::default();
    let synth = SineSynth::new(24_000, 0.2);
    let voices = VoiceSet::new(synth.voices().unwrap());

    let lines = vec![
        ScriptLine::new("af_sarah", "This line is fine."),
        ScriptLine::new("zz_nobody", "This speaker does not exist."),
    ];

    let mut assembler = seeded_assembler(&config, AssemblyMode::Dialogue);
    let err = assembler.assemble(&synth, &voices, &lines).unwrap_err();

    match err {
        StudioError::Script(ScriptError::UnknownSpeaker { line, speaker }) => {
            assert_eq!(line, 2);
            assert_eq!(speaker, "zz_nobody");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(synth.call_count(), 0, "no audio for an invalid script");
}

#[test]
fn test_empty_script_is_not_an_error() {
    let config = Config::default();
    let synth = SineSynth::new(24_000, 0.2);
    let voices = VoiceSet::new(synth.voices().unwrap());

    let mut assembler = seeded_assembler(&config, AssemblyMode::Dialogue);
    let program = assembler.assemble(&synth, &voices, &[]).unwrap();

    assert!(program.is_empty());
    assert_eq!(program.channel_count(), 2);
    assert_eq!(program.sample_rate(), config.pacing.fallback_sample_rate);
    assert_eq!(synth.call_count(), 0);
}

#[test]
fn test_parse_script_line_numbers_count_blanks() {
    let voices = VoiceSet::new(["af_sarah", "am_michael"]);

    let content = "af_sarah: Hello.\n\nthis line has no separator\n";
    let err = parse_script(content, &voices).unwrap_err();
    assert!(matches!(err, ScriptError::MissingSeparator { line: 3 }));

    let content = "AF_SARAH: Upper-case speakers are folded.\nam_michael: Yes.";
    let lines = parse_script(content, &voices).unwrap();
    assert_eq!(lines[0].speaker, "af_sarah");
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_split_paragraphs_property() {
    assert_eq!(split_paragraphs("A\n\nB\n\n\nC"), vec!["A", "B", "C"]);
    assert!(split_paragraphs("\n\n \n\n").is_empty());
}

#[test]
fn test_color_validation_vectors() {
    let cases: Vec<(ColorValue, &str)> = vec![
        (ColorValue::from((255, 0, 0, 255)), "#ff0000"),
        (ColorValue::from("rgba(0, 128, 255, 1)"), "#0080ff"),
        (ColorValue::from("#ABC"), "#ABC"),
        (ColorValue::from("#ffffff"), "#ffffff"),
        (ColorValue::from(vec![300.0, -4.0, 127.6, 0.5]), "#ff0080"),
    ];

    for (input, expected) in cases {
        assert_eq!(validate_color(&input).unwrap(), expected);
    }

    assert!(validate_color(&ColorValue::from(vec![1.0, 2.0, 3.0])).is_err());
    assert!(validate_color(&ColorValue::from("rgb(1,2,3)")).is_err());
}

#[test]
fn test_enhancement_is_deterministic() {
    let sample_rate = 16_000;
    let channels = vec![generate_speech(sample_rate, 0.6, 0.3)];
    let params = Config::default().enhance;

    let first = enhance_buffer(&channels, sample_rate, &params).unwrap();
    let second = enhance_buffer(&channels, sample_rate, &params).unwrap();

    assert_eq!(first, second, "identical input must give identical output");
}

#[test]
fn test_disabled_noise_reduction_equals_rest_of_chain() {
    use voxstudio::audio::effects::apply_gain;
    use voxstudio::audio::{Compressor, LowShelf, NoiseGate};

    let sample_rate = 16_000;
    let input = generate_speech(sample_rate, 0.5, 0.2);

    let mut params = Config::default().enhance;
    params.noise_reduction = false;
    let chained = enhance_buffer(&[input.clone()], sample_rate, &params).unwrap();

    let mut manual = input;
    let mut gate = NoiseGate::new(
        params.gate_threshold_db,
        params.gate_ratio,
        params.gate_release_ms,
        sample_rate,
    );
    gate.process(&mut manual);
    let mut comp = Compressor::new(params.comp_threshold_db, params.comp_ratio, sample_rate);
    comp.process(&mut manual);
    let mut shelf = LowShelf::new(
        params.low_shelf_cutoff_hz,
        params.low_shelf_gain_db,
        sample_rate,
    )
    .unwrap();
    shelf.process(&mut manual);
    apply_gain(&mut manual, params.output_gain_db);

    assert_eq!(chained[0], manual);
}

#[test]
fn test_enhance_file_resamples_to_configured_rate() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.wav");
    let output_path = dir.path().join("enhanced.wav");

    let buffer = AudioBuffer::mono(generate_speech(16_000, 0.6, 0.3), 16_000);
    write_wav(&input_path, &buffer).unwrap();

    let params = Config::default().enhance;
    enhance_file(&input_path, &output_path, &params).unwrap();

    let enhanced = read_wav(&output_path).unwrap();
    assert_eq!(enhanced.sample_rate(), 44_100);
    assert_eq!(enhanced.channel_count(), 1);
    // 9600 frames at 16 kHz resample to exactly 26460 at 44.1 kHz
    assert_eq!(enhanced.num_frames(), 26_460);
}

#[test]
fn test_enhance_file_leaves_no_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("garbage.wav");
    let output_path = dir.path().join("enhanced.wav");

    std::fs::write(&input_path, b"this is not audio data").unwrap();

    let params = Config::default().enhance;
    let result = enhance_file(&input_path, &output_path, &params);

    assert!(result.is_err());
    assert!(
        !output_path.exists(),
        "failed run must not leave an output file"
    );
}

#[test]
fn test_wav_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");

    let mut original = AudioBuffer::stereo_from_mono(generate_speech(22_050, 0.3, 0.4), 22_050);
    write_wav(&path, &original).unwrap();
    let restored = read_wav(&path).unwrap();

    // 32-bit float storage keeps samples bit-exact
    assert_eq!(restored, original);

    original = AudioBuffer::mono(vec![0.0; 100], 8_000);
    write_wav(&path, &original).unwrap();
    assert_eq!(read_wav(&path).unwrap(), original);
}

#[test]
fn test_subtitle_documents_from_segments() {
    let segments = vec![
        TranscriptSegment {
            text: " Hello world. ".to_string(),
            start_ms: 0,
            end_ms: 1_480,
        },
        TranscriptSegment {
            text: "Second line.".to_string(),
            start_ms: 1_480,
            end_ms: 3_200,
        },
    ];

    let srt = srt_document(&segments);
    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:01,480\nHello world.\n\n"));
    assert!(srt.contains("2\n00:00:01,480 --> 00:00:03,200\nSecond line.\n\n"));

    let vtt = vtt_document(&segments);
    assert!(vtt.starts_with("WEBVTT\n\n00:00:00.000 --> 00:00:01.480\nHello world.\n\n"));
}

#[test]
fn test_playground_round_trip_with_local_engines() {
    let config = Config::default();
    let chat = CannedChat {
        reply: "Happy to help.".to_string(),
    };
    let synth = SineSynth::new(24_000, 0.2);
    let transcriber = NullTranscriber;

    let mut playground = Playground::new(
        &chat,
        &synth,
        &transcriber,
        "test-model",
        &config.synthesis,
        config.chat.history_limit,
    );

    let exchange = playground.respond_to_text("Can you help me?").unwrap();
    assert_eq!(exchange.reply, "Happy to help.");
    assert_eq!(exchange.audio.sample_rate, 24_000);
    assert!(!exchange.audio.samples.is_empty());
    assert_eq!(playground.session().turns().len(), 2);

    // A silent transcription must not reach the chat model
    let err = playground.respond_to_audio(&[0.0; 1_000], 16_000).unwrap_err();
    assert!(matches!(
        err,
        StudioError::Engine(EngineError::InvalidResponse(_))
    ));
    assert_eq!(playground.session().turns().len(), 2);
}

/// Helper function to calculate RMS
#[allow(dead_code)]
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}
