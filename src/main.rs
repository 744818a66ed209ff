//! Voice Studio CLI Application

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use voxstudio::audio::io::{read_wav, write_wav};
use voxstudio::{
    enhance_file, srt_document, vtt_document, Assembler, AssemblyMode, AudioBuffer, ChatModel,
    Config, HttpSynthesizer, HttpTranscriber, OllamaChat, Playground, SpeechSynthesizer,
    SubtitleStyle, Transcriber, VoiceSet,
};
use voxstudio::engine::SynthesisRequest;
use voxstudio::script::parse_script;

/// Script used by `podcast --example`
const EXAMPLE_SCRIPT: &str = "\
af_sarah: Hello and welcome to the podcast! We've got some exciting things lined up today.
am_michael: It's going to be an exciting episode. Stick with us!
af_sarah: But first, we've got a special guest with us. Please welcome Nicole!
af_nicole: Hey there... I'm so excited to be a guest today... But I thought I'd keep it quiet... for now...
am_michael: Well, it certainly adds some intrigue! Let's dive in and see what that's all about.
";

/// Supported subtitle document formats
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SubtitleFormat {
    Srt,
    Vtt,
}

impl SubtitleFormat {
    fn extension(self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
        }
    }
}

/// Voice Studio
#[derive(Parser)]
#[command(name = "voxstudio")]
#[command(about = "Turn scripts into podcasts, audiobooks, and enhanced audio", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize one line of text to a WAV file
    Speak {
        /// Text to speak
        text: String,

        /// Voice name
        #[arg(long)]
        voice: Option<String>,

        /// Language code (e.g. en-us)
        #[arg(short, long)]
        language: Option<String>,

        /// Speed multiplier
        #[arg(short, long)]
        speed: Option<f32>,

        /// Output WAV file path
        #[arg(short, long, default_value = "speech.wav")]
        output: PathBuf,
    },

    /// Assemble a multi-speaker podcast from a script file
    Podcast {
        /// Script file, one `speaker: text` entry per line
        script: Option<PathBuf>,

        /// Use the built-in example script
        #[arg(long)]
        example: bool,

        /// Speed multiplier
        #[arg(short, long)]
        speed: Option<f32>,

        /// Output WAV file path
        #[arg(short, long, default_value = "podcast.wav")]
        output: PathBuf,
    },

    /// Narrate a plain-text document as an audiobook
    Audiobook {
        /// Input text file; paragraphs are separated by blank lines
        input: PathBuf,

        /// Narrator voice
        #[arg(long)]
        voice: Option<String>,

        /// Language code
        #[arg(short, long)]
        language: Option<String>,

        /// Reading speed multiplier
        #[arg(short, long)]
        speed: Option<f32>,

        /// Output WAV file path
        #[arg(short, long, default_value = "audiobook.wav")]
        output: PathBuf,
    },

    /// Run the enhancement chain over a WAV file
    Enhance {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file path
        #[arg(short, long, default_value = "enhanced.wav")]
        output: PathBuf,

        /// Output sample rate in Hz
        #[arg(long)]
        sample_rate: Option<u32>,

        /// Disable spectral noise reduction
        #[arg(long)]
        no_noise_reduction: bool,

        /// Track a time-varying noise floor instead of a stationary one
        #[arg(long)]
        non_stationary: bool,

        /// Proportion of noise to remove (0.0 to 1.0)
        #[arg(long)]
        prop_decrease: Option<f32>,

        /// Noise gate threshold in dB
        #[arg(long)]
        gate_threshold: Option<f32>,

        /// Noise gate ratio
        #[arg(long)]
        gate_ratio: Option<f32>,

        /// Noise gate release in ms
        #[arg(long)]
        gate_release: Option<f32>,

        /// Compressor threshold in dB
        #[arg(long)]
        comp_threshold: Option<f32>,

        /// Compressor ratio
        #[arg(long)]
        comp_ratio: Option<f32>,

        /// Low-shelf cutoff in Hz
        #[arg(long)]
        low_shelf_cutoff: Option<f32>,

        /// Low-shelf gain in dB
        #[arg(long)]
        low_shelf_gain: Option<f32>,

        /// Output gain in dB
        #[arg(long)]
        output_gain: Option<f32>,
    },

    /// Transcribe a WAV file into subtitle cues
    Subtitle {
        /// Input WAV file
        input: PathBuf,

        /// Subtitle format
        #[arg(short, long, value_enum, default_value = "srt")]
        format: SubtitleFormat,

        /// Output file path (defaults to the input with a new extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Font size for the reported style
        #[arg(long)]
        font_size: Option<u32>,

        /// Text color, hex or rgba()
        #[arg(long)]
        color: Option<String>,

        /// Stroke width
        #[arg(long)]
        stroke_width: Option<u32>,

        /// Stroke color, hex or rgba()
        #[arg(long)]
        stroke_color: Option<String>,
    },

    /// Chat with a local model from the terminal
    Chat {
        /// Model name (defaults to the configured or first available)
        #[arg(short, long)]
        model: Option<String>,

        /// Voice for spoken replies
        #[arg(long)]
        voice: Option<String>,

        /// Directory for spoken reply WAVs; replies stay silent if unset
        #[arg(long)]
        audio_dir: Option<PathBuf>,
    },

    /// List voices offered by the speech engine
    Voices,

    /// List models offered by the chat engine
    Models,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging - info by default, use -v for more
    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    // Load configuration
    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Speak {
            text,
            voice,
            language,
            speed,
            output,
        } => {
            // Apply CLI overrides
            if let Some(voice) = voice {
                config.synthesis.voice = voice;
            }
            if let Some(language) = language {
                config.synthesis.language = language;
            }
            if let Some(speed) = speed {
                config.synthesis.speed = speed;
            }
            config.validate()?;
            speak(&config, &text, &output)
        }
        Commands::Podcast {
            script,
            example,
            speed,
            output,
        } => {
            if let Some(speed) = speed {
                config.synthesis.speed = speed;
            }
            config.validate()?;
            assemble_podcast(&config, script, example, &output)
        }
        Commands::Audiobook {
            input,
            voice,
            language,
            speed,
            output,
        } => {
            if let Some(voice) = voice {
                config.synthesis.voice = voice;
            }
            if let Some(language) = language {
                config.synthesis.language = language;
            }
            if let Some(speed) = speed {
                config.synthesis.speed = speed;
            }
            config.validate()?;
            assemble_audiobook(&config, &input, &output)
        }
        Commands::Enhance {
            input,
            output,
            sample_rate,
            no_noise_reduction,
            non_stationary,
            prop_decrease,
            gate_threshold,
            gate_ratio,
            gate_release,
            comp_threshold,
            comp_ratio,
            low_shelf_cutoff,
            low_shelf_gain,
            output_gain,
        } => {
            if let Some(rate) = sample_rate {
                config.enhance.sample_rate = rate;
            }
            if no_noise_reduction {
                config.enhance.noise_reduction = false;
            }
            if non_stationary {
                config.enhance.noise_stationary = false;
            }
            if let Some(value) = prop_decrease {
                config.enhance.noise_prop_decrease = value;
            }
            if let Some(value) = gate_threshold {
                config.enhance.gate_threshold_db = value;
            }
            if let Some(value) = gate_ratio {
                config.enhance.gate_ratio = value;
            }
            if let Some(value) = gate_release {
                config.enhance.gate_release_ms = value;
            }
            if let Some(value) = comp_threshold {
                config.enhance.comp_threshold_db = value;
            }
            if let Some(value) = comp_ratio {
                config.enhance.comp_ratio = value;
            }
            if let Some(value) = low_shelf_cutoff {
                config.enhance.low_shelf_cutoff_hz = value;
            }
            if let Some(value) = low_shelf_gain {
                config.enhance.low_shelf_gain_db = value;
            }
            if let Some(value) = output_gain {
                config.enhance.output_gain_db = value;
            }

            enhance_file(&input, &output, &config.enhance)?;
            println!("Enhanced audio written to {}", output.display());
            Ok(())
        }
        Commands::Subtitle {
            input,
            format,
            output,
            font_size,
            color,
            stroke_width,
            stroke_color,
        } => {
            if let Some(size) = font_size {
                config.subtitle.font_size = size;
            }
            if let Some(color) = color {
                config.subtitle.color = color;
            }
            if let Some(width) = stroke_width {
                config.subtitle.stroke_width = width;
            }
            if let Some(color) = stroke_color {
                config.subtitle.stroke_color = color;
            }
            generate_subtitles(&config, &input, format, output)
        }
        Commands::Chat {
            model,
            voice,
            audio_dir,
        } => {
            if let Some(voice) = voice {
                config.synthesis.voice = voice;
            }
            config.validate()?;
            run_chat(&config, model, audio_dir)
        }
        Commands::Voices => list_voices(&config),
        Commands::Models => list_models(&config),
    }
}

/// Build the speech client from config
fn speech_engine(config: &Config) -> Result<HttpSynthesizer> {
    HttpSynthesizer::new(
        &config.engines.speech_url,
        &config.engines.speech_model,
        config.engines.timeout_secs,
    )
    .context("Failed to create speech client")
}

/// Synthesize a single utterance to a WAV file
fn speak(config: &Config, text: &str, output: &Path) -> Result<()> {
    let engine = speech_engine(config)?;

    let request = SynthesisRequest::new(text, config.synthesis.voice.as_str())
        .with_speed(config.synthesis.speed)
        .with_language(config.synthesis.language.as_str());
    let audio = engine.synthesize(&request).context("Synthesis failed")?;

    let buffer = AudioBuffer::mono(audio.samples, audio.sample_rate);
    write_wav(output, &buffer)?;

    println!(
        "Wrote {:.2}s of speech to {}",
        buffer.duration_secs(),
        output.display()
    );
    Ok(())
}

/// Assemble a stereo podcast from a script file
fn assemble_podcast(
    config: &Config,
    script: Option<PathBuf>,
    example: bool,
    output: &Path,
) -> Result<()> {
    let content = if example {
        EXAMPLE_SCRIPT.to_string()
    } else {
        let path = script.ok_or_else(|| anyhow::anyhow!("Provide a script file or --example"))?;
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read script from {}", path.display()))?
    };

    let engine = speech_engine(config)?;
    let voices = VoiceSet::new(engine.voices().context("Failed to list voices")?);
    let lines = parse_script(&content, &voices)?;

    let mut assembler = Assembler::new(
        AssemblyMode::Dialogue,
        config.pacing.clone(),
        config.synthesis.speed,
        &config.synthesis.language,
    );
    let program = assembler.assemble(&engine, &voices, &lines)?;
    if program.is_empty() {
        anyhow::bail!("The script produced no audio");
    }
    write_wav(output, &program)?;

    println!(
        "Wrote {:.2}s stereo program to {}",
        program.duration_secs(),
        output.display()
    );
    Ok(())
}

/// Narrate a plain-text document with a single voice
fn assemble_audiobook(config: &Config, input: &Path, output: &Path) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read document from {}", input.display()))?;
    if text.trim().is_empty() {
        anyhow::bail!("The document is empty");
    }

    let engine = speech_engine(config)?;
    let voices = VoiceSet::new(engine.voices().context("Failed to list voices")?);

    let mut assembler = Assembler::new(
        AssemblyMode::Narration,
        config.pacing.clone(),
        config.synthesis.speed,
        &config.synthesis.language,
    );
    let program =
        assembler.assemble_document(&engine, &voices, &text, &config.synthesis.voice)?;
    write_wav(output, &program)?;

    println!(
        "Wrote {:.2}s narration to {}",
        program.duration_secs(),
        output.display()
    );
    Ok(())
}

/// Transcribe a WAV file and write an SRT or VTT document
fn generate_subtitles(
    config: &Config,
    input: &Path,
    format: SubtitleFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let style = SubtitleStyle::from_config(&config.subtitle)
        .canonical()
        .context("Invalid subtitle style")?;

    let buffer = read_wav(input)?;
    let samples = buffer.downmix_mono();
    info!("Transcribing {:.2}s of audio", buffer.duration_secs());

    let engine = HttpTranscriber::new(
        &config.engines.transcribe_url,
        &config.engines.transcribe_model,
        config.engines.timeout_secs,
    )
    .context("Failed to create transcription client")?;
    let transcript = engine
        .transcribe(&samples, buffer.sample_rate())
        .context("Transcription failed")?;

    if transcript.segments.is_empty() {
        anyhow::bail!("Transcription produced no segments");
    }

    let document = match format {
        SubtitleFormat::Vtt => vtt_document(&transcript.segments),
        SubtitleFormat::Srt => srt_document(&transcript.segments),
    };

    let path = output.unwrap_or_else(|| input.with_extension(format.extension()));
    std::fs::write(&path, document)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote {} cues to {}", transcript.segments.len(), path.display());
    println!(
        "Subtitle style: font {}px, color {}, stroke {}px {}",
        style.font_size, style.color, style.stroke_width, style.stroke_color
    );
    Ok(())
}

/// Terminal chat loop with optional spoken replies
fn run_chat(config: &Config, model: Option<String>, audio_dir: Option<PathBuf>) -> Result<()> {
    let chat_engine = OllamaChat::new(&config.engines.chat_url, config.engines.timeout_secs)
        .context("Failed to create chat client")?;

    let model = match model.or_else(|| config.engines.chat_model.clone()) {
        Some(model) => model,
        None => {
            let models = chat_engine
                .models()
                .context("Is the Ollama server running? Start it with 'ollama serve'")?;
            match models.into_iter().next() {
                Some(model) => model,
                None => anyhow::bail!("No models found - pull one with 'ollama pull <model>'"),
            }
        }
    };
    println!("Using model: {}", model);

    let synth_engine = speech_engine(config)?;
    let transcriber = HttpTranscriber::new(
        &config.engines.transcribe_url,
        &config.engines.transcribe_model,
        config.engines.timeout_secs,
    )
    .context("Failed to create transcription client")?;

    if let Some(ref dir) = audio_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let mut playground = Playground::new(
        &chat_engine,
        &synth_engine,
        &transcriber,
        &model,
        &config.synthesis,
        config.chat.history_limit,
    );

    println!("Say 'exit' to quit the conversation.");
    let stdin = std::io::stdin();
    let mut reply_index = 0u32;

    loop {
        print!("> ");
        let _ = std::io::Write::flush(&mut std::io::stdout());

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt.eq_ignore_ascii_case("exit") {
            println!("Exiting conversation.");
            break;
        }

        match playground.respond_to_text(prompt) {
            Ok(exchange) => {
                println!("{}", exchange.reply);
                if let Some(ref dir) = audio_dir {
                    reply_index += 1;
                    let path = dir.join(format!("reply_{:03}.wav", reply_index));
                    let buffer =
                        AudioBuffer::mono(exchange.audio.samples, exchange.audio.sample_rate);
                    write_wav(&path, &buffer)?;
                    println!("(spoken reply saved to {})", path.display());
                }
            }
            Err(e) => error!("Chat turn failed: {}", e),
        }
    }

    Ok(())
}

/// List voices offered by the speech engine
fn list_voices(config: &Config) -> Result<()> {
    let engine = speech_engine(config)?;
    let voices = engine.voices().context("Failed to list voices")?;

    if voices.is_empty() {
        println!("No voices available");
    } else {
        println!("Available voices:");
        for (i, name) in voices.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
    }

    Ok(())
}

/// List models offered by the chat engine
fn list_models(config: &Config) -> Result<()> {
    let engine = OllamaChat::new(&config.engines.chat_url, config.engines.timeout_secs)
        .context("Failed to create chat client")?;
    let models = engine
        .models()
        .context("Is the Ollama server running? Start it with 'ollama serve'")?;

    if models.is_empty() {
        println!("No models found - pull one with 'ollama pull <model>'");
    } else {
        println!("Available models:");
        for (i, name) in models.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
    }

    Ok(())
}
