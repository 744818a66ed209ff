//! The audio enhancement chain

use std::path::Path;

use tracing::{debug, info};

use crate::audio::buffer::AudioBuffer;
use crate::audio::denoise::SpectralGate;
use crate::audio::effects::{apply_gain, Compressor, LowShelf, NoiseGate};
use crate::audio::io;
use crate::config::EnhanceConfig;
use crate::error::Result;

/// Run the enhancement chain over planar channels.
///
/// Stage order is fixed: noise reduction (optional), noise gate,
/// compressor, low-shelf EQ, output gain. Each channel is processed
/// with fresh stage state so channels never bleed into each other.
/// Identical input and parameters produce identical output.
pub fn enhance_buffer(
    channels: &[Vec<f32>],
    sample_rate: u32,
    params: &EnhanceConfig,
) -> Result<Vec<Vec<f32>>> {
    params.validate()?;

    let mut output = Vec::with_capacity(channels.len());
    for (index, channel) in channels.iter().enumerate() {
        debug!("Enhancing channel {} ({} samples)", index, channel.len());

        let mut samples = if params.noise_reduction {
            let gate = SpectralGate::new(
                params.noise_stationary,
                params.noise_prop_decrease,
                sample_rate,
            );
            gate.process(channel)?
        } else {
            channel.clone()
        };

        let mut gate = NoiseGate::new(
            params.gate_threshold_db,
            params.gate_ratio,
            params.gate_release_ms,
            sample_rate,
        );
        gate.process(&mut samples);

        let mut comp = Compressor::new(params.comp_threshold_db, params.comp_ratio, sample_rate);
        comp.process(&mut samples);

        let mut shelf = LowShelf::new(
            params.low_shelf_cutoff_hz,
            params.low_shelf_gain_db,
            sample_rate,
        )?;
        shelf.process(&mut samples);

        apply_gain(&mut samples, params.output_gain_db);

        output.push(samples);
    }

    Ok(output)
}

/// Enhance a WAV file into a new WAV file.
///
/// The input is decoded, resampled to the configured rate if needed,
/// run through the chain, and written as 32-bit float WAV. Processing
/// finishes fully in memory before the output file is created, so a
/// failed run leaves no partial file behind.
pub fn enhance_file(input: &Path, output: &Path, params: &EnhanceConfig) -> Result<()> {
    params.validate()?;
    info!("Enhancing {} -> {}", input.display(), output.display());

    let buffer = io::read_wav(input)?;
    let buffer = io::resample(&buffer, params.sample_rate)?;

    let processed = enhance_buffer(buffer.channels(), buffer.sample_rate(), params)?;
    let processed = AudioBuffer::from_planar(processed, params.sample_rate)?;

    io::write_wav(output, &processed)
}
