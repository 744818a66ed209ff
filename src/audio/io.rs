//! WAV file reading/writing and offline sample-rate conversion

use std::path::Path;

use rubato::{FftFixedIn, Resampler};
use tracing::{debug, info};

use crate::audio::buffer::AudioBuffer;
use crate::error::{AudioError, Result};

/// Read a WAV file into a planar buffer.
///
/// Integer PCM is normalized to [-1.0, 1.0]; float PCM passes through.
/// The channel layout of the file is preserved.
pub fn read_wav(path: &Path) -> Result<AudioBuffer> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| AudioError::Decode(format!("{}: {}", path.display(), e)))?;

    let spec = reader.spec();
    debug!(
        "WAV format: {} channels, {} Hz, {} bits",
        spec.channels, spec.sample_rate, spec.bits_per_sample
    );

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().filter_map(|s| s.ok()).collect(),
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| s as f32 / max_val)
                .collect()
        }
    };

    Ok(AudioBuffer::from_interleaved(
        &samples,
        spec.channels as usize,
        spec.sample_rate,
    ))
}

/// Write a planar buffer to a 32-bit float WAV file.
///
/// A failed write removes the file so no partial output remains.
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let spec = hound::WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let result = write_wav_inner(path, buffer, spec);
    if result.is_err() {
        let _ = std::fs::remove_file(path);
    }
    result?;

    info!(
        "Wrote {} ({:.2}s, {} channels, {} Hz)",
        path.display(),
        buffer.duration_secs(),
        buffer.channel_count(),
        buffer.sample_rate()
    );
    Ok(())
}

fn write_wav_inner(path: &Path, buffer: &AudioBuffer, spec: hound::WavSpec) -> Result<()> {
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| AudioError::Encode(format!("{}: {}", path.display(), e)))?;

    for sample in buffer.interleaved() {
        writer
            .write_sample(sample)
            .map_err(|e| AudioError::Encode(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| AudioError::Encode(e.to_string()))?;
    Ok(())
}

/// Encode a mono signal as a 16-bit PCM WAV in memory
pub fn encode_wav_bytes(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| AudioError::Encode(e.to_string()))?;
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(value)
                .map_err(|e| AudioError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioError::Encode(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}

/// Decode WAV bytes (engine responses) into mono samples + rate.
///
/// Multi-channel payloads are averaged down to one channel.
pub fn decode_wav_bytes(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
    let cursor = std::io::Cursor::new(bytes);
    let mut reader =
        hound::WavReader::new(cursor).map_err(|e| AudioError::Decode(e.to_string()))?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().filter_map(|s| s.ok()).collect(),
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| s as f32 / max_val)
                .collect()
        }
    };

    let mono: Vec<f32> = if spec.channels > 1 {
        samples
            .chunks(spec.channels as usize)
            .map(|chunk| chunk.iter().sum::<f32>() / spec.channels as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec.sample_rate))
}

/// Resample every channel of a buffer to a new rate.
///
/// Offline conversion: the whole signal is available, so the resampler's
/// startup delay is skipped and the tail is flushed with zero padding,
/// yielding exactly `round(frames * to / from)` output frames.
pub fn resample(buffer: &AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if buffer.sample_rate() == target_rate || buffer.is_empty() {
        let mut out = buffer.clone();
        if out.is_empty() {
            out = AudioBuffer::empty(buffer.channel_count(), target_rate);
        }
        return Ok(out);
    }

    debug!(
        "Resampling: {} Hz -> {} Hz",
        buffer.sample_rate(),
        target_rate
    );

    let channel_count = buffer.channel_count();
    let input_frames = buffer.num_frames();
    let expected_frames = ((input_frames as u64 * target_rate as u64)
        as f64
        / buffer.sample_rate() as f64)
        .round() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        buffer.sample_rate() as usize,
        target_rate as usize,
        1024, // chunk size
        1,    // sub-chunks
        channel_count,
    )
    .map_err(|e| AudioError::Resampling(e.to_string()))?;

    let delay = resampler.output_delay();
    let mut output: Vec<Vec<f32>> = vec![Vec::new(); channel_count];
    let mut pos = 0;

    // Feed fixed-size chunks, zero-padding past the end of the input
    // until the delayed tail has been flushed.
    while output[0].len() < expected_frames + delay {
        let needed = resampler.input_frames_next();
        // Past the end of the input only zeros are fed
        let start = pos.min(input_frames);
        let take = needed.min(input_frames - start);

        let mut chunk = vec![vec![0.0f32; needed]; channel_count];
        for (dst, src) in chunk.iter_mut().zip(buffer.channels()) {
            dst[..take].copy_from_slice(&src[start..start + take]);
        }
        pos += needed;

        let resampled = resampler
            .process(&chunk, None)
            .map_err(|e| AudioError::Resampling(e.to_string()))?;
        for (dst, part) in output.iter_mut().zip(resampled) {
            dst.extend(part);
        }
    }

    for channel in output.iter_mut() {
        channel.drain(..delay.min(channel.len()));
        channel.truncate(expected_frames);
    }

    AudioBuffer::from_planar(output, target_rate)
}
