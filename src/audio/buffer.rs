//! Planar audio buffer used to assemble and process programs

use crate::error::{AudioError, Result};

/// Planar PCM audio: one `Vec<f32>` per channel, all the same length.
///
/// Samples are in the [-1.0, 1.0] range. The planar layout matches the
/// per-channel processing done by the enhancement chain and keeps
/// channel duplication for stereo programs a cheap clone.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create an empty buffer with the given channel count
    pub fn empty(channel_count: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![Vec::new(); channel_count.max(1)],
            sample_rate,
        }
    }

    /// Wrap a single channel of samples
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            channels: vec![samples],
            sample_rate,
        }
    }

    /// Duplicate a mono signal into both stereo channels
    pub fn stereo_from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            channels: vec![samples.clone(), samples],
            sample_rate,
        }
    }

    /// Wrap already-planar channels. Lengths must match.
    pub fn from_planar(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Ok(Self::empty(1, sample_rate));
        }
        let frames = channels[0].len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(AudioError::Decode(
                "channel lengths differ".to_string(),
            )
            .into());
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Silence of the given duration, shaped to a channel count
    pub fn silence(duration_secs: f32, channel_count: usize, sample_rate: u32) -> Self {
        let frames = (duration_secs * sample_rate as f32).round() as usize;
        Self {
            channels: vec![vec![0.0; frames]; channel_count.max(1)],
            sample_rate,
        }
    }

    /// Deinterleave WAV-style samples into planar channels
    pub fn from_interleaved(samples: &[f32], channel_count: usize, sample_rate: u32) -> Self {
        let channel_count = channel_count.max(1);
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (ch, &sample) in frame.iter().enumerate() {
                channels[ch].push(sample);
            }
        }
        Self {
            channels,
            sample_rate,
        }
    }

    /// Interleave the channels for WAV writing
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.num_frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for i in 0..frames {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }

    /// Append another buffer along the time axis
    pub fn append(&mut self, other: &AudioBuffer) -> Result<()> {
        if other.channels.len() != self.channels.len() {
            return Err(AudioError::ChannelMismatch {
                expected: self.channels.len(),
                got: other.channels.len(),
            }
            .into());
        }
        for (dst, src) in self.channels.iter_mut().zip(&other.channels) {
            dst.extend_from_slice(src);
        }
        Ok(())
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.channels.first().map_or(0, |c| c.len())
    }

    /// Check if the buffer holds no audio
    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    /// Duration of the buffer in seconds
    pub fn duration_secs(&self) -> f32 {
        self.num_frames() as f32 / self.sample_rate as f32
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Borrow the planar channel data
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Take ownership of the planar channel data
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Average all channels into one
    pub fn downmix_mono(&self) -> Vec<f32> {
        let frames = self.num_frames();
        let scale = 1.0 / self.channels.len() as f32;
        let mut out = vec![0.0; frames];
        for channel in &self.channels {
            for (acc, &sample) in out.iter_mut().zip(channel) {
                *acc += sample * scale;
            }
        }
        out
    }
}
