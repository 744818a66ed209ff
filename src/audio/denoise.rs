//! Spectral-gating noise reduction

use std::sync::Arc;

use realfft::num_complex::Complex32;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use tracing::debug;

use crate::error::{AudioError, Result};

const FFT_SIZE: usize = 1024;
const HOP_SIZE: usize = 256;
/// Sigma multiplier for the per-bin noise threshold
const NOISE_SIGMA: f32 = 1.5;
/// Time constant of the adaptive noise tracker (seconds)
const TRACKER_TIME_SECS: f32 = 2.0;
/// Frequency span the gating mask is smoothed over (Hz)
const MASK_SMOOTH_HZ: f32 = 500.0;
/// Time span the gating mask is smoothed over (ms)
const MASK_SMOOTH_MS: f32 = 50.0;
const MAG_EPS: f32 = 1e-10;

/// Noise reduction by per-bin spectral gating.
///
/// The signal is analyzed with a Hann STFT. Each frequency bin gets a
/// noise threshold in dB; bins below it are attenuated. `stationary`
/// estimates one threshold per bin from the whole signal, otherwise an
/// exponentially weighted tracker follows a drifting noise floor.
/// `prop_decrease` scales how much of the attenuation is applied:
/// 0.0 leaves the signal untouched, 1.0 gates fully.
pub struct SpectralGate {
    stationary: bool,
    prop_decrease: f32,
    sample_rate: u32,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
    window: Vec<f32>,
}

impl SpectralGate {
    pub fn new(stationary: bool, prop_decrease: f32, sample_rate: u32) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(FFT_SIZE);
        let inverse = planner.plan_fft_inverse(FFT_SIZE);

        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32;
                0.5 * (1.0 - phase.cos())
            })
            .collect();

        Self {
            stationary,
            prop_decrease: prop_decrease.clamp(0.0, 1.0),
            sample_rate,
            forward,
            inverse,
            window,
        }
    }

    /// Reduce noise in one channel. Output length equals input length.
    pub fn process(&self, samples: &[f32]) -> Result<Vec<f32>> {
        if samples.is_empty() || self.prop_decrease == 0.0 {
            return Ok(samples.to_vec());
        }

        let spectra = self.analyze(samples)?;
        debug!(
            "Spectral gate: {} frames, stationary={}, prop_decrease={}",
            spectra.len(),
            self.stationary,
            self.prop_decrease
        );

        let gains = self.compute_gains(&spectra);
        self.synthesize(spectra, &gains, samples.len())
    }

    /// Hann-windowed STFT over the zero-padded signal
    fn analyze(&self, samples: &[f32]) -> Result<Vec<Vec<Complex32>>> {
        let mut padded = samples.to_vec();
        padded.resize(samples.len() + FFT_SIZE, 0.0);

        let mut scratch = self.forward.make_scratch_vec();
        let mut frame = vec![0.0f32; FFT_SIZE];
        let mut spectra = Vec::new();

        let mut start = 0;
        while start + FFT_SIZE <= padded.len() {
            for (dst, (&sample, &w)) in frame
                .iter_mut()
                .zip(padded[start..start + FFT_SIZE].iter().zip(&self.window))
            {
                *dst = sample * w;
            }

            let mut spectrum = self.forward.make_output_vec();
            self.forward
                .process_with_scratch(&mut frame, &mut spectrum, &mut scratch)
                .map_err(|e| AudioError::Filter(e.to_string()))?;
            spectra.push(spectrum);

            start += HOP_SIZE;
        }

        Ok(spectra)
    }

    /// Per-bin gains in [1 - prop_decrease, 1.0]
    fn compute_gains(&self, spectra: &[Vec<Complex32>]) -> Vec<Vec<f32>> {
        let frames = spectra.len();
        let bins = spectra[0].len();

        let mag_db: Vec<Vec<f32>> = spectra
            .iter()
            .map(|spectrum| {
                spectrum
                    .iter()
                    .map(|c| 20.0 * (c.norm() + MAG_EPS).log10())
                    .collect()
            })
            .collect();

        let mut mask = vec![vec![0.0f32; bins]; frames];

        if self.stationary {
            // One threshold per bin from the whole signal's statistics
            for f in 0..bins {
                let mut sum = 0.0f64;
                let mut sum_sq = 0.0f64;
                for row in &mag_db {
                    sum += row[f] as f64;
                    sum_sq += (row[f] as f64) * (row[f] as f64);
                }
                let mean = sum / frames as f64;
                let var = (sum_sq / frames as f64 - mean * mean).max(0.0);
                let threshold = (mean + NOISE_SIGMA as f64 * var.sqrt()) as f32;

                for t in 0..frames {
                    if mag_db[t][f] > threshold {
                        mask[t][f] = 1.0;
                    }
                }
            }
        } else {
            // Exponentially weighted mean/std tracks a drifting floor
            let hop_secs = HOP_SIZE as f32 / self.sample_rate as f32;
            let alpha = (-hop_secs / TRACKER_TIME_SECS).exp();

            let mut ema: Vec<f32> = mag_db[0].clone();
            let mut ema_sq: Vec<f32> = mag_db[0].iter().map(|x| x * x).collect();

            for t in 0..frames {
                for f in 0..bins {
                    let x = mag_db[t][f];
                    ema[f] = alpha * ema[f] + (1.0 - alpha) * x;
                    ema_sq[f] = alpha * ema_sq[f] + (1.0 - alpha) * x * x;

                    let var = (ema_sq[f] - ema[f] * ema[f]).max(0.0);
                    if x > ema[f] + NOISE_SIGMA * var.sqrt() {
                        mask[t][f] = 1.0;
                    }
                }
            }
        }

        self.smooth_mask(&mut mask);

        for row in mask.iter_mut() {
            for gain in row.iter_mut() {
                *gain = (1.0 - self.prop_decrease) + self.prop_decrease * *gain;
            }
        }
        mask
    }

    /// Box-smooth the binary mask over frequency and time to avoid
    /// musical-noise artifacts at gain edges.
    fn smooth_mask(&self, mask: &mut [Vec<f32>]) {
        let bins = mask[0].len();
        let bin_hz = self.sample_rate as f32 / FFT_SIZE as f32;
        let freq_half = ((MASK_SMOOTH_HZ / bin_hz / 2.0).round() as usize).max(1);
        let hop_ms = HOP_SIZE as f32 * 1000.0 / self.sample_rate as f32;
        let time_half = ((MASK_SMOOTH_MS / hop_ms / 2.0).round() as usize).max(1);

        for row in mask.iter_mut() {
            let smoothed = blur(row, freq_half);
            row.copy_from_slice(&smoothed);
        }

        let mut column = vec![0.0f32; mask.len()];
        for f in 0..bins {
            for (t, row) in mask.iter().enumerate() {
                column[t] = row[f];
            }
            let smoothed = blur(&column, time_half);
            for (t, row) in mask.iter_mut().enumerate() {
                row[f] = smoothed[t];
            }
        }
    }

    /// Inverse STFT with overlap-add, normalized by the summed squared
    /// window so edges come out at the right amplitude.
    fn synthesize(
        &self,
        spectra: Vec<Vec<Complex32>>,
        gains: &[Vec<f32>],
        output_len: usize,
    ) -> Result<Vec<f32>> {
        let padded_len = output_len + FFT_SIZE;
        let mut out = vec![0.0f32; padded_len];
        let mut window_sum = vec![0.0f32; padded_len];

        let mut scratch = self.inverse.make_scratch_vec();
        let mut frame = self.inverse.make_output_vec();

        for (i, (mut spectrum, gain_row)) in spectra.into_iter().zip(gains).enumerate() {
            for (bin, &gain) in spectrum.iter_mut().zip(gain_row) {
                *bin *= gain;
            }
            // realfft requires zero imaginary DC/Nyquist
            spectrum[0].im = 0.0;
            if let Some(last) = spectrum.last_mut() {
                last.im = 0.0;
            }

            self.inverse
                .process_with_scratch(&mut spectrum, &mut frame, &mut scratch)
                .map_err(|e| AudioError::Filter(e.to_string()))?;

            let start = i * HOP_SIZE;
            for (j, (&sample, &w)) in frame.iter().zip(&self.window).enumerate() {
                // realfft leaves the inverse unnormalized
                out[start + j] += sample / FFT_SIZE as f32 * w;
                window_sum[start + j] += w * w;
            }
        }

        out.truncate(output_len);
        for (sample, &w_sum) in out.iter_mut().zip(&window_sum) {
            *sample /= w_sum.max(1e-8);
        }
        Ok(out)
    }
}

/// Box blur with the given half-width, edges clamped
fn blur(values: &[f32], half: usize) -> Vec<f32> {
    let n = values.len();
    let mut prefix = vec![0.0f32; n + 1];
    for (i, &v) in values.iter().enumerate() {
        prefix[i + 1] = prefix[i] + v;
    }

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            (prefix[hi] - prefix[lo]) / (hi - lo) as f32
        })
        .collect()
}
