//! Per-channel dynamics and EQ stages for the enhancement chain

use biquad::{Biquad, Coefficients, DirectForm1, ToHertz, Type, Q_BUTTERWORTH_F32};

use crate::error::{AudioError, Result};

/// Levels below this are treated as silence
const DB_FLOOR: f32 = -100.0;

/// Fixed attack for the dynamics stages (seconds)
const ATTACK_SECS: f32 = 0.001;

pub(crate) fn db_to_linear(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

pub(crate) fn linear_to_db(linear: f32) -> f32 {
    if linear > 1e-5 {
        20.0 * linear.log10()
    } else {
        DB_FLOOR
    }
}

/// Peak envelope follower with separate attack/release smoothing
struct EnvelopeFollower {
    /// Attack coefficient (rising level)
    attack_coeff: f32,
    /// Release coefficient (falling level)
    release_coeff: f32,
    envelope: f32,
}

impl EnvelopeFollower {
    fn new(attack_secs: f32, release_secs: f32, sample_rate: u32) -> Self {
        // Convert time constants to coefficients
        // coefficient = 1 - exp(-1 / (time * sample_rate))
        let attack_coeff = 1.0 - (-1.0 / (attack_secs * sample_rate as f32)).exp();
        let release_coeff = 1.0 - (-1.0 / (release_secs * sample_rate as f32)).exp();

        Self {
            attack_coeff,
            release_coeff,
            envelope: 0.0,
        }
    }

    fn track(&mut self, sample: f32) -> f32 {
        let level = sample.abs();
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope += coeff * (level - self.envelope);
        self.envelope
    }
}

/// Downward expander: attenuates audio below the threshold.
///
/// Below the threshold the gain in dB is
/// `(envelope_db - threshold_db) * (ratio - 1)`, so a ratio of 1.0 is
/// transparent and larger ratios gate harder.
pub struct NoiseGate {
    threshold_db: f32,
    ratio: f32,
    follower: EnvelopeFollower,
}

impl NoiseGate {
    pub fn new(threshold_db: f32, ratio: f32, release_ms: f32, sample_rate: u32) -> Self {
        Self {
            threshold_db,
            ratio,
            follower: EnvelopeFollower::new(ATTACK_SECS, release_ms / 1000.0, sample_rate),
        }
    }

    pub fn process(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            let env_db = linear_to_db(self.follower.track(*sample));
            if env_db < self.threshold_db {
                let gain_db = (env_db - self.threshold_db) * (self.ratio - 1.0);
                *sample *= db_to_linear(gain_db.max(DB_FLOOR));
            }
        }
    }
}

/// Compressor: attenuates audio above the threshold.
///
/// Above the threshold the output level follows
/// `threshold_db + (envelope_db - threshold_db) / ratio`.
pub struct Compressor {
    threshold_db: f32,
    ratio: f32,
    follower: EnvelopeFollower,
}

impl Compressor {
    /// Release is fixed at 100 ms
    pub fn new(threshold_db: f32, ratio: f32, sample_rate: u32) -> Self {
        Self {
            threshold_db,
            ratio,
            follower: EnvelopeFollower::new(ATTACK_SECS, 0.1, sample_rate),
        }
    }

    pub fn process(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            let env_db = linear_to_db(self.follower.track(*sample));
            if env_db > self.threshold_db {
                let out_db = self.threshold_db + (env_db - self.threshold_db) / self.ratio;
                *sample *= db_to_linear(out_db - env_db);
            }
        }
    }
}

/// Low-shelf EQ boosting (or cutting) everything below the cutoff
pub struct LowShelf {
    filter: DirectForm1<f32>,
}

impl LowShelf {
    pub fn new(cutoff_hz: f32, gain_db: f32, sample_rate: u32) -> Result<Self> {
        let coeffs = Coefficients::<f32>::from_params(
            Type::LowShelf(gain_db),
            sample_rate.hz(),
            cutoff_hz.hz(),
            Q_BUTTERWORTH_F32,
        )
        .map_err(|e| AudioError::Filter(format!("Low-shelf filter error: {:?}", e)))?;

        Ok(Self {
            filter: DirectForm1::<f32>::new(coeffs),
        })
    }

    pub fn process(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.filter.run(*sample);
        }
    }
}

/// Apply a flat gain in dB
pub fn apply_gain(samples: &mut [f32], gain_db: f32) {
    let gain = db_to_linear(gain_db);
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}
