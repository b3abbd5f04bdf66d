//! Reduces a magnitude spectrum into bass/mid/high energies and the steering
//! strengths derived from them.
//!
//! Bass drives separation, mid drives alignment and high drives cohesion. The
//! strengths use a cubic response so quiet ambient noise barely moves the flock
//! while strong beats produce large reactions.

use crate::config::{BandRange, SwarmConfig};

/// Band energies shared by every agent for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandEnergies {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
}

impl BandEnergies {
    pub fn total(self) -> f32 {
        self.bass + self.mid + self.high
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SteeringStrengths {
    pub away: f32,
    pub with: f32,
    pub toward: f32,
}

/// Result of analysing one spectrum snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioFrame {
    pub bands: BandEnergies,
    pub strengths: SteeringStrengths,
}

impl AudioFrame {
    /// Frame used when no audio has been captured yet.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn speed(&self, base_speed: f32) -> f32 {
        audio_reactive_speed(self.bands, base_speed)
    }
}

pub struct SpectrumAnalyzer {
    ranges: [BandRange; 3],
    noise_floor: f32,
    gain: f32,
    exponent: f32,
    base_away: f32,
    base_with: f32,
    base_toward: f32,
}

impl SpectrumAnalyzer {
    pub fn new(config: &SwarmConfig) -> Self {
        let ranges = config.band_ranges;
        Self {
            ranges: [ranges.bass, ranges.mid, ranges.high],
            noise_floor: config.noise_floor,
            gain: config.strength_gain,
            exponent: config.strength_exponent,
            base_away: config.base_away_strength,
            base_with: config.base_with_strength,
            base_toward: config.base_toward_strength,
        }
    }

    pub fn analyze(&self, samples: &[f32]) -> AudioFrame {
        let bands = self.band_energies(samples);
        AudioFrame {
            bands,
            strengths: self.strengths(bands),
        }
    }

    pub fn band_energies(&self, samples: &[f32]) -> BandEnergies {
        let [bass, mid, high] = self.ranges;
        let raw = [
            band_mean(samples, bass.start, bass.end),
            band_mean(samples, mid.start, mid.end),
            band_mean(samples, high.start, high.end),
        ];

        // Summed in f64 so loud but finite snapshots cannot overflow.
        let total: f64 = raw.iter().sum();
        let scale = if total > f64::from(self.noise_floor) {
            3.0 / total
        } else {
            1.0
        };
        let [bass, mid, high] = raw.map(|energy| to_f32(energy * scale));
        BandEnergies { bass, mid, high }
    }

    pub fn strengths(&self, bands: BandEnergies) -> SteeringStrengths {
        SteeringStrengths {
            away: self.base_away * self.response(bands.bass),
            with: self.base_with * self.response(bands.mid),
            toward: self.base_toward * self.response(bands.high),
        }
    }

    fn response(&self, energy: f32) -> f32 {
        (energy * self.gain).powf(self.exponent)
    }
}

/// Mean of `samples[start..end]`, clipped to the slice; 0 when the clipped
/// range is empty. Non-finite or negative samples count as silence.
pub fn band_energy(samples: &[f32], start: usize, end: usize) -> f32 {
    to_f32(band_mean(samples, start, end))
}

fn band_mean(samples: &[f32], start: usize, end: usize) -> f64 {
    let end = end.min(samples.len());
    if start >= end {
        return 0.0;
    }

    let window = &samples[start..end];
    let sum: f64 = window
        .iter()
        .map(|&sample| {
            if sample.is_finite() {
                f64::from(sample.max(0.0))
            } else {
                0.0
            }
        })
        .sum();
    sum / window.len() as f64
}

fn to_f32(value: f64) -> f32 {
    value.min(f64::from(f32::MAX)) as f32
}

pub fn audio_reactive_speed(bands: BandEnergies, base_speed: f32) -> f32 {
    let audio_boost = bands.total() / 5.0;
    base_speed * (1.0 + audio_boost)
}
