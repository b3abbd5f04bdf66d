use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::MathMode;
use crate::neighbors::NeighborQuery;

pub const SPECTRUM_LEN: usize = 512;
pub const MAX_SENSING_RADIUS: f32 = 1_000.0;
pub const MAX_PERIMETER: f32 = 100_000.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("band range {start}..{end} is empty or exceeds the 512-bin spectrum")]
    InvalidBand { start: usize, end: usize },
    #[error("failed to parse swarm config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Half-open index range into the magnitude spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandRange {
    pub start: usize,
    pub end: usize,
}

impl BandRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandRanges {
    pub bass: BandRange,
    pub mid: BandRange,
    pub high: BandRange,
}

impl Default for BandRanges {
    fn default() -> Self {
        Self {
            bass: BandRange::new(0, 2),
            mid: BandRange::new(2, 5),
            high: BandRange::new(5, 12),
        }
    }
}

/// Every tunable constant of the kernel. Fixed at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Separation strength before the bass response is applied.
    pub base_away_strength: f32,
    /// Alignment strength before the mid response is applied.
    pub base_with_strength: f32,
    /// Cohesion strength before the high response is applied.
    pub base_toward_strength: f32,
    /// Radius within which other agents feed the steering accumulators.
    pub sensing_radius: f32,
    pub neighbor_query: NeighborQuery,
    /// Nearest-neighbor distance at which alignment is weakest and cohesion starts.
    pub ideal_spacing: f32,
    /// Nearest-neighbor distance below which the collision impulse replaces plain advance.
    pub collision_threshold: f32,
    /// Fraction of speed kept while colliding.
    pub collision_speed_factor: f32,
    /// Divisor applied to the self-minus-nearest offset during a collision.
    pub collision_push_divisor: f32,
    /// Half-width of the teleport domain.
    pub x_perimeter: f32,
    /// Half-height of the teleport domain.
    pub y_perimeter: f32,
    /// Fraction of the remaining turn applied per fixed step.
    pub rotation_speed: f32,
    /// World units advanced per fixed step in silence.
    pub base_speed: f32,
    /// Low-pass factor for the heading; higher turns faster.
    pub heading_smoothing: f32,
    pub teleport_cooldown_secs: f32,
    pub telemetry_interval_secs: f32,
    /// Total band energy below which bands are left unnormalized.
    pub noise_floor: f32,
    pub band_ranges: BandRanges,
    pub strength_gain: f32,
    pub strength_exponent: f32,
    pub pointer_distance_divisor: f32,
    /// Pointer pull for agents under direct control.
    pub controlled_pointer_scale: f32,
    pub math_mode: MathMode,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            base_away_strength: 1.0,
            base_with_strength: 1.0,
            base_toward_strength: 1.0,
            sensing_radius: 3.0,
            neighbor_query: NeighborQuery::AllPairs,
            ideal_spacing: 0.5,
            collision_threshold: 0.2,
            collision_speed_factor: 0.7,
            collision_push_divisor: 20.0,
            x_perimeter: 14.0,
            y_perimeter: 8.0,
            rotation_speed: 0.12,
            base_speed: 0.04,
            heading_smoothing: 0.15,
            teleport_cooldown_secs: 2.0,
            telemetry_interval_secs: 1.0,
            noise_floor: 0.01,
            band_ranges: BandRanges::default(),
            strength_gain: 10.0,
            strength_exponent: 3.0,
            pointer_distance_divisor: 5.0,
            controlled_pointer_scale: 5.0,
            math_mode: MathMode::Accurate,
        }
    }
}

impl SwarmConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_strengths()?;
        self.validate_spacing()?;
        self.validate_domain()?;
        self.validate_timing()?;
        self.validate_audio()?;
        self.validate_pointer()?;
        Ok(())
    }

    fn validate_strengths(&self) -> Result<(), ConfigError> {
        non_negative("base_away_strength", self.base_away_strength)?;
        non_negative("base_with_strength", self.base_with_strength)?;
        non_negative("base_toward_strength", self.base_toward_strength)?;
        Ok(())
    }

    fn validate_spacing(&self) -> Result<(), ConfigError> {
        in_range("sensing_radius", self.sensing_radius, 0.0, MAX_SENSING_RADIUS)?;
        non_negative("ideal_spacing", self.ideal_spacing)?;
        non_negative("collision_threshold", self.collision_threshold)?;
        in_range("collision_speed_factor", self.collision_speed_factor, 0.0, 1.0)?;
        positive("collision_push_divisor", self.collision_push_divisor)?;
        Ok(())
    }

    fn validate_domain(&self) -> Result<(), ConfigError> {
        in_range("x_perimeter", self.x_perimeter, f32::MIN_POSITIVE, MAX_PERIMETER)?;
        in_range("y_perimeter", self.y_perimeter, f32::MIN_POSITIVE, MAX_PERIMETER)?;
        in_range("rotation_speed", self.rotation_speed, 0.0, 1.0)?;
        non_negative("base_speed", self.base_speed)?;
        Ok(())
    }

    fn validate_timing(&self) -> Result<(), ConfigError> {
        in_range("heading_smoothing", self.heading_smoothing, 0.0, 1.0)?;
        non_negative("teleport_cooldown_secs", self.teleport_cooldown_secs)?;
        positive("telemetry_interval_secs", self.telemetry_interval_secs)?;
        Ok(())
    }

    fn validate_audio(&self) -> Result<(), ConfigError> {
        non_negative("noise_floor", self.noise_floor)?;
        non_negative("strength_gain", self.strength_gain)?;
        in_range("strength_exponent", self.strength_exponent, 0.0, 8.0)?;
        let ranges = self.band_ranges;
        for band in [ranges.bass, ranges.mid, ranges.high] {
            if band.start >= band.end || band.end > SPECTRUM_LEN {
                return Err(ConfigError::InvalidBand {
                    start: band.start,
                    end: band.end,
                });
            }
        }
        Ok(())
    }

    fn validate_pointer(&self) -> Result<(), ConfigError> {
        positive("pointer_distance_divisor", self.pointer_distance_divisor)?;
        non_negative("controlled_pointer_scale", self.controlled_pointer_scale)?;
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{BandRange, ConfigError, SwarmConfig};
    use crate::neighbors::NeighborQuery;

    #[test]
    fn defaults_are_valid() {
        SwarmConfig::default()
            .validate()
            .expect("default config validates");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SwarmConfig::from_json(r#"{"sensing_radius": 2.5, "neighbor_query": "grid"}"#)
            .expect("partial config parses");
        assert_eq!(config.sensing_radius, 2.5);
        assert_eq!(config.neighbor_query, NeighborQuery::Grid);
        assert_eq!(config.base_speed, SwarmConfig::default().base_speed);
    }

    #[test]
    fn json_round_trip_preserves_values() {
        let mut config = SwarmConfig::default();
        config.x_perimeter = 20.0;
        config.band_ranges.high = BandRange::new(6, 40);
        let json = config.to_json().expect("serialize");
        let parsed = SwarmConfig::from_json(&json).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn rejects_invalid_values() {
        let config = SwarmConfig {
            heading_smoothing: 1.5,
            ..SwarmConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "heading_smoothing",
                ..
            })
        ));

        let config = SwarmConfig {
            x_perimeter: f32::NAN,
            ..SwarmConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = SwarmConfig::default();
        config.band_ranges.mid = BandRange::new(5, 5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBand { start: 5, end: 5 })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            SwarmConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
