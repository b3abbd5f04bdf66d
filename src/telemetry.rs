use tracing::debug;

use crate::spectrum::AudioFrame;

/// Periodic structured diagnostic line. Purely observational.
pub struct Telemetry {
    interval: f32,
    timer: f32,
}

impl Telemetry {
    /// The first tick always emits.
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            timer: interval,
        }
    }

    /// Returns true when a line was emitted this tick.
    pub fn tick(&mut self, dt: f32, frame: &AudioFrame, speed: f32) -> bool {
        self.timer += dt;
        if self.timer < self.interval {
            return false;
        }

        debug!(
            target: "audio_flock::telemetry",
            bass = frame.bands.bass,
            mid = frame.bands.mid,
            high = frame.bands.high,
            away = frame.strengths.away,
            with = frame.strengths.with,
            toward = frame.strengths.toward,
            speed
        );
        self.timer = 0.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Telemetry;
    use crate::spectrum::AudioFrame;

    #[test]
    fn emits_once_per_interval() {
        let mut telemetry = Telemetry::new(1.0);
        let frame = AudioFrame::silent();

        assert!(telemetry.tick(0.016, &frame, 0.04));
        let emitted = (0..59)
            .filter(|_| telemetry.tick(1.0 / 60.0, &frame, 0.04))
            .count();
        assert_eq!(emitted, 0);

        let emitted = (0..3)
            .filter(|_| telemetry.tick(1.0 / 60.0, &frame, 0.04))
            .count();
        assert_eq!(emitted, 1);
    }
}
