//! Gated force blend, heading low-pass and turn computation.

use glam::Vec2;

use crate::agent::BehaviorFlags;
use crate::math::{self, angle_between_deg, right_axis, EPSILON};
use crate::neighbors::NeighborScan;
use crate::spectrum::SteeringStrengths;

/// Below this normalized local-x the heading counts as lying on the agent's
/// forward/back axis.
const TURN_SIGN_EPSILON: f32 = 1.0e-6;

/// Separation gate: 1 at contact, fading to 0 a little past the ideal spacing.
pub fn away_gate(distance: f32, ideal_spacing: f32) -> f32 {
    let scaled = distance / ideal_spacing.max(EPSILON);
    (1.2 - scaled * scaled).clamp(0.0, 1.0)
}

/// Alignment gate: 0 at the ideal spacing, rising on either side.
pub fn with_gate(distance: f32, ideal_spacing: f32) -> f32 {
    let closer = (ideal_spacing - distance).clamp(0.0, ideal_spacing);
    let farther = (distance - ideal_spacing).clamp(0.0, ideal_spacing);
    (3.0 * closer + 3.0 * farther).clamp(0.0, 1.0)
}

/// Cohesion gate: 0 inside the ideal spacing, linear beyond it.
pub fn toward_gate(distance: f32, ideal_spacing: f32) -> f32 {
    (distance - ideal_spacing).clamp(0.0, 1.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SteeringGates {
    pub away: f32,
    pub with: f32,
    pub toward: f32,
}

impl SteeringGates {
    pub fn evaluate(distance: f32, ideal_spacing: f32, flags: BehaviorFlags) -> Self {
        Self {
            away: if flags.separation {
                away_gate(distance, ideal_spacing)
            } else {
                0.0
            },
            with: if flags.alignment {
                with_gate(distance, ideal_spacing)
            } else {
                0.0
            },
            toward: if flags.cohesion {
                toward_gate(distance, ideal_spacing)
            } else {
                0.0
            },
        }
    }
}

/// Weighted contributions that made up the last target heading. Kept for
/// debug visualization.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SteeringTrace {
    pub away: Vec2,
    pub with: Vec2,
    pub toward: Vec2,
    pub pointer: Vec2,
    pub target: Vec2,
}

pub fn target_heading(
    scan: &NeighborScan,
    gates: SteeringGates,
    strengths: SteeringStrengths,
    pointer: Vec2,
    mode: math::MathMode,
) -> SteeringTrace {
    let away = math::normalize_or_zero(mode, scan.away) * gates.away * strengths.away;
    let with = scan.with * gates.with * strengths.with;
    let toward = math::normalize_or_zero(mode, scan.toward) * gates.toward * strengths.toward;

    SteeringTrace {
        away,
        with,
        toward,
        pointer,
        target: away + with + toward + pointer,
    }
}

/// One low-pass step of the heading toward `target`. A non-finite result is
/// rejected and the previous heading kept.
pub fn blend_heading(previous: Vec2, target: Vec2, smoothing: f32) -> Vec2 {
    let next = math::lerp(previous, target, smoothing);
    if next.is_finite() {
        next
    } else {
        tracing::warn!(
            previous_x = previous.x,
            previous_y = previous.y,
            "rejected non-finite heading blend"
        );
        previous
    }
}

/// Rotation change in degrees for one fixed step.
///
/// The turn size is the arc between the current rotation and the heading's
/// rotation, scaled by `rotation_speed`. The sign comes from which side of the
/// agent the heading lies on: positive local-x turns counter-clockwise.
/// A heading exactly on the forward/back axis also turns counter-clockwise, and
/// a zero heading does not turn at all.
pub fn rotation_delta(rotation_deg: f32, heading: Vec2, rotation_speed: f32) -> f32 {
    let length = heading.length();
    if length <= EPSILON || !length.is_finite() {
        return 0.0;
    }

    let desired = heading.y.atan2(heading.x).to_degrees() - 90.0;
    let turn = angle_between_deg(rotation_deg, desired) * rotation_speed;
    let local_x = heading.dot(right_axis(rotation_deg)) / length;

    if local_x < -TURN_SIGN_EPSILON {
        -turn
    } else {
        turn
    }
}
