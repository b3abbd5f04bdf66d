use glam::Vec2;
use serde::{Deserialize, Serialize};

pub const EPSILON: f32 = 1.0e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathMode {
    #[default]
    Accurate,
    Fast,
}

/// Unit vector in the direction of `v`, or zero when `v` is too short to
/// carry a direction.
pub fn normalize_or_zero(mode: MathMode, v: Vec2) -> Vec2 {
    normalize_to_magnitude(mode, v, 1.0)
}

pub fn normalize_to_magnitude(mode: MathMode, v: Vec2, magnitude: f32) -> Vec2 {
    let mag_sq = v.length_squared();
    if mag_sq <= EPSILON || !mag_sq.is_finite() {
        return Vec2::ZERO;
    }

    v * (magnitude * inverse_sqrt(mode, mag_sq))
}

pub fn lerp(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}

/// Facing direction for a rotation in degrees; rotation 0 faces +Y and
/// positive angles turn counter-clockwise.
pub fn forward_axis(rotation_deg: f32) -> Vec2 {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    Vec2::new(-sin, cos)
}

pub fn right_axis(rotation_deg: f32) -> Vec2 {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    Vec2::new(cos, sin)
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unsigned angle between two planar rotations, in `[0, 180]`.
pub fn angle_between_deg(a: f32, b: f32) -> f32 {
    let diff = wrap_degrees(a - b);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

fn inverse_sqrt(mode: MathMode, value: f32) -> f32 {
    match mode {
        MathMode::Accurate => 1.0 / value.sqrt(),
        MathMode::Fast => fast_inverse_sqrt(value),
    }
}

// One Newton-Raphson refinement; steering only needs direction, so the small
// precision drift is acceptable.
fn fast_inverse_sqrt(value: f32) -> f32 {
    let half = 0.5 * value;
    let mut i = value.to_bits();
    i = 0x5f37_59df_u32.wrapping_sub(i >> 1);
    let mut y = f32::from_bits(i);
    y *= 1.5 - half * y * y;
    y.max(0.0)
}
