use glam::Vec2;

use crate::neighbors::Nearest;

#[derive(Clone, Copy, Debug)]
pub struct MotionParams {
    pub collision_threshold: f32,
    pub collision_speed_factor: f32,
    pub collision_push_divisor: f32,
    pub collision_enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Displacement {
    pub delta: Vec2,
    pub collided: bool,
}

/// Displacement for one fixed step along `forward`.
///
/// When the nearest neighbor is closer than the collision threshold the agent
/// is pushed directly away from it and only advances at the reduced collision
/// speed. Agents may still overlap briefly; this is soft avoidance.
///
/// An agent with no nearest neighbor sits at distance 0, inside the collision
/// branch, but has nothing to push against: it holds its position.
pub fn displacement(
    position: Vec2,
    forward: Vec2,
    speed: f32,
    nearest: Option<Nearest>,
    params: &MotionParams,
) -> Displacement {
    let distance = nearest.map_or(0.0, |n| n.distance);
    if params.collision_enabled && distance < params.collision_threshold {
        let Some(nearest) = nearest else {
            return Displacement {
                delta: Vec2::ZERO,
                collided: false,
            };
        };
        let push = (position - nearest.position) / params.collision_push_divisor;
        return Displacement {
            delta: push + forward * speed * params.collision_speed_factor,
            collided: true,
        };
    }

    Displacement {
        delta: forward * speed,
        collided: false,
    }
}
