use glam::Vec2;

/// Debounce for boundary teleports. A teleport starts `Cooling`; the agent
/// cannot teleport again until the cooldown has elapsed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TeleportCooldown {
    #[default]
    Ready,
    Cooling {
        elapsed: f32,
    },
}

impl TeleportCooldown {
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Advances the cooldown timer; returns to `Ready` once `duration` has
    /// accumulated.
    pub fn tick(&mut self, dt: f32, duration: f32) {
        if let Self::Cooling { elapsed } = self {
            *elapsed += dt;
            if *elapsed >= duration {
                *self = Self::Ready;
            }
        }
    }
}

/// Rectangular domain `[-half.x, half.x] x [-half.y, half.y]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub half_extents: Vec2,
}

impl Domain {
    pub fn new(x_perimeter: f32, y_perimeter: f32) -> Self {
        Self {
            half_extents: Vec2::new(x_perimeter, y_perimeter),
        }
    }

    pub fn contains(&self, position: Vec2) -> bool {
        position.x.abs() <= self.half_extents.x && position.y.abs() <= self.half_extents.y
    }

    /// Position after teleporting across every axis that left the domain, or
    /// `None` when the position is inside.
    pub fn teleport(&self, position: Vec2) -> Option<Vec2> {
        let x = wrap_axis(position.x, self.half_extents.x);
        let y = wrap_axis(position.y, self.half_extents.y);
        if x.is_none() && y.is_none() {
            return None;
        }
        Some(Vec2::new(x.unwrap_or(position.x), y.unwrap_or(position.y)))
    }
}

fn wrap_axis(value: f32, bound: f32) -> Option<f32> {
    if value > bound {
        Some(-bound)
    } else if value < -bound {
        Some(bound)
    } else {
        None
    }
}

/// Runs one boundary update: the cooldown timer first, then the teleport test
/// if the agent is ready. Returns true when the agent was teleported.
pub fn apply_boundary(
    cooldown: &mut TeleportCooldown,
    position: &mut Vec2,
    domain: &Domain,
    dt: f32,
    cooldown_secs: f32,
) -> bool {
    cooldown.tick(dt, cooldown_secs);
    if !cooldown.is_ready() {
        return false;
    }

    match domain.teleport(*position) {
        Some(wrapped) => {
            *position = wrapped;
            *cooldown = TeleportCooldown::Cooling { elapsed: 0.0 };
            true
        }
        None => false,
    }
}
