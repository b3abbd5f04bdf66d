use glam::Vec2;

use crate::math::{self, MathMode};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerMode {
    #[default]
    Idle,
    Pressed,
}

/// Pointer position in world space as captured by the input layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    pub position: Vec2,
    pub mode: PointerMode,
}

impl PointerInput {
    /// Influence vector for one agent. Points away from the pointer, which
    /// the steering convention turns into motion toward it. Controlled agents
    /// follow the pointer at all times with a stronger pull; the rest only
    /// while it is pressed.
    pub fn influence(
        &self,
        agent_position: Vec2,
        controlled: bool,
        distance_divisor: f32,
        controlled_scale: f32,
        mode: MathMode,
    ) -> Vec2 {
        let scale = if controlled {
            controlled_scale
        } else if self.mode == PointerMode::Pressed {
            1.0
        } else {
            return Vec2::ZERO;
        };

        let offset = -(self.position - agent_position) / distance_divisor;
        math::normalize_or_zero(mode, offset) * scale
    }
}

#[cfg(test)]
mod tests {
    use super::{PointerInput, PointerMode};
    use crate::math::MathMode;
    use glam::Vec2;

    fn influence(input: PointerInput, agent: Vec2, controlled: bool) -> Vec2 {
        input.influence(agent, controlled, 5.0, 5.0, MathMode::Accurate)
    }

    #[test]
    fn idle_pointer_has_no_influence_on_free_agents() {
        let input = PointerInput {
            position: Vec2::new(3.0, 0.0),
            mode: PointerMode::Idle,
        };
        assert_eq!(influence(input, Vec2::ZERO, false), Vec2::ZERO);
    }

    #[test]
    fn pressed_pointer_gives_unit_vector() {
        let input = PointerInput {
            position: Vec2::new(3.0, 0.0),
            mode: PointerMode::Pressed,
        };
        let v = influence(input, Vec2::ZERO, false);
        assert!((v - Vec2::NEG_X).length() < 1.0e-6);
    }

    #[test]
    fn controlled_agents_follow_with_scaled_pull() {
        let input = PointerInput {
            position: Vec2::new(0.0, -2.0),
            mode: PointerMode::Idle,
        };
        let v = influence(input, Vec2::ZERO, true);
        assert!((v - Vec2::new(0.0, 5.0)).length() < 1.0e-5);
    }

    #[test]
    fn pointer_on_top_of_agent_is_zero() {
        let input = PointerInput {
            position: Vec2::new(1.0, 1.0),
            mode: PointerMode::Pressed,
        };
        assert_eq!(influence(input, Vec2::new(1.0, 1.0), false), Vec2::ZERO);
    }
}
