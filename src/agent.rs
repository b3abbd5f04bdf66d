use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::boundary::{apply_boundary, Domain, TeleportCooldown};
use crate::config::SwarmConfig;
use crate::math::{forward_axis, wrap_degrees};
use crate::motion::{self, MotionParams};
use crate::neighbors::{scan_all_pairs, AgentView, NeighborScan};
use crate::spectrum::{AudioFrame, SteeringStrengths};
use crate::steering::{self, SteeringGates, SteeringTrace};

/// Static per-agent behavior toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorFlags {
    pub separation: bool,
    pub alignment: bool,
    pub cohesion: bool,
    pub collision: bool,
}

impl Default for BehaviorFlags {
    fn default() -> Self {
        Self {
            separation: true,
            alignment: true,
            cohesion: true,
            collision: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Agent {
    pub position: Vec2,
    pub flags: BehaviorFlags,
    /// Written by the input collaborator; read during the fixed step.
    pub pointer_influence: Vec2,
    /// Receives the strong pointer pull regardless of button state.
    pub controlled: bool,
    heading: Vec2,
    rotation_deg: f32,
    speed: f32,
    cooldown: TeleportCooldown,
    strengths: SteeringStrengths,
    scan: NeighborScan,
    trace: Option<SteeringTrace>,
}

impl Agent {
    pub fn new(position: Vec2, rotation_deg: f32) -> Self {
        Self {
            position,
            flags: BehaviorFlags::default(),
            pointer_influence: Vec2::ZERO,
            controlled: false,
            heading: Vec2::ZERO,
            rotation_deg: wrap_degrees(rotation_deg),
            speed: 0.0,
            cooldown: TeleportCooldown::Ready,
            strengths: SteeringStrengths::default(),
            scan: NeighborScan::default(),
            trace: None,
        }
    }

    pub fn with_flags(mut self, flags: BehaviorFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn view(&self) -> AgentView {
        AgentView {
            position: self.position,
            heading: self.heading,
        }
    }

    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    pub fn rotation_deg(&self) -> f32 {
        self.rotation_deg
    }

    pub fn forward(&self) -> Vec2 {
        forward_axis(self.rotation_deg)
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn cooldown(&self) -> TeleportCooldown {
        self.cooldown
    }

    pub fn scan(&self) -> &NeighborScan {
        &self.scan
    }

    /// Radius of the debug sensing circle drawn around the agent.
    pub fn nearest_distance(&self) -> f32 {
        self.scan.nearest_distance()
    }

    /// Hands the last steering trace to the renderer; `None` until the next
    /// fixed step records a new one.
    pub fn take_trace(&mut self) -> Option<SteeringTrace> {
        self.trace.take()
    }

    /// Variable-timestep update against a registry of every live agent.
    /// `index` is this agent's slot in `registry`; that entry is ignored and
    /// the scan starts from this agent's post-boundary position.
    ///
    /// The other entries must already be past their own boundary pass for
    /// this frame. Drivers of a whole population should call `wrap_bounds` on
    /// every agent, snapshot, then `observe`, which is what `Swarm::update`
    /// does.
    pub fn update(
        &mut self,
        index: usize,
        frame: &AudioFrame,
        registry: &[AgentView],
        dt: f32,
        config: &SwarmConfig,
    ) {
        self.wrap_bounds(dt, config);
        let scan = scan_all_pairs(
            index,
            self.position,
            registry,
            config.sensing_radius,
            config.math_mode,
        );
        self.observe(scan, frame, config);
    }

    /// Boundary half of the update. Returns true on a teleport.
    pub fn wrap_bounds(&mut self, dt: f32, config: &SwarmConfig) -> bool {
        let domain = Domain::new(config.x_perimeter, config.y_perimeter);
        apply_boundary(
            &mut self.cooldown,
            &mut self.position,
            &domain,
            dt,
            config.teleport_cooldown_secs,
        )
    }

    /// Stores this frame's scan and audio-derived values.
    pub fn observe(&mut self, scan: NeighborScan, frame: &AudioFrame, config: &SwarmConfig) {
        self.scan = scan;
        self.strengths = frame.strengths;
        self.speed = frame.speed(config.base_speed);
    }

    /// Fixed-timestep physics: steering blend, rotation, then integration.
    /// Only this agent's own state is read or written.
    pub fn fixed_step(&mut self, config: &SwarmConfig) {
        let gates =
            SteeringGates::evaluate(self.scan.nearest_distance(), config.ideal_spacing, self.flags);
        let trace = steering::target_heading(
            &self.scan,
            gates,
            self.strengths,
            self.pointer_influence,
            config.math_mode,
        );
        self.heading = steering::blend_heading(self.heading, trace.target, config.heading_smoothing);

        let delta = steering::rotation_delta(self.rotation_deg, self.heading, config.rotation_speed);
        self.rotation_deg = wrap_degrees(self.rotation_deg + delta);

        let params = MotionParams {
            collision_threshold: config.collision_threshold,
            collision_speed_factor: config.collision_speed_factor,
            collision_push_divisor: config.collision_push_divisor,
            collision_enabled: self.flags.collision,
        };
        let step = motion::displacement(
            self.position,
            self.forward(),
            self.speed,
            self.scan.nearest,
            &params,
        );
        self.position += step.delta;
        self.trace = Some(trace);
    }
}
