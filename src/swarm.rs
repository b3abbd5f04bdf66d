use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::info;

use crate::agent::Agent;
use crate::config::{ConfigError, SwarmConfig};
use crate::neighbors::{AgentView, NeighborScanner};
use crate::pointer::PointerInput;
use crate::spectrum::{AudioFrame, SpectrumAnalyzer};
use crate::telemetry::Telemetry;

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to draw an entropy seed: {0}")]
    Entropy(#[from] getrandom::Error),
}

/// The whole population plus the frame-scoped state shared between agents.
///
/// `update` computes every agent's scan from one immutable snapshot taken
/// after the boundary pass, so no agent observes another mid-update.
/// `fixed_step` only touches each agent's own state.
pub struct Swarm {
    config: SwarmConfig,
    analyzer: SpectrumAnalyzer,
    scanner: NeighborScanner,
    agents: Vec<Agent>,
    snapshot: Vec<AgentView>,
    audio: AudioFrame,
    pointer: Option<PointerInput>,
    telemetry: Telemetry,
    seed: u64,
}

impl Swarm {
    /// Seeds `count` agents uniformly over the domain with random facings.
    /// A seed of 0 draws one from OS entropy.
    pub fn new(config: SwarmConfig, count: usize, seed: u64) -> Result<Self, SwarmError> {
        config.validate()?;
        let seed = if seed == 0 { getrandom::u64()? } else { seed };

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (x_perimeter, y_perimeter) = (config.x_perimeter, config.y_perimeter);
        let agents = (0..count)
            .map(|_| {
                let position = Vec2::new(
                    rng.random_range(-x_perimeter..=x_perimeter),
                    rng.random_range(-y_perimeter..=y_perimeter),
                );
                Agent::new(position, rng.random_range(0.0..360.0))
            })
            .collect();

        info!(count, seed, query = ?config.neighbor_query, "swarm created");
        Ok(Self::from_agents(config, agents, seed))
    }

    /// Wraps an externally built population. Fails when the config is invalid.
    pub fn with_agents(config: SwarmConfig, agents: Vec<Agent>) -> Result<Self, SwarmError> {
        config.validate()?;
        Ok(Self::from_agents(config, agents, 0))
    }

    fn from_agents(config: SwarmConfig, agents: Vec<Agent>, seed: u64) -> Self {
        Self {
            analyzer: SpectrumAnalyzer::new(&config),
            scanner: NeighborScanner::new(&config),
            telemetry: Telemetry::new(config.telemetry_interval_secs),
            snapshot: Vec::with_capacity(agents.len()),
            agents,
            audio: AudioFrame::silent(),
            pointer: None,
            config,
            seed,
        }
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn agent_mut(&mut self, index: usize) -> Option<&mut Agent> {
        self.agents.get_mut(index)
    }

    pub fn add_agent(&mut self, agent: Agent) -> usize {
        self.agents.push(agent);
        self.agents.len() - 1
    }

    /// Removes an agent; later agents shift down by one index.
    pub fn remove_agent(&mut self, index: usize) -> Option<Agent> {
        (index < self.agents.len()).then(|| self.agents.remove(index))
    }

    /// Audio analysis from the most recent update.
    pub fn audio(&self) -> &AudioFrame {
        &self.audio
    }

    /// Pointer applied on every following update until replaced or cleared.
    /// Clearing also drops whatever influence the agents still carry.
    pub fn set_pointer(&mut self, pointer: Option<PointerInput>) {
        self.pointer = pointer;
        if pointer.is_none() {
            for agent in &mut self.agents {
                agent.pointer_influence = Vec2::ZERO;
            }
        }
    }

    pub fn pointer(&self) -> Option<PointerInput> {
        self.pointer
    }

    /// Variable-timestep update for the whole population.
    pub fn update(&mut self, dt: f32, spectrum: &[f32]) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.audio = self.analyzer.analyze(spectrum);
        self.apply_pointer();

        for agent in &mut self.agents {
            agent.wrap_bounds(dt, &self.config);
        }

        self.snapshot.clear();
        self.snapshot.extend(self.agents.iter().map(Agent::view));
        self.scanner.prepare(
            &self.snapshot,
            self.config.x_perimeter,
            self.config.y_perimeter,
        );

        for (index, agent) in self.agents.iter_mut().enumerate() {
            let scan = self.scanner.scan(index, &self.snapshot);
            agent.observe(scan, &self.audio, &self.config);
        }

        let speed = self.audio.speed(self.config.base_speed);
        self.telemetry.tick(dt, &self.audio, speed);
    }

    /// Fixed-timestep physics for the whole population.
    pub fn fixed_step(&mut self) {
        for agent in &mut self.agents {
            agent.fixed_step(&self.config);
        }
    }

    /// Appends `[x, y, rotation_deg]` per agent to `out` after clearing it.
    pub fn write_render_buffer(&self, out: &mut Vec<f32>) {
        out.clear();
        out.reserve(self.agents.len() * 3);
        for agent in &self.agents {
            out.extend_from_slice(&[agent.position.x, agent.position.y, agent.rotation_deg()]);
        }
    }

    fn apply_pointer(&mut self) {
        let Some(pointer) = self.pointer else {
            return;
        };
        for agent in &mut self.agents {
            agent.pointer_influence = pointer.influence(
                agent.position,
                agent.controlled,
                self.config.pointer_distance_divisor,
                self.config.controlled_pointer_scale,
                self.config.math_mode,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Swarm, SwarmError};
    use crate::agent::Agent;
    use crate::config::{SwarmConfig, SPECTRUM_LEN};
    use crate::pointer::{PointerInput, PointerMode};
    use glam::Vec2;

    #[test]
    fn seeded_swarms_are_reproducible_and_inside_domain() {
        let config = SwarmConfig::default();
        let a = Swarm::new(config.clone(), 32, 99).expect("swarm");
        let b = Swarm::new(config.clone(), 32, 99).expect("swarm");

        assert_eq!(a.len(), 32);
        for (left, right) in a.agents().iter().zip(b.agents()) {
            assert_eq!(left.position, right.position);
            assert_eq!(left.rotation_deg(), right.rotation_deg());
            assert!(left.position.x.abs() <= config.x_perimeter);
            assert!(left.position.y.abs() <= config.y_perimeter);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SwarmConfig {
            base_speed: -1.0,
            ..SwarmConfig::default()
        };
        assert!(matches!(
            Swarm::new(config, 4, 1),
            Err(SwarmError::Config(_))
        ));
    }

    #[test]
    fn population_can_change_between_frames() {
        let mut swarm = Swarm::new(SwarmConfig::default(), 3, 5).expect("swarm");
        let spectrum = vec![0.0; SPECTRUM_LEN];
        swarm.update(1.0 / 60.0, &spectrum);
        swarm.fixed_step();

        let index = swarm.add_agent(Agent::new(Vec2::ZERO, 0.0));
        assert_eq!(index, 3);
        assert!(swarm.remove_agent(0).is_some());
        assert!(swarm.remove_agent(10).is_none());

        swarm.update(1.0 / 60.0, &spectrum);
        swarm.fixed_step();
        assert_eq!(swarm.len(), 3);
        assert!(swarm.agents().iter().all(|agent| agent.position.is_finite()));
    }

    #[test]
    fn pressed_pointer_reaches_every_agent() {
        let mut swarm = Swarm::with_agents(
            SwarmConfig::default(),
            vec![
                Agent::new(Vec2::new(-1.0, 0.0), 0.0),
                Agent::new(Vec2::new(1.0, 0.0), 0.0),
            ],
        )
        .expect("swarm");
        swarm.set_pointer(Some(PointerInput {
            position: Vec2::new(0.0, 5.0),
            mode: PointerMode::Pressed,
        }));
        swarm.update(1.0 / 60.0, &[]);

        for agent in swarm.agents() {
            assert!((agent.pointer_influence.length() - 1.0).abs() < 1.0e-5);
            assert!(agent.pointer_influence.y < 0.0);
        }

        swarm.set_pointer(None);
        assert!(swarm
            .agents()
            .iter()
            .all(|agent| agent.pointer_influence == Vec2::ZERO));
    }

    #[test]
    fn render_buffer_has_three_floats_per_agent() {
        let swarm = Swarm::new(SwarmConfig::default(), 5, 3).expect("swarm");
        let mut buffer = vec![1.0; 2];
        swarm.write_render_buffer(&mut buffer);
        assert_eq!(buffer.len(), 15);
        assert_eq!(buffer[0], swarm.agents()[0].position.x);
        assert_eq!(buffer[2], swarm.agents()[0].rotation_deg());
    }
}
