pub mod agent;
pub mod boundary;
pub mod config;
pub mod math;
pub mod motion;
mod neighbor_grid;
pub mod neighbors;
pub mod pointer;
pub mod spectrum;
pub mod steering;
pub mod swarm;
pub mod telemetry;

use glam::Vec2;
use wasm_bindgen::prelude::*;

pub use agent::{Agent, BehaviorFlags};
pub use config::{ConfigError, SwarmConfig, SPECTRUM_LEN};
pub use math::MathMode;
pub use neighbors::NeighborQuery;
pub use pointer::{PointerInput, PointerMode};
pub use spectrum::{AudioFrame, BandEnergies, SteeringStrengths};
pub use swarm::{Swarm, SwarmError};

/// Browser handle around a [`Swarm`]. Agent state is exposed to JS as a flat
/// `[x, y, rotation_deg]` buffer read straight out of wasm memory.
#[wasm_bindgen]
pub struct Sim {
    swarm: Swarm,
    render: Vec<f32>,
}

#[wasm_bindgen]
impl Sim {
    #[wasm_bindgen(constructor)]
    pub fn new(count: usize, seed: u32) -> Result<Sim, JsValue> {
        Self::build(SwarmConfig::default(), count, seed)
    }

    /// Builds a sim from a JSON config; missing fields take their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(count: usize, seed: u32, config_json: &str) -> Result<Sim, JsValue> {
        let config = SwarmConfig::from_json(config_json).map_err(js_error)?;
        Self::build(config, count, seed)
    }

    /// Per-frame update with the latest 512-bin spectrum.
    pub fn update(&mut self, dt: f32, spectrum: &[f32]) {
        self.swarm.update(dt, spectrum);
        self.swarm.write_render_buffer(&mut self.render);
    }

    #[wasm_bindgen(js_name = fixedStep)]
    pub fn fixed_step(&mut self) {
        self.swarm.fixed_step();
        self.swarm.write_render_buffer(&mut self.render);
    }

    #[wasm_bindgen(js_name = setPointer)]
    pub fn set_pointer(&mut self, x: f32, y: f32, pressed: bool) {
        let mode = if pressed {
            PointerMode::Pressed
        } else {
            PointerMode::Idle
        };
        self.swarm.set_pointer(Some(PointerInput {
            position: Vec2::new(x, y),
            mode,
        }));
    }

    #[wasm_bindgen(js_name = clearPointer)]
    pub fn clear_pointer(&mut self) {
        self.swarm.set_pointer(None);
    }

    #[wasm_bindgen(js_name = setControlled)]
    pub fn set_controlled(&mut self, index: usize, controlled: bool) -> Result<(), JsValue> {
        let agent = self
            .swarm
            .agent_mut(index)
            .ok_or_else(|| js_error(format!("no agent at index {index}")))?;
        agent.controlled = controlled;
        Ok(())
    }

    /// Toggles separation, alignment, cohesion and collision for one agent.
    #[wasm_bindgen(js_name = setBehavior)]
    pub fn set_behavior(
        &mut self,
        index: usize,
        separation: bool,
        alignment: bool,
        cohesion: bool,
        collision: bool,
    ) -> Result<(), JsValue> {
        let agent = self
            .swarm
            .agent_mut(index)
            .ok_or_else(|| js_error(format!("no agent at index {index}")))?;
        agent.flags = BehaviorFlags {
            separation,
            alignment,
            cohesion,
            collision,
        };
        Ok(())
    }

    #[wasm_bindgen(js_name = addAgent)]
    pub fn add_agent(&mut self, x: f32, y: f32, rotation_deg: f32) -> usize {
        let index = self.swarm.add_agent(Agent::new(Vec2::new(x, y), rotation_deg));
        self.swarm.write_render_buffer(&mut self.render);
        index
    }

    #[wasm_bindgen(js_name = removeAgent)]
    pub fn remove_agent(&mut self, index: usize) -> bool {
        let removed = self.swarm.remove_agent(index).is_some();
        self.swarm.write_render_buffer(&mut self.render);
        removed
    }

    pub fn count(&self) -> usize {
        self.swarm.len()
    }

    #[wasm_bindgen(js_name = renderPtr)]
    pub fn render_ptr(&self) -> *const f32 {
        self.render.as_ptr()
    }

    #[wasm_bindgen(js_name = renderLen)]
    pub fn render_len(&self) -> usize {
        self.render.len()
    }

    /// `[bass, mid, high]` from the last update.
    #[wasm_bindgen(js_name = bandEnergies)]
    pub fn band_energies(&self) -> Vec<f32> {
        let bands = self.swarm.audio().bands;
        vec![bands.bass, bands.mid, bands.high]
    }

    /// Sensing-circle radius for the debug overlay.
    #[wasm_bindgen(js_name = nearestDistance)]
    pub fn nearest_distance(&self, index: usize) -> f32 {
        self.swarm
            .agent(index)
            .map_or(0.0, Agent::nearest_distance)
    }
}

impl Sim {
    fn build(config: SwarmConfig, count: usize, seed: u32) -> Result<Sim, JsValue> {
        let swarm = Swarm::new(config, count, u64::from(seed)).map_err(js_error)?;
        let mut sim = Sim {
            swarm,
            render: Vec::with_capacity(count * 3),
        };
        sim.swarm.write_render_buffer(&mut sim.render);
        Ok(sim)
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsError::new(&err.to_string()).into()
}

#[wasm_bindgen]
pub fn version() -> String {
    format!("audio-flock {}", env!("CARGO_PKG_VERSION"))
}
