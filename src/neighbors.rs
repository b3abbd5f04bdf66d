use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SwarmConfig;
use crate::math::{self, MathMode};
use crate::neighbor_grid::NeighborGrid;

/// How the scan finds agents inside the sensing radius. Both strategies
/// produce the same result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborQuery {
    #[default]
    AllPairs,
    Grid,
}

/// Read-only view of one agent as seen by the others during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AgentView {
    pub position: Vec2,
    pub heading: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    pub index: usize,
    pub position: Vec2,
    pub distance: f32,
}

/// Steering accumulators for one agent, each unit length or zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NeighborScan {
    pub away: Vec2,
    pub with: Vec2,
    pub toward: Vec2,
    pub nearest: Option<Nearest>,
    pub neighbors_in_radius: usize,
}

impl NeighborScan {
    /// Distance to the nearest other agent, or 0 when the agent is alone.
    pub fn nearest_distance(&self) -> f32 {
        self.nearest.map_or(0.0, |nearest| nearest.distance)
    }
}

struct Accumulator {
    origin: Vec2,
    radius: f32,
    mode: MathMode,
    away: Vec2,
    with: Vec2,
    toward: Vec2,
    count: usize,
    nearest: Option<Nearest>,
}

impl Accumulator {
    fn new(origin: Vec2, radius: f32, mode: MathMode) -> Self {
        Self {
            origin,
            radius,
            mode,
            away: Vec2::ZERO,
            with: Vec2::ZERO,
            toward: Vec2::ZERO,
            count: 0,
            nearest: None,
        }
    }

    fn accumulate(&mut self, other: &AgentView) {
        let to_other = other.position - self.origin;
        let distance = to_other.length();

        self.away += to_other * (self.radius - distance);
        self.with += other.heading;
        self.toward += math::normalize_or_zero(self.mode, -to_other);
        self.count += 1;
    }

    fn consider_nearest(&mut self, index: usize, other: &AgentView) {
        // Coincident agents have no direction and are never the nearest.
        if other.position == self.origin {
            return;
        }

        let distance = other.position.distance(self.origin);
        let closer = match self.nearest {
            None => true,
            Some(best) => {
                distance < best.distance || (distance == best.distance && index < best.index)
            }
        };
        if closer {
            self.nearest = Some(Nearest {
                index,
                position: other.position,
                distance,
            });
        }
    }

    fn finish(self) -> NeighborScan {
        NeighborScan {
            away: math::normalize_or_zero(self.mode, self.away),
            with: math::normalize_or_zero(self.mode, self.with),
            toward: math::normalize_or_zero(self.mode, self.toward),
            nearest: self.nearest,
            neighbors_in_radius: self.count,
        }
    }
}

/// Scans every other agent in `agents`. `index` identifies the scanning agent
/// and `origin` is its current position.
pub fn scan_all_pairs(
    index: usize,
    origin: Vec2,
    agents: &[AgentView],
    radius: f32,
    mode: MathMode,
) -> NeighborScan {
    let radius_sq = radius * radius;
    let mut acc = Accumulator::new(origin, radius, mode);

    for (j, other) in agents.iter().enumerate() {
        if j == index {
            continue;
        }
        if other.position.distance_squared(origin) <= radius_sq {
            acc.accumulate(other);
        }
        acc.consider_nearest(j, other);
    }

    acc.finish()
}

// Cells never shrink below 1/128 of the larger half-extent, which bounds the
// bucket count for tiny sensing radii.
fn grid_cell_size(config: &SwarmConfig) -> f32 {
    let floor = config.x_perimeter.max(config.y_perimeter) / 128.0;
    config.sensing_radius.max(floor)
}

/// Per-swarm scan strategy. The grid is rebuilt once per frame from the
/// snapshot before any agent scans.
pub struct NeighborScanner {
    radius: f32,
    mode: MathMode,
    grid: Option<NeighborGrid>,
}

impl NeighborScanner {
    pub fn new(config: &SwarmConfig) -> Self {
        let grid = match config.neighbor_query {
            NeighborQuery::AllPairs => None,
            NeighborQuery::Grid => Some(NeighborGrid::new(
                0,
                config.x_perimeter,
                config.y_perimeter,
                grid_cell_size(config),
            )),
        };
        Self {
            radius: config.sensing_radius,
            mode: config.math_mode,
            grid,
        }
    }

    pub fn prepare(&mut self, agents: &[AgentView], half_width: f32, half_height: f32) {
        if let Some(grid) = self.grid.as_mut() {
            grid.rebuild(
                agents.iter().map(|agent| agent.position),
                half_width,
                half_height,
            );
        }
    }

    /// `agents[index].position` must equal the position the grid was prepared with.
    pub fn scan(&self, index: usize, agents: &[AgentView]) -> NeighborScan {
        let Some(origin) = agents.get(index).map(|agent| agent.position) else {
            return NeighborScan::default();
        };

        let Some(grid) = self.grid.as_ref() else {
            return scan_all_pairs(index, origin, agents, self.radius, self.mode);
        };

        let mut acc = Accumulator::new(origin, self.radius, self.mode);
        let mut in_radius = Vec::new();
        grid.for_each_neighbor(index, self.radius, |j| in_radius.push(j));
        // Summation order must match the all-pairs scan for identical results.
        in_radius.sort_unstable();

        for &j in &in_radius {
            acc.accumulate(&agents[j]);
            acc.consider_nearest(j, &agents[j]);
        }

        // Anything inside the radius is closer than anything outside it, so
        // the linear fallback only runs when the neighborhood is empty.
        if acc.nearest.is_none() {
            for (j, other) in agents.iter().enumerate() {
                if j != index {
                    acc.consider_nearest(j, other);
                }
            }
        }

        acc.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{scan_all_pairs, AgentView, NeighborQuery, NeighborScanner};
    use crate::config::SwarmConfig;
    use crate::math::MathMode;
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn view(x: f32, y: f32) -> AgentView {
        AgentView {
            position: Vec2::new(x, y),
            heading: Vec2::ZERO,
        }
    }

    fn scan(agents: &[AgentView], index: usize) -> super::NeighborScan {
        scan_all_pairs(
            index,
            agents[index].position,
            agents,
            3.0,
            MathMode::Accurate,
        )
    }

    #[test]
    fn solo_agent_has_no_nearest_and_zero_vectors() {
        let agents = [view(1.0, 1.0)];
        let result = scan(&agents, 0);
        assert!(result.nearest.is_none());
        assert_eq!(result.nearest_distance(), 0.0);
        assert_eq!(result.away, Vec2::ZERO);
        assert_eq!(result.with, Vec2::ZERO);
        assert_eq!(result.toward, Vec2::ZERO);
    }

    #[test]
    fn accumulators_point_the_expected_way() {
        let mut agents = [view(0.0, 0.0), view(1.0, 0.0)];
        agents[1].heading = Vec2::new(0.0, 2.0);
        let result = scan(&agents, 0);

        assert!((result.away - Vec2::X).length() < 1.0e-6);
        assert!((result.toward - Vec2::NEG_X).length() < 1.0e-6);
        assert!((result.with - Vec2::Y).length() < 1.0e-6);
        assert_eq!(result.neighbors_in_radius, 1);
    }

    #[test]
    fn closer_neighbors_dominate_away_vector() {
        let agents = [view(0.0, 0.0), view(0.5, 0.0), view(0.0, 2.8)];
        let result = scan(&agents, 0);
        // (0.5, 0) * 2.5 versus (0, 2.8) * 0.2
        assert!(result.away.x > result.away.y);
        assert!((result.away.length() - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn agents_outside_radius_only_count_as_nearest() {
        let agents = [view(0.0, 0.0), view(10.0, 0.0)];
        let result = scan(&agents, 0);
        assert_eq!(result.neighbors_in_radius, 0);
        assert_eq!(result.away, Vec2::ZERO);
        let nearest = result.nearest.expect("far agent is still the nearest");
        assert_eq!(nearest.index, 1);
        assert!((nearest.distance - 10.0).abs() < 1.0e-6);
    }

    #[test]
    fn coincident_agents_are_excluded_from_nearest() {
        let mut agents = [view(1.0, 1.0), view(1.0, 1.0), view(1.0, 2.0)];
        agents[1].heading = Vec2::X;
        let result = scan(&agents, 0);

        let nearest = result.nearest.expect("non-coincident neighbor exists");
        assert_eq!(nearest.index, 2);
        assert!(result.away.is_finite());
        assert!(result.toward.is_finite());
        // The coincident agent still contributes its heading.
        assert!(result.with.x > 0.0);
    }

    #[test]
    fn grid_and_all_pairs_scans_agree() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let agents: Vec<AgentView> = (0..120)
            .map(|_| AgentView {
                position: Vec2::new(rng.random_range(-15.0..15.0), rng.random_range(-9.0..9.0)),
                heading: Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)),
            })
            .collect();

        let config = SwarmConfig {
            neighbor_query: NeighborQuery::Grid,
            ..SwarmConfig::default()
        };
        let mut scanner = NeighborScanner::new(&config);
        scanner.prepare(&agents, config.x_perimeter, config.y_perimeter);

        for index in 0..agents.len() {
            let expected = scan(&agents, index);
            let actual = scanner.scan(index, &agents);
            assert_eq!(actual.neighbors_in_radius, expected.neighbors_in_radius);
            assert_eq!(
                actual.nearest.map(|n| n.index),
                expected.nearest.map(|n| n.index)
            );
            assert!((actual.away - expected.away).length() < 1.0e-4);
            assert!((actual.with - expected.with).length() < 1.0e-4);
            assert!((actual.toward - expected.toward).length() < 1.0e-4);
        }
    }

    #[test]
    fn grid_falls_back_to_linear_nearest_search() {
        let agents = [view(-12.0, 0.0), view(12.0, 0.0)];
        let config = SwarmConfig {
            neighbor_query: NeighborQuery::Grid,
            ..SwarmConfig::default()
        };
        let mut scanner = NeighborScanner::new(&config);
        scanner.prepare(&agents, config.x_perimeter, config.y_perimeter);

        let result = scanner.scan(0, &agents);
        assert_eq!(result.nearest.map(|n| n.index), Some(1));
        assert!((result.nearest_distance() - 24.0).abs() < 1.0e-5);
    }
}
