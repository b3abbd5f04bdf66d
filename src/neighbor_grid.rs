use glam::Vec2;

const MIN_BOUND: f32 = 1.0e-6;
const MIN_CELL_SIZE: f32 = 1.0e-6;
const INVALID_INDEX: usize = usize::MAX;

/// Uniform bucket grid over a domain centred on the origin. Positions outside
/// the domain are clamped into the edge cells, so agents sitting past the
/// boundary during a teleport cooldown are still found.
pub struct NeighborGrid {
    cell_size: f32,
    half_width: f32,
    half_height: f32,
    cols: usize,
    rows: usize,
    agent_count: usize,
    head: Vec<usize>,
    next: Vec<usize>,
    cached: Vec<Vec2>,
}

impl NeighborGrid {
    pub fn new(count: usize, half_width: f32, half_height: f32, cell_size: f32) -> Self {
        let mut grid = Self {
            cell_size: cell_size.max(MIN_CELL_SIZE),
            half_width: half_width.max(MIN_BOUND),
            half_height: half_height.max(MIN_BOUND),
            cols: 0,
            rows: 0,
            agent_count: 0,
            head: Vec::new(),
            next: Vec::new(),
            cached: Vec::new(),
        };

        grid.ensure_layout(count, grid.half_width, grid.half_height);
        grid
    }

    pub fn rebuild<I>(&mut self, positions: I, half_width: f32, half_height: f32)
    where
        I: ExactSizeIterator<Item = Vec2>,
    {
        let count = positions.len();
        self.ensure_layout(count, half_width, half_height);
        self.head.fill(INVALID_INDEX);

        for (i, position) in positions.enumerate() {
            self.cached[i] = position;
            let cell = self.cell_index_for_position(position);
            self.next[i] = self.head[cell];
            self.head[cell] = i;
        }
    }

    /// Calls `callback(j)` for every agent `j != i` within `radius` of agent `i`.
    pub fn for_each_neighbor<F>(&self, i: usize, radius: f32, mut callback: F)
    where
        F: FnMut(usize),
    {
        if i >= self.agent_count {
            return;
        }

        let radius = radius.max(0.0);
        let radius_sq = radius * radius;
        let cell_radius = (radius / self.cell_size).ceil() as isize;

        let origin = self.cached[i];
        let base_cell_x = self.cell_x(origin.x);
        let base_cell_y = self.cell_y(origin.y);

        let min_y = (base_cell_y - cell_radius).max(0);
        let max_y = (base_cell_y + cell_radius).min(self.rows as isize - 1);
        let min_x = (base_cell_x - cell_radius).max(0);
        let max_x = (base_cell_x + cell_radius).min(self.cols as isize - 1);

        for cell_y in min_y..=max_y {
            for cell_x in min_x..=max_x {
                self.scan_cell(
                    cell_x as usize,
                    cell_y as usize,
                    i,
                    origin,
                    radius_sq,
                    &mut callback,
                );
            }
        }
    }

    fn ensure_layout(&mut self, count: usize, half_width: f32, half_height: f32) {
        self.half_width = half_width.max(MIN_BOUND);
        self.half_height = half_height.max(MIN_BOUND);
        self.agent_count = count;

        let cols = ((2.0 * self.half_width / self.cell_size).ceil() as usize).max(1);
        let rows = ((2.0 * self.half_height / self.cell_size).ceil() as usize).max(1);
        let grid_size = cols * rows;

        if cols != self.cols || rows != self.rows {
            self.cols = cols;
            self.rows = rows;
            self.head.resize(grid_size, INVALID_INDEX);
        }

        if self.next.len() != count {
            self.next.resize(count, INVALID_INDEX);
            self.cached.resize(count, Vec2::ZERO);
        }
    }

    fn cell_index_for_position(&self, position: Vec2) -> usize {
        self.cell_y(position.y) as usize * self.cols + self.cell_x(position.x) as usize
    }

    fn cell_x(&self, x: f32) -> isize {
        (((x + self.half_width) / self.cell_size).floor() as isize).clamp(0, self.cols as isize - 1)
    }

    fn cell_y(&self, y: f32) -> isize {
        (((y + self.half_height) / self.cell_size).floor() as isize)
            .clamp(0, self.rows as isize - 1)
    }

    fn scan_cell<F>(
        &self,
        cell_x: usize,
        cell_y: usize,
        i: usize,
        origin: Vec2,
        radius_sq: f32,
        callback: &mut F,
    ) where
        F: FnMut(usize),
    {
        let cell_index = cell_y * self.cols + cell_x;
        let mut candidate = self.head[cell_index];

        while candidate != INVALID_INDEX {
            if candidate != i && self.cached[candidate].distance_squared(origin) <= radius_sq {
                callback(candidate);
            }

            candidate = self.next[candidate];
        }
    }
}
