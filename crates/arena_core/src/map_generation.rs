//! Procedural arena generation: seeded wall placement with density,
//! locality, and sight-line constraints.
//!
//! Generation is a three-phase pipeline with no backtracking across
//! phases:
//!
//! 1. **Placement** - randomly sampled short wall segments, rejected on
//!    overlap, bounds, or spawn proximity, until a target occupied-cell
//!    density is reached or the attempt budget runs out.
//! 2. **Density repair** - fixed-size world regions may not hold more
//!    than a configured number of occupied cells; offending segments
//!    are removed whole, in generation order.
//! 3. **Sight-line elimination** - any spawn pair that can still see
//!    each other in a straight line gets one short blocking segment
//!    near the midpoint.
//!
//! A defect found in phase N is only ever fixed by editing phase N's
//! output, never by regenerating phase N-1. Under-dense results are
//! accepted and logged, never fatal.

use serde::{Deserialize, Serialize};

use crate::ballistics::Obstacle;
use crate::error::{ArenaError, Result};
use crate::grid::{Cell, OccupancyGrid};
use crate::math::{Fixed, Vec2Fixed};
use crate::rng::SeededPrng;

/// Rays cast per spawn point for the coverage estimate.
const COVERAGE_RAY_COUNT: u32 = 24;

/// Maximum reflective bounces per coverage ray.
const COVERAGE_MAX_BOUNCES: u32 = 4;

/// Steps advanced per ray leg, in half-cell increments.
const COVERAGE_STEPS_PER_LEG: u32 = 20;

/// Attempts to place one sight-line blocking segment before giving up.
const BLOCKING_WALL_ATTEMPTS: u32 = 24;

/// Wall segment orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Cells run along +x.
    Horizontal,
    /// Cells run along +y.
    Vertical,
}

/// A contiguous straight run of occupied cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallSegment {
    /// Top-left cell of the run.
    pub origin: Cell,
    /// Run length in cells (>= 1).
    pub length: u32,
    /// Run direction.
    pub orientation: Orientation,
}

impl WallSegment {
    /// Iterate the cells this segment covers.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let origin = self.origin;
        let orientation = self.orientation;
        (0..self.length as i32).map(move |i| match orientation {
            Orientation::Horizontal => Cell::new(origin.col + i, origin.row),
            Orientation::Vertical => Cell::new(origin.col, origin.row + i),
        })
    }
}

/// Arena generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapGenConfig {
    /// World width in world units.
    pub width: u32,
    /// World height in world units.
    pub height: u32,
    /// Cell size in world units.
    pub tile_size: u32,
    /// Target fraction of cells occupied by walls (0.0 = open).
    pub target_wall_density: f32,
    /// Shortest segment sampled during placement, in cells.
    pub min_segment_cells: u32,
    /// Longest segment sampled during placement, in cells.
    pub max_segment_cells: u32,
    /// Density-repair region edge length in world units.
    pub region_size: u32,
    /// Maximum occupied cells allowed per region.
    pub max_cells_per_region: u32,
    /// Entity spawn points in world space.
    pub spawn_points: Vec<Vec2Fixed>,
    /// Minimum cell distance between a segment origin and any spawn.
    pub spawn_margin_cells: u32,
    /// Placement attempt budget.
    pub max_placement_attempts: u32,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            tile_size: 32,
            target_wall_density: 0.10,
            min_segment_cells: 2,
            max_segment_cells: 5,
            region_size: 64,
            max_cells_per_region: 8,
            spawn_points: default_spawn_points(800, 600),
            spawn_margin_cells: 3,
            max_placement_attempts: 300,
        }
    }
}

impl MapGenConfig {
    /// Create a small arena (512x384 world units).
    #[must_use]
    pub fn small() -> Self {
        Self {
            width: 512,
            height: 384,
            spawn_points: default_spawn_points(512, 384),
            ..Default::default()
        }
    }

    /// Create a medium arena (800x600 world units).
    #[must_use]
    pub fn medium() -> Self {
        Self::default()
    }

    /// Create a large arena (1024x768 world units).
    #[must_use]
    pub fn large() -> Self {
        Self {
            width: 1024,
            height: 768,
            spawn_points: default_spawn_points(1024, 768),
            ..Default::default()
        }
    }

    /// Set the target wall density.
    #[must_use]
    pub fn with_density(mut self, density: f32) -> Self {
        self.target_wall_density = density.clamp(0.0, 1.0);
        self
    }

    /// Replace the spawn point set.
    #[must_use]
    pub fn with_spawn_points(mut self, spawn_points: Vec<Vec2Fixed>) -> Self {
        self.spawn_points = spawn_points;
        self
    }

    /// Check the configuration for unusable values.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ArenaError::InvalidConfig(
                "world dimensions must be positive".into(),
            ));
        }
        if self.tile_size == 0 {
            return Err(ArenaError::InvalidConfig("tile size must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.target_wall_density) {
            return Err(ArenaError::InvalidConfig(format!(
                "wall density {} outside [0, 1]",
                self.target_wall_density
            )));
        }
        if self.min_segment_cells == 0 || self.min_segment_cells > self.max_segment_cells {
            return Err(ArenaError::InvalidConfig(
                "segment length range must satisfy 1 <= min <= max".into(),
            ));
        }
        if self.region_size == 0 {
            return Err(ArenaError::InvalidConfig("region size must be positive".into()));
        }
        if self.spawn_points.is_empty() {
            return Err(ArenaError::InvalidConfig(
                "at least one spawn point is required".into(),
            ));
        }
        Ok(())
    }
}

/// Four spawn points inset 100 world units from the arena corners.
#[must_use]
pub fn default_spawn_points(width: u32, height: u32) -> Vec<Vec2Fixed> {
    let inset = Fixed::from_num(100);
    let w = Fixed::from_num(width);
    let h = Fixed::from_num(height);
    vec![
        Vec2Fixed::new(inset, inset),
        Vec2Fixed::new(w - inset, inset),
        Vec2Fixed::new(inset, h - inset),
        Vec2Fixed::new(w - inset, h - inset),
    ]
}

/// A generated arena layout: the accepted wall list plus the seed that
/// produced it.
///
/// The seed is reported even when none was supplied, so any run can be
/// reproduced after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArena {
    /// Configuration used.
    pub config: MapGenConfig,
    /// Accepted wall segments.
    pub walls: Vec<WallSegment>,
    /// Seed actually used.
    pub seed: u64,
}

impl GeneratedArena {
    /// Total occupied cells across all wall segments.
    #[must_use]
    pub fn occupied_cell_count(&self) -> u32 {
        self.walls.iter().map(|w| w.length).sum()
    }

    /// Build the occupancy grid for this layout.
    #[must_use]
    pub fn build_grid(&self) -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(self.config.width, self.config.height, self.config.tile_size);
        grid.rebuild(self.walls.iter().flat_map(WallSegment::cells));
        grid
    }

    /// Derive the world-space obstacle rectangles, one per wall cell.
    ///
    /// Computed once per generation; the caller owns the result.
    #[must_use]
    pub fn obstacles(&self) -> Vec<Obstacle> {
        let tile = Fixed::from_num(self.config.tile_size);
        let half = tile / Fixed::from_num(2);
        self.walls
            .iter()
            .flat_map(WallSegment::cells)
            .map(|cell| {
                let center = Vec2Fixed::new(
                    Fixed::from_num(cell.col) * tile + half,
                    Fixed::from_num(cell.row) * tile + half,
                );
                Obstacle::new(center, tile, tile)
            })
            .collect()
    }
}

/// Generate an arena layout.
///
/// When `seed` is `None` a seed is drawn from the system clock; either
/// way the seed used is reported in the result.
///
/// # Errors
///
/// Returns [`ArenaError::InvalidConfig`] when the configuration fails
/// [`MapGenConfig::validate`]. Budget exhaustion is not an error: the
/// partial, under-dense layout is accepted and a warning is logged.
pub fn generate_arena(config: MapGenConfig, seed: Option<u64>) -> Result<GeneratedArena> {
    config.validate()?;

    let rng = seed.map_or_else(SeededPrng::from_entropy, SeededPrng::new);
    let seed_used = rng.seed();
    tracing::info!(seed = seed_used, "generating arena layout");

    let mut generator = Generator::new(&config, rng);
    generator.place_wall_segments();
    generator.enforce_region_density();
    generator.eliminate_sight_lines();

    tracing::info!(
        segments = generator.walls.len(),
        cells = generator.walls.iter().map(|w| w.length).sum::<u32>(),
        "arena layout complete"
    );

    let walls = generator.walls;
    Ok(GeneratedArena {
        config,
        walls,
        seed: seed_used,
    })
}

/// Working state for one generation run.
struct Generator<'a> {
    config: &'a MapGenConfig,
    rng: SeededPrng,
    grid: OccupancyGrid,
    walls: Vec<WallSegment>,
    spawn_cells: Vec<Cell>,
}

impl<'a> Generator<'a> {
    fn new(config: &'a MapGenConfig, rng: SeededPrng) -> Self {
        let grid = OccupancyGrid::new(config.width, config.height, config.tile_size);
        let spawn_cells = config
            .spawn_points
            .iter()
            .map(|p| grid.world_to_cell(*p))
            .collect();
        Self {
            config,
            rng,
            grid,
            walls: Vec::new(),
            spawn_cells,
        }
    }

    fn random_orientation(&mut self) -> Orientation {
        if self.rng.next_int(0, 2) == 0 {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    fn too_close_to_spawn(&self, origin: Cell) -> bool {
        let margin_sq = i64::from(self.config.spawn_margin_cells).pow(2);
        self.spawn_cells.iter().any(|spawn| {
            let dc = i64::from(origin.col - spawn.col);
            let dr = i64::from(origin.row - spawn.row);
            dc * dc + dr * dr < margin_sq
        })
    }

    fn overlaps(&self, segment: &WallSegment) -> bool {
        // Out-of-bounds cells read as blocked, so this also rejects
        // segments whose tail leaves the grid.
        segment.cells().any(|c| self.grid.is_blocked(c))
    }

    fn commit(&mut self, segment: WallSegment) {
        for cell in segment.cells() {
            self.grid.occupy(cell);
        }
        self.walls.push(segment);
    }

    /// Phase 1: random short segments until density target or budget.
    fn place_wall_segments(&mut self) {
        let target = (self.grid.cell_count() as f32 * self.config.target_wall_density).floor() as u32;
        let mut placed = 0u32;
        let mut attempts = 0u32;

        while placed < target && attempts < self.config.max_placement_attempts {
            attempts += 1;

            let orientation = self.random_orientation();
            let length = self.rng.next_int(
                self.config.min_segment_cells as i32,
                self.config.max_segment_cells as i32 + 1,
            ) as u32;

            let (col_span, row_span) = match orientation {
                Orientation::Horizontal => (length as i32, 1),
                Orientation::Vertical => (1, length as i32),
            };
            let max_col = self.grid.cols() as i32 - col_span - 2;
            let max_row = self.grid.rows() as i32 - row_span - 2;
            if max_col <= 0 || max_row <= 0 {
                continue;
            }

            let origin = Cell::new(self.rng.next_int(1, max_col), self.rng.next_int(1, max_row));
            let segment = WallSegment {
                origin,
                length,
                orientation,
            };

            if self.too_close_to_spawn(origin) || self.overlaps(&segment) {
                continue;
            }

            self.commit(segment);
            placed += length;
        }

        tracing::debug!(
            segments = self.walls.len(),
            cells = placed,
            attempts,
            "placement phase complete"
        );
        if placed < target {
            tracing::warn!(
                placed,
                target,
                "placement budget exhausted; accepting under-dense arena"
            );
        }
    }

    fn region_index(&self, cell: Cell, regions_per_row: u32) -> usize {
        let rx = (cell.col as u32 * self.config.tile_size) / self.config.region_size;
        let ry = (cell.row as u32 * self.config.tile_size) / self.config.region_size;
        (ry * regions_per_row + rx) as usize
    }

    /// Phase 2: remove whole segments, in generation order, from any
    /// region holding more occupied cells than allowed.
    fn enforce_region_density(&mut self) {
        let regions_per_row = self.config.width.div_ceil(self.config.region_size);
        let regions_per_col = self.config.height.div_ceil(self.config.region_size);
        let mut counts = vec![0u32; (regions_per_row * regions_per_col) as usize];

        for wall in &self.walls {
            for cell in wall.cells() {
                counts[self.region_index(cell, regions_per_row)] += 1;
            }
        }

        let mut removed = 0usize;
        let walls = std::mem::take(&mut self.walls);
        for wall in walls {
            let over = wall
                .cells()
                .any(|c| counts[self.region_index(c, regions_per_row)] > self.config.max_cells_per_region);
            if over {
                for cell in wall.cells() {
                    counts[self.region_index(cell, regions_per_row)] -= 1;
                    self.grid.vacate(cell);
                }
                removed += 1;
            } else {
                self.walls.push(wall);
            }
        }

        tracing::debug!(removed, "density repair complete");
    }

    /// Phase 3: break direct spawn-to-spawn fire lanes.
    fn eliminate_sight_lines(&mut self) {
        let spawns = self.config.spawn_points.clone();
        let mut added = 0usize;

        for i in 0..spawns.len() {
            for j in (i + 1)..spawns.len() {
                if !self.grid.has_line_of_sight(spawns[i], spawns[j]) {
                    continue;
                }
                if self.insert_blocking_wall(spawns[i], spawns[j]) {
                    added += 1;
                } else {
                    tracing::warn!(
                        from = i,
                        to = j,
                        "could not break spawn sight line within attempt budget"
                    );
                }
            }
        }

        tracing::debug!(added, "sight-line elimination complete");
    }

    /// Commit one short segment near the midpoint of a clear fire lane.
    ///
    /// Candidates carry bounded random jitter and must not collide with
    /// existing geometry; a candidate is only kept when it actually
    /// breaks the line.
    fn insert_blocking_wall(&mut self, from: Vec2Fixed, to: Vec2Fixed) -> bool {
        let a = self.grid.world_to_cell(from);
        let b = self.grid.world_to_cell(to);
        let mid = Cell::new((a.col + b.col) / 2, (a.row + b.row) / 2);

        for _ in 0..BLOCKING_WALL_ATTEMPTS {
            let origin = Cell::new(
                mid.col + self.rng.next_int(-2, 3),
                mid.row + self.rng.next_int(-2, 3),
            );
            let segment = WallSegment {
                origin,
                length: self.rng.next_int(2, 4) as u32,
                orientation: self.random_orientation(),
            };

            if !self.grid.in_bounds(origin) || self.overlaps(&segment) {
                continue;
            }

            for cell in segment.cells() {
                self.grid.occupy(cell);
            }
            if self.grid.has_line_of_sight(from, to) {
                // Committed cells did not cut the lane; roll them back.
                for cell in segment.cells() {
                    self.grid.vacate(cell);
                }
                continue;
            }

            self.walls.push(segment);
            return true;
        }
        false
    }
}

/// Informational ricochet coverage report.
///
/// Diagnostic only: reported fractions never gate generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Visited-cell fraction per spawn point.
    pub by_spawn: Vec<f32>,
    /// Mean fraction across spawns.
    pub average: f32,
}

/// Estimate how much of the arena is reachable by ricochet fire from
/// each spawn point.
///
/// Casts a fixed fan of rays from each spawn, bouncing off occupied
/// cells up to a bounce limit, and reports the fraction of cells the
/// rays visited.
#[must_use]
pub fn estimate_coverage(grid: &OccupancyGrid, spawn_points: &[Vec2Fixed]) -> CoverageReport {
    let mut by_spawn = Vec::with_capacity(spawn_points.len());

    for spawn in spawn_points {
        let mut covered = std::collections::HashSet::new();
        let start = grid.world_to_cell(*spawn);
        for ray in 0..COVERAGE_RAY_COUNT {
            let angle = (ray as f32 / COVERAGE_RAY_COUNT as f32) * std::f32::consts::TAU;
            trace_coverage_ray(grid, start, angle, &mut covered);
        }
        by_spawn.push(covered.len() as f32 / grid.cell_count() as f32);
    }

    let average = if by_spawn.is_empty() {
        0.0
    } else {
        by_spawn.iter().sum::<f32>() / by_spawn.len() as f32
    };
    CoverageReport { by_spawn, average }
}

/// March one ray through cell space, reflecting off occupied cells.
fn trace_coverage_ray(
    grid: &OccupancyGrid,
    start: Cell,
    initial_angle: f32,
    covered: &mut std::collections::HashSet<Cell>,
) {
    let mut x = start.col as f32;
    let mut y = start.row as f32;
    let mut angle = initial_angle;
    let mut bounces = 0;

    while bounces < COVERAGE_MAX_BOUNCES {
        let (vx, vy) = (angle.cos(), angle.sin());

        for _ in 0..COVERAGE_STEPS_PER_LEG {
            x += vx * 0.5;
            y += vy * 0.5;

            let cell = Cell::new(x.floor() as i32, y.floor() as i32);
            if !grid.in_bounds(cell) {
                return;
            }
            covered.insert(cell);

            if grid.is_blocked(cell) {
                let (nx, ny) = coverage_normal(grid, cell);
                let dot = vx * nx + vy * ny;
                let rx = vx - 2.0 * dot * nx;
                let ry = vy - 2.0 * dot * ny;
                angle = ry.atan2(rx);
                bounces += 1;
                break;
            }
        }
    }
}

/// Approximate surface normal of a blocked cell from its neighbors.
fn coverage_normal(grid: &OccupancyGrid, cell: Cell) -> (f32, f32) {
    let above = grid.is_blocked(Cell::new(cell.col, cell.row - 1));
    let below = grid.is_blocked(Cell::new(cell.col, cell.row + 1));
    let left = grid.is_blocked(Cell::new(cell.col - 1, cell.row));
    let right = grid.is_blocked(Cell::new(cell.col + 1, cell.row));

    if above && !below {
        (0.0, 1.0)
    } else if below && !above {
        (0.0, -1.0)
    } else if left && !right {
        (1.0, 0.0)
    } else if right && !left {
        (-1.0, 0.0)
    } else {
        (0.0, 1.0)
    }
}
