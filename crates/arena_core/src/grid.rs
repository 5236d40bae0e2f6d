//! Tile occupancy grid: world/cell mapping, blocking queries, and
//! line-of-sight sampling.
//!
//! The grid is the single source of truth for "is this spot wall?". It
//! is rebuilt wholesale from the generated wall list once per map load
//! and is read-only during simulation. All out-of-bounds queries fail
//! closed: a cell outside the arena is blocked.

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, Vec2Fixed};

/// A grid cell address (column, row).
///
/// Signed so that any world point, including points outside the arena,
/// maps to a well-defined cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Column index.
    pub col: i32,
    /// Row index.
    pub row: i32,
}

impl Cell {
    /// Create a new cell address.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

/// Boolean occupancy grid over the arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupancyGrid {
    /// Grid width in cells.
    cols: u32,
    /// Grid height in cells.
    rows: u32,
    /// Size of each cell in world units.
    #[serde(with = "crate::math::fixed_serde")]
    tile_size: Fixed,
    /// Occupancy stored in row-major order.
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Create an empty grid covering a world of the given size.
    ///
    /// Grid dimensions are `ceil(world / tile_size)` per axis.
    ///
    /// # Panics
    ///
    /// Panics if any dimension or the tile size is zero.
    #[must_use]
    pub fn new(world_width: u32, world_height: u32, tile_size: u32) -> Self {
        assert!(world_width > 0, "OccupancyGrid world width must be positive");
        assert!(
            world_height > 0,
            "OccupancyGrid world height must be positive"
        );
        assert!(tile_size > 0, "OccupancyGrid tile size must be positive");

        let cols = world_width.div_ceil(tile_size);
        let rows = world_height.div_ceil(tile_size);
        Self {
            cols,
            rows,
            tile_size: Fixed::from_num(tile_size),
            cells: vec![false; (cols as usize) * (rows as usize)],
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cell size in world units.
    #[must_use]
    pub const fn tile_size(&self) -> Fixed {
        self.tile_size
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        (cell.row as usize) * (self.cols as usize) + (cell.col as usize)
    }

    /// Check if a cell lies within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && (cell.col as u32) < self.cols
            && (cell.row as u32) < self.rows
    }

    /// Check if a cell is blocked. Out-of-bounds cells are blocked.
    #[must_use]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        if !self.in_bounds(cell) {
            return true;
        }
        self.cells[self.index(cell)]
    }

    /// Check if the cell under a world point is blocked.
    #[must_use]
    pub fn is_blocked_world(&self, point: Vec2Fixed) -> bool {
        self.is_blocked(self.world_to_cell(point))
    }

    /// Map a world point to its containing cell (floor division).
    #[must_use]
    pub fn world_to_cell(&self, point: Vec2Fixed) -> Cell {
        Cell {
            col: (point.x / self.tile_size).floor().to_num::<i32>(),
            row: (point.y / self.tile_size).floor().to_num::<i32>(),
        }
    }

    /// Map a cell to the world position of its center.
    ///
    /// Exact inverse of [`world_to_cell`](Self::world_to_cell) up to
    /// cell granularity: `world_to_cell(cell_to_world(c)) == c`.
    #[must_use]
    pub fn cell_to_world(&self, cell: Cell) -> Vec2Fixed {
        let half = self.tile_size / Fixed::from_num(2);
        Vec2Fixed::new(
            Fixed::from_num(cell.col) * self.tile_size + half,
            Fixed::from_num(cell.row) * self.tile_size + half,
        )
    }

    /// Mark a cell occupied. Out-of-bounds cells are ignored.
    pub fn occupy(&mut self, cell: Cell) {
        if self.in_bounds(cell) {
            let index = self.index(cell);
            self.cells[index] = true;
        }
    }

    /// Mark a cell free. Out-of-bounds cells are ignored.
    pub fn vacate(&mut self, cell: Cell) {
        if self.in_bounds(cell) {
            let index = self.index(cell);
            self.cells[index] = false;
        }
    }

    /// Clear all occupancy.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Recompute occupancy from scratch from a list of occupied cells.
    ///
    /// O(cells); rebuilds happen once per map generation, so no
    /// incremental update path exists.
    pub fn rebuild<I>(&mut self, occupied: I)
    where
        I: IntoIterator<Item = Cell>,
    {
        self.clear();
        for cell in occupied {
            self.occupy(cell);
        }
    }

    /// Test straight-line visibility between two world points.
    ///
    /// Samples `max(|dcol|, |drow|) + 1` cells along the digital line
    /// between the two grid points; any blocked sample (including
    /// out-of-bounds samples) breaks the line. The degenerate
    /// zero-length case is visible.
    #[must_use]
    pub fn has_line_of_sight(&self, from: Vec2Fixed, to: Vec2Fixed) -> bool {
        let start = self.world_to_cell(from);
        let end = self.world_to_cell(to);

        let dcol = end.col - start.col;
        let drow = end.row - start.row;
        let steps = dcol.abs().max(drow.abs());

        for i in 0..=steps {
            let t = if steps == 0 {
                Fixed::ZERO
            } else {
                Fixed::from_num(i) / Fixed::from_num(steps)
            };
            let col = (Fixed::from_num(start.col) + Fixed::from_num(dcol) * t)
                .round()
                .to_num::<i32>();
            let row = (Fixed::from_num(start.row) + Fixed::from_num(drow) * t)
                .round()
                .to_num::<i32>();
            if self.is_blocked(Cell::new(col, row)) {
                return false;
            }
        }
        true
    }

    /// Find the nearest free cell to the given cell, searching outward
    /// ring by ring.
    ///
    /// Returns the cell itself when it is already free, `None` when the
    /// whole grid is blocked.
    #[must_use]
    pub fn nearest_free_cell(&self, cell: Cell) -> Option<Cell> {
        if !self.is_blocked(cell) {
            return Some(cell);
        }

        let max_radius = self.cols.max(self.rows) as i32;
        for radius in 1..=max_radius {
            for dcol in -radius..=radius {
                for drow in -radius..=radius {
                    if dcol.abs() != radius && drow.abs() != radius {
                        continue;
                    }
                    let candidate = Cell::new(cell.col + dcol, cell.row + drow);
                    if self.in_bounds(candidate) && !self.is_blocked(candidate) {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }
}
