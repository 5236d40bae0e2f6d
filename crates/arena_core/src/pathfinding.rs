//! Grid-based pathfinding using the A* algorithm.
//!
//! Routes run over 8-connected cells with Euclidean edge costs (1 for
//! axis moves, √2 for diagonals) and a Euclidean heuristic, which is
//! admissible and consistent for this metric. Searches are synchronous
//! and complete within one call; there is no resumable state.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::grid::{Cell, OccupancyGrid};
use crate::math::{fixed_sqrt, Fixed, Vec2Fixed, SQRT_2};

/// Defensive cap on node expansions, as a multiple of the grid size.
///
/// Bounded arenas keep worst-case searches tractable, but a capped
/// search degrades to "no path" instead of stalling the tick.
const EXPANSION_LIMIT_FACTOR: usize = 4;

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    /// Grid cell.
    cell: Cell,
    /// f_score = g_score + heuristic.
    f_score: Fixed,
    /// Tie-breaker for determinism: lower coordinates first.
    /// This ensures consistent ordering when f_scores are equal.
    tie_breaker: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so we reverse the comparison for min-heap behavior.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Direction offsets for 8-directional movement.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),   // East
    (1, 1),   // Southeast
    (0, 1),   // South
    (-1, 1),  // Southwest
    (-1, 0),  // West
    (-1, -1), // Northwest
    (0, -1),  // North
    (1, -1),  // Northeast
];

/// Euclidean distance between two cells, in cell units.
#[inline]
fn euclidean_heuristic(a: Cell, b: Cell) -> Fixed {
    let dc = i64::from(a.col - b.col);
    let dr = i64::from(a.row - b.row);
    fixed_sqrt(Fixed::from_num(dc * dc + dr * dr))
}

/// Check if a diagonal move is valid (no corner cutting through blocked cells).
#[inline]
fn is_diagonal_valid(grid: &OccupancyGrid, from: Cell, dc: i32, dr: i32) -> bool {
    if dc != 0 && dr != 0 {
        !grid.is_blocked(Cell::new(from.col + dc, from.row))
            && !grid.is_blocked(Cell::new(from.col, from.row + dr))
    } else {
        true
    }
}

/// Convert a cell to a tie-breaker value for deterministic ordering.
#[inline]
fn cell_tie_breaker(cell: Cell) -> u64 {
    ((cell.row as u32 as u64) << 32) | (cell.col as u32 as u64)
}

/// Find the cheapest route between two cells.
///
/// Returns `None` without searching when either endpoint is out of
/// bounds or blocked, and after an exhausted search when no route
/// exists. The returned route starts at `start` and ends at `goal`,
/// with every consecutive pair 8-connected.
#[must_use]
pub fn find_path(grid: &OccupancyGrid, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
    if grid.is_blocked(start) || grid.is_blocked(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_score: HashMap<Cell, Fixed> = HashMap::new();

    g_score.insert(start, Fixed::ZERO);
    open_set.push(AStarNode {
        cell: start,
        f_score: euclidean_heuristic(start, goal),
        tie_breaker: cell_tie_breaker(start),
    });

    let expansion_limit = grid.cell_count() * EXPANSION_LIMIT_FACTOR;
    let mut expansions = 0usize;

    while let Some(current) = open_set.pop() {
        if current.cell == goal {
            return Some(reconstruct_path(&came_from, goal));
        }

        expansions += 1;
        if expansions > expansion_limit {
            tracing::debug!(?start, ?goal, expansions, "pathfinding expansion cap hit");
            return None;
        }

        let current_g = g_score.get(&current.cell).copied().unwrap_or(Fixed::MAX);

        for &(dc, dr) in &DIRECTIONS {
            let neighbor = Cell::new(current.cell.col + dc, current.cell.row + dr);

            if grid.is_blocked(neighbor) {
                continue;
            }
            if !is_diagonal_valid(grid, current.cell, dc, dr) {
                continue;
            }

            let step_cost = if dc != 0 && dr != 0 { SQRT_2 } else { Fixed::ONE };
            let tentative_g = current_g + step_cost;
            let neighbor_g = g_score.get(&neighbor).copied().unwrap_or(Fixed::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.cell);
                g_score.insert(neighbor, tentative_g);
                open_set.push(AStarNode {
                    cell: neighbor,
                    f_score: tentative_g + euclidean_heuristic(neighbor, goal),
                    tie_breaker: cell_tie_breaker(neighbor),
                });
            }
        }
    }

    None
}

/// Reconstruct the route by walking parent pointers back from the goal.
fn reconstruct_path(came_from: &HashMap<Cell, Cell>, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}

/// Find a route between two world points.
///
/// Endpoints are mapped through the grid; the returned waypoints are
/// cell centers, so the first approximates the query start and the
/// last approximates the query goal to cell granularity.
#[must_use]
pub fn find_path_world(
    grid: &OccupancyGrid,
    from: Vec2Fixed,
    to: Vec2Fixed,
) -> Option<Vec<Vec2Fixed>> {
    let start = grid.world_to_cell(from);
    let goal = grid.world_to_cell(to);
    let cells = find_path(grid, start, goal)?;
    Some(cells.into_iter().map(|c| grid.cell_to_world(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(cells: u32) -> OccupancyGrid {
        OccupancyGrid::new(cells * 32, cells * 32, 32)
    }

    fn path_cost(path: &[Cell]) -> Fixed {
        path.windows(2)
            .map(|pair| {
                let dc = (pair[1].col - pair[0].col).abs();
                let dr = (pair[1].row - pair[0].row).abs();
                if dc == 1 && dr == 1 {
                    SQRT_2
                } else {
                    Fixed::ONE
                }
            })
            .fold(Fixed::ZERO, |acc, c| acc + c)
    }

    #[test]
    fn test_empty_grid_diagonal_path() {
        let grid = open_grid(10);
        let path = find_path(&grid, Cell::new(0, 0), Cell::new(9, 9)).unwrap();

        // Diagonal-dominant route: 10 waypoints, total cost 9√2
        assert_eq!(path.len(), 10);
        assert_eq!(path[0], Cell::new(0, 0));
        assert_eq!(path[9], Cell::new(9, 9));

        let expected = SQRT_2 * Fixed::from_num(9);
        let epsilon = Fixed::from_num(1) / Fixed::from_num(1000);
        assert!((path_cost(&path) - expected).abs() < epsilon);
    }

    #[test]
    fn test_consecutive_waypoints_are_neighbors() {
        let mut grid = open_grid(12);
        for row in 2..10 {
            grid.occupy(Cell::new(6, row));
        }
        let path = find_path(&grid, Cell::new(2, 6), Cell::new(10, 6)).unwrap();

        for pair in path.windows(2) {
            let dc = (pair[1].col - pair[0].col).abs();
            let dr = (pair[1].row - pair[0].row).abs();
            assert!(dc <= 1 && dr <= 1 && (dc, dr) != (0, 0));
        }
        for cell in &path {
            assert!(!grid.is_blocked(*cell));
        }
    }

    #[test]
    fn test_no_route_through_full_barrier() {
        let mut grid = open_grid(10);
        for row in 0..10 {
            grid.occupy(Cell::new(5, row));
        }
        assert!(find_path(&grid, Cell::new(2, 5), Cell::new(8, 5)).is_none());
    }

    #[test]
    fn test_blocked_endpoints_return_none_immediately() {
        let mut grid = open_grid(10);
        grid.occupy(Cell::new(0, 0));
        grid.occupy(Cell::new(9, 9));

        assert!(find_path(&grid, Cell::new(0, 0), Cell::new(5, 5)).is_none());
        assert!(find_path(&grid, Cell::new(5, 5), Cell::new(9, 9)).is_none());
    }

    #[test]
    fn test_out_of_bounds_endpoints_return_none() {
        let grid = open_grid(10);
        assert!(find_path(&grid, Cell::new(-1, 0), Cell::new(5, 5)).is_none());
        assert!(find_path(&grid, Cell::new(0, 0), Cell::new(10, 10)).is_none());
    }

    #[test]
    fn test_same_cell_path() {
        let grid = open_grid(10);
        let path = find_path(&grid, Cell::new(5, 5), Cell::new(5, 5)).unwrap();
        assert_eq!(path, vec![Cell::new(5, 5)]);
    }

    #[test]
    fn test_optimal_cost_around_wall() {
        // Unique shortest route around a one-cell wall stub
        let mut grid = open_grid(5);
        grid.occupy(Cell::new(1, 0));
        grid.occupy(Cell::new(1, 1));

        let path = find_path(&grid, Cell::new(0, 0), Cell::new(2, 0)).unwrap();
        // The stub seals every diagonal shortcut (corner cuts are
        // rejected), so the cheapest detour is six axis moves down
        // column 0, across row 2, and back up column 2.
        let expected = Fixed::from_num(6);
        let epsilon = Fixed::from_num(1) / Fixed::from_num(100);
        assert!(
            (path_cost(&path) - expected).abs() < epsilon,
            "cost {:?} != expected {:?} for {path:?}",
            path_cost(&path),
            expected
        );
    }

    #[test]
    fn test_no_corner_cutting() {
        let mut grid = open_grid(4);
        grid.occupy(Cell::new(1, 0));
        grid.occupy(Cell::new(0, 1));

        // The diagonal from (0,0) to (1,1) squeezes between two blocked
        // cells and must be rejected
        assert!(find_path(&grid, Cell::new(0, 0), Cell::new(3, 3)).is_none());
    }

    #[test]
    fn test_determinism_across_queries() {
        let mut grid = open_grid(20);
        for row in 5..15 {
            grid.occupy(Cell::new(10, row));
        }

        let a = find_path(&grid, Cell::new(5, 10), Cell::new(15, 10)).unwrap();
        let b = find_path(&grid, Cell::new(5, 10), Cell::new(15, 10)).unwrap();
        let c = find_path(&grid, Cell::new(5, 10), Cell::new(15, 10)).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_world_route_uses_cell_centers() {
        let grid = open_grid(10);
        let from = Vec2Fixed::new(Fixed::from_num(10), Fixed::from_num(10));
        let to = Vec2Fixed::new(Fixed::from_num(300), Fixed::from_num(10));

        let path = find_path_world(&grid, from, to).unwrap();
        let first = path.first().unwrap();
        let last = path.last().unwrap();
        assert_eq!(*first, Vec2Fixed::new(Fixed::from_num(16), Fixed::from_num(16)));
        assert_eq!(*last, Vec2Fixed::new(Fixed::from_num(304), Fixed::from_num(16)));
    }

    #[test]
    fn test_world_route_blocked_goal_is_none() {
        let mut grid = open_grid(10);
        grid.occupy(Cell::new(9, 0));
        let from = Vec2Fixed::new(Fixed::from_num(16), Fixed::from_num(16));
        let to = Vec2Fixed::new(Fixed::from_num(304), Fixed::from_num(16));
        assert!(find_path_world(&grid, from, to).is_none());
    }
}
