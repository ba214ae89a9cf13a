//! Breadth-first shortest-path search over the board grid.
//!
//! Balls are impassable; every other cell may be traversed. The search is
//! stateless per call and never mutates the grid it borrows, so callers are
//! free to run path queries between moves without snapshotting.

use std::collections::VecDeque;

use color_lines_core::{CellCoord, PathError, PathQueryDefect};

use crate::Grid;

/// Neighbor probe order shared by the forward search and the backtrack:
/// up, left, right, down. Fixed ordering keeps reconstructed paths
/// deterministic across runs.
const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

const UNVISITED: u32 = u32::MAX;

/// Computes the shortest 4-connected path from `start` to `finish`.
///
/// The returned path runs from the cell adjacent to `start` up to and
/// including `finish`; the start cell itself is excluded, so a path of
/// length 1 means the endpoints are adjacent. When the endpoints are
/// 4-adjacent the search is skipped entirely and `[finish]` is returned:
/// callers treat an empty result as "no path", so the adjacent case must
/// still produce a non-empty path.
///
/// `Unreachable` reports a legitimately blocked destination. `CorruptQuery`
/// reports a malformed query (bad endpoints, or a backtrack that finds no
/// predecessor despite a completed search) and is kept distinct so the two
/// conditions are never conflated.
pub fn find_path(
    grid: &Grid,
    start: CellCoord,
    finish: CellCoord,
) -> Result<Vec<CellCoord>, PathError> {
    if !grid.contains(start) {
        return Err(corrupt(PathQueryDefect::StartOutOfBounds));
    }
    if !grid.contains(finish) {
        return Err(corrupt(PathQueryDefect::FinishOutOfBounds));
    }
    if start == finish {
        return Err(corrupt(PathQueryDefect::EndpointsCoincide));
    }
    if grid.color_at(start).is_none() {
        return Err(corrupt(PathQueryDefect::StartUnoccupied));
    }
    if grid.color_at(finish).is_some() {
        return Err(corrupt(PathQueryDefect::FinishOccupied));
    }

    if start.is_adjacent(finish) {
        return Ok(vec![finish]);
    }

    let width = grid.width();
    let height = grid.height();
    let cell_count = width as usize * height as usize;

    let mut depths = vec![UNVISITED; cell_count];
    depths[flat_index(start, width)] = 0;

    let mut frontier = VecDeque::new();
    frontier.push_back(start);
    let mut reached = false;

    'search: while let Some(cell) = frontier.pop_front() {
        let next_depth = depths[flat_index(cell, width)] + 1;

        for offset in NEIGHBOR_OFFSETS {
            let Some(neighbor) = offset_cell(cell, offset, width, height) else {
                continue;
            };

            let neighbor_index = flat_index(neighbor, width);
            if depths[neighbor_index] != UNVISITED {
                continue;
            }

            if grid.color_at(neighbor).is_some() {
                continue;
            }

            depths[neighbor_index] = next_depth;
            frontier.push_back(neighbor);

            if neighbor == finish {
                reached = true;
                break 'search;
            }
        }
    }

    if !reached {
        return Err(PathError::Unreachable);
    }

    reconstruct(&depths, finish, width, height)
}

/// Walks backward from the finish, stepping to the first neighbor (in probe
/// order) whose depth is exactly one less, until a cell adjacent to the
/// start is reached.
fn reconstruct(
    depths: &[u32],
    finish: CellCoord,
    width: u32,
    height: u32,
) -> Result<Vec<CellCoord>, PathError> {
    let mut path = vec![finish];
    let mut current = finish;
    let mut depth = depths[flat_index(finish, width)];

    while depth > 1 {
        let mut stepped = false;

        for offset in NEIGHBOR_OFFSETS {
            let Some(neighbor) = offset_cell(current, offset, width, height) else {
                continue;
            };

            if depths[flat_index(neighbor, width)] == depth - 1 {
                path.push(neighbor);
                current = neighbor;
                depth -= 1;
                stepped = true;
                break;
            }
        }

        // A completed forward search always leaves a predecessor chain; a
        // miss here means the snapshot changed under the search.
        if !stepped {
            return Err(corrupt(PathQueryDefect::BrokenBacktrack));
        }
    }

    path.reverse();
    Ok(path)
}

const fn corrupt(reason: PathQueryDefect) -> PathError {
    PathError::CorruptQuery { reason }
}

fn offset_cell(cell: CellCoord, offset: (i64, i64), width: u32, height: u32) -> Option<CellCoord> {
    let x = i64::from(cell.x()) + offset.0;
    let y = i64::from(cell.y()) + offset.1;

    if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
        return None;
    }

    Some(CellCoord::new(x as u32, y as u32))
}

fn flat_index(cell: CellCoord, width: u32) -> usize {
    cell.y() as usize * width as usize + cell.x() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_lines_core::BallColor;

    fn grid_with_balls(width: u32, height: u32, balls: &[CellCoord]) -> Grid {
        let mut grid = Grid::new(width, height);
        for &cell in balls {
            grid.place(cell, BallColor::Red);
        }
        grid
    }

    fn assert_path_is_valid(grid: &Grid, start: CellCoord, finish: CellCoord, path: &[CellCoord]) {
        assert!(!path.is_empty());
        assert_eq!(*path.last().expect("non-empty path"), finish);
        assert!(start.is_adjacent(path[0]));
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
        }
        for &cell in path {
            assert!(grid.color_at(cell).is_none() || cell == start);
        }
        let mut seen = path.to_vec();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), path.len(), "path revisited a cell");
    }

    #[test]
    fn adjacent_endpoints_yield_degenerate_path() {
        let start = CellCoord::new(3, 3);
        let finish = CellCoord::new(3, 4);
        let grid = grid_with_balls(9, 9, &[start]);

        let path = find_path(&grid, start, finish).expect("path");
        assert_eq!(path, vec![finish]);
    }

    #[test]
    fn straight_line_path_has_minimal_length() {
        let start = CellCoord::new(0, 0);
        let finish = CellCoord::new(4, 0);
        let grid = grid_with_balls(9, 9, &[start]);

        let path = find_path(&grid, start, finish).expect("path");
        assert_eq!(path.len(), 4);
        assert_path_is_valid(&grid, start, finish, &path);
    }

    #[test]
    fn path_routes_around_obstacles() {
        let start = CellCoord::new(0, 1);
        let finish = CellCoord::new(2, 1);
        // A vertical wall at x = 1 with a gap at the bottom row.
        let wall = [
            CellCoord::new(1, 0),
            CellCoord::new(1, 1),
            CellCoord::new(1, 2),
        ];
        let mut balls = wall.to_vec();
        balls.push(start);
        let grid = grid_with_balls(4, 4, &balls);

        let path = find_path(&grid, start, finish).expect("path");
        assert_path_is_valid(&grid, start, finish, &path);
        assert_eq!(path.len(), 6);
        assert!(!path.iter().any(|cell| wall.contains(cell)));
    }

    #[test]
    fn path_length_matches_exhaustive_minimum() {
        // Exhaustively verify optimality on a small grid with scattered balls.
        let start = CellCoord::new(0, 0);
        let finish = CellCoord::new(4, 4);
        let balls = [
            start,
            CellCoord::new(1, 1),
            CellCoord::new(2, 3),
            CellCoord::new(3, 1),
            CellCoord::new(1, 3),
        ];
        let grid = grid_with_balls(5, 5, &balls);

        let path = find_path(&grid, start, finish).expect("path");
        assert_path_is_valid(&grid, start, finish, &path);

        // Reference BFS counting hops without ordering constraints.
        let mut best = vec![u32::MAX; 25];
        let mut queue = std::collections::VecDeque::new();
        best[0] = 0;
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            let depth = best[flat_index(cell, 5)];
            for offset in NEIGHBOR_OFFSETS {
                let Some(next) = offset_cell(cell, offset, 5, 5) else {
                    continue;
                };
                if grid.color_at(next).is_some() {
                    continue;
                }
                let index = flat_index(next, 5);
                if best[index] > depth + 1 {
                    best[index] = depth + 1;
                    queue.push_back(next);
                }
            }
        }
        assert_eq!(path.len() as u32, best[flat_index(finish, 5)]);
    }

    #[test]
    fn enclosed_destination_is_unreachable() {
        let start = CellCoord::new(0, 0);
        let finish = CellCoord::new(4, 4);
        // Seal the corner the finish sits in.
        let balls = [start, CellCoord::new(3, 4), CellCoord::new(4, 3)];
        let grid = grid_with_balls(5, 5, &balls);

        assert_eq!(find_path(&grid, start, finish), Err(PathError::Unreachable));
    }

    #[test]
    fn malformed_queries_are_distinguished_from_unreachable() {
        let occupied = CellCoord::new(1, 1);
        let blocked_finish = CellCoord::new(3, 3);
        let grid = grid_with_balls(5, 5, &[occupied, blocked_finish]);

        assert_eq!(
            find_path(&grid, CellCoord::new(9, 0), CellCoord::new(0, 3)),
            Err(corrupt(PathQueryDefect::StartOutOfBounds))
        );
        assert_eq!(
            find_path(&grid, occupied, CellCoord::new(0, 9)),
            Err(corrupt(PathQueryDefect::FinishOutOfBounds))
        );
        assert_eq!(
            find_path(&grid, occupied, occupied),
            Err(corrupt(PathQueryDefect::EndpointsCoincide))
        );
        assert_eq!(
            find_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 2)),
            Err(corrupt(PathQueryDefect::StartUnoccupied))
        );
        assert_eq!(
            find_path(&grid, occupied, blocked_finish),
            Err(corrupt(PathQueryDefect::FinishOccupied))
        );
    }

    #[test]
    fn probe_order_breaks_ties_deterministically() {
        let start = CellCoord::new(1, 1);
        let finish = CellCoord::new(2, 2);
        let grid = grid_with_balls(4, 4, &[start]);

        let first = find_path(&grid, start, finish).expect("path");
        let second = find_path(&grid, start, finish).expect("path");
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
