//! Maximal same-color run detection across rows, columns, and diagonals.
//!
//! A run qualifies once it holds at least the configured number of
//! identically-colored balls; qualifying runs are purged in full, so a run
//! that continues past the threshold (or into the board edge) contributes
//! every one of its cells. Empty cells never extend a run. Results are
//! collected into a coordinate-keyed set so a cell matched along several
//! axes is purged exactly once.

use std::collections::BTreeSet;

use color_lines_core::{BallColor, CellCoord};

use crate::Grid;

/// Scans the grid along all four axes and returns every cell belonging to a
/// qualifying run. The set iterates in coordinate order, keeping purge
/// events deterministic.
pub fn find_runs(grid: &Grid, pattern_length: u32) -> BTreeSet<CellCoord> {
    let mut matched = BTreeSet::new();

    let width = grid.width();
    let height = grid.height();
    if width == 0 || height == 0 {
        return matched;
    }

    let threshold = pattern_length.max(1) as usize;

    for y in 0..height {
        scan_line(grid, walk(CellCoord::new(0, y), (1, 0), width, height), threshold, &mut matched);
    }

    for x in 0..width {
        scan_line(grid, walk(CellCoord::new(x, 0), (0, 1), width, height), threshold, &mut matched);
    }

    // Down-right diagonals start on the top row and the left column; the
    // corner cell seeds only the top-row pass so each diagonal is walked
    // exactly once.
    for x in 0..width {
        scan_line(grid, walk(CellCoord::new(x, 0), (1, 1), width, height), threshold, &mut matched);
    }
    for y in 1..height {
        scan_line(grid, walk(CellCoord::new(0, y), (1, 1), width, height), threshold, &mut matched);
    }

    // Down-left diagonals start on the top row and the right column.
    for x in 0..width {
        scan_line(grid, walk(CellCoord::new(x, 0), (-1, 1), width, height), threshold, &mut matched);
    }
    for y in 1..height {
        scan_line(
            grid,
            walk(CellCoord::new(width - 1, y), (-1, 1), width, height),
            threshold,
            &mut matched,
        );
    }

    matched
}

fn scan_line<I>(grid: &Grid, cells: I, threshold: usize, matched: &mut BTreeSet<CellCoord>)
where
    I: Iterator<Item = CellCoord>,
{
    let mut run: Vec<CellCoord> = Vec::new();
    let mut run_color: Option<BallColor> = None;

    for cell in cells {
        let color = grid.color_at(cell);

        if color.is_some() && color == run_color {
            run.push(cell);
            continue;
        }

        flush_run(&run, threshold, matched);
        run.clear();
        run_color = color;
        if color.is_some() {
            run.push(cell);
        }
    }

    flush_run(&run, threshold, matched);
}

fn flush_run(run: &[CellCoord], threshold: usize, matched: &mut BTreeSet<CellCoord>) {
    if run.len() >= threshold {
        matched.extend(run.iter().copied());
    }
}

/// Iterates cells from `start` along `step` until the walk leaves the grid.
fn walk(
    start: CellCoord,
    step: (i64, i64),
    width: u32,
    height: u32,
) -> impl Iterator<Item = CellCoord> {
    std::iter::successors(Some(start), move |cell| {
        let x = i64::from(cell.x()) + step.0;
        let y = i64::from(cell.y()) + step.1;

        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            return None;
        }

        Some(CellCoord::new(x as u32, y as u32))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const K: u32 = 5;

    fn place_all(grid: &mut Grid, color: BallColor, cells: &[(u32, u32)]) {
        for &(x, y) in cells {
            grid.place(CellCoord::new(x, y), color);
        }
    }

    #[test]
    fn full_row_of_one_color_matches_entirely() {
        let mut grid = Grid::new(9, 9);
        let cells: Vec<(u32, u32)> = (0..9).map(|x| (x, 4)).collect();
        place_all(&mut grid, BallColor::Green, &cells);

        let matched = find_runs(&grid, K);
        assert_eq!(matched.len(), 9);
        assert!(cells
            .iter()
            .all(|&(x, y)| matched.contains(&CellCoord::new(x, y))));
    }

    #[test]
    fn run_one_short_of_threshold_matches_nothing() {
        let mut grid = Grid::new(9, 9);
        place_all(&mut grid, BallColor::Blue, &[(0, 0), (1, 0), (2, 0), (3, 0)]);

        assert!(find_runs(&grid, K).is_empty());
    }

    #[test]
    fn empty_cell_breaks_a_run() {
        let mut grid = Grid::new(9, 9);
        // Five red balls split 3 + 2 by a gap at x = 3.
        place_all(
            &mut grid,
            BallColor::Red,
            &[(0, 2), (1, 2), (2, 2), (4, 2), (5, 2)],
        );

        assert!(find_runs(&grid, K).is_empty());
    }

    #[test]
    fn color_change_restarts_the_run() {
        let mut grid = Grid::new(9, 9);
        place_all(&mut grid, BallColor::Red, &[(0, 0), (1, 0), (2, 0), (3, 0)]);
        place_all(&mut grid, BallColor::Cyan, &[(4, 0), (5, 0), (6, 0), (7, 0)]);

        assert!(find_runs(&grid, K).is_empty());
    }

    #[test]
    fn column_run_matches() {
        let mut grid = Grid::new(9, 9);
        let cells: Vec<(u32, u32)> = (2..7).map(|y| (3, y)).collect();
        place_all(&mut grid, BallColor::Violet, &cells);

        let matched = find_runs(&grid, K);
        assert_eq!(matched.len(), 5);
    }

    #[test]
    fn down_right_diagonal_matches_including_off_corner_start() {
        let mut grid = Grid::new(9, 9);
        // Diagonal seeded from the left column, not the corner.
        let cells: Vec<(u32, u32)> = (0..5).map(|i| (i, i + 3)).collect();
        place_all(&mut grid, BallColor::Orange, &cells);

        let matched = find_runs(&grid, K);
        assert_eq!(matched.len(), 5);
        assert!(cells
            .iter()
            .all(|&(x, y)| matched.contains(&CellCoord::new(x, y))));
    }

    #[test]
    fn down_left_diagonal_matches() {
        let mut grid = Grid::new(9, 9);
        let cells: Vec<(u32, u32)> = (0..5).map(|i| (8 - i, i + 2)).collect();
        place_all(&mut grid, BallColor::Yellow, &cells);

        let matched = find_runs(&grid, K);
        assert_eq!(matched.len(), 5);
        assert!(cells
            .iter()
            .all(|&(x, y)| matched.contains(&CellCoord::new(x, y))));
    }

    #[test]
    fn run_reaching_the_boundary_matches_its_full_length() {
        let mut grid = Grid::new(9, 9);
        let cells: Vec<(u32, u32)> = (2..9).map(|x| (x, 8)).collect();
        place_all(&mut grid, BallColor::Blue, &cells);

        assert_eq!(find_runs(&grid, K).len(), 7);
    }

    #[test]
    fn crossing_runs_deduplicate_the_shared_cell() {
        let mut grid = Grid::new(9, 9);
        let row: Vec<(u32, u32)> = (0..5).map(|x| (x, 4)).collect();
        let column: Vec<(u32, u32)> = (0..5).map(|y| (2, y)).collect();
        place_all(&mut grid, BallColor::Green, &row);
        place_all(&mut grid, BallColor::Green, &column);

        // 5 + 5 cells sharing (2, 4) once.
        assert_eq!(find_runs(&grid, K).len(), 9);
    }

    #[test]
    fn longer_threshold_ignores_shorter_runs() {
        let mut grid = Grid::new(9, 9);
        let cells: Vec<(u32, u32)> = (0..5).map(|x| (x, 0)).collect();
        place_all(&mut grid, BallColor::Red, &cells);

        assert!(find_runs(&grid, 6).is_empty());
        assert_eq!(find_runs(&grid, 5).len(), 5);
    }
}
