#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Color Lines.
//!
//! The board owns the grid, the free-cell index, the pending color queue,
//! and the score. Adapters submit [`Command`] values through [`apply`]; the
//! board mutates itself deterministically and pushes [`Event`] values for
//! collaborators to react to. Consistency defects are escalated through
//! [`drain_diagnostics`] rather than the event stream.

use std::collections::HashMap;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use color_lines_core::{
    BallColor, CellCoord, Command, Diagnostic, Event, GamePhase, Move, MoveRejection, PathError,
    Tile,
};

pub mod pathfinding;
pub mod patterns;
mod timing;

pub use timing::TimingReport;

const DEFAULT_WIDTH: u32 = 9;
const DEFAULT_HEIGHT: u32 = 9;
const DEFAULT_PATTERN_LENGTH: u32 = 5;
const DEFAULT_SPAWN_PER_ROUND: u32 = 3;
const DEFAULT_RNG_SEED: u64 = 0x436f_6c6f_724c_696e;

/// Configuration parameters required to construct a board.
///
/// Dimensions of at least 5×5 are recommended so the default pattern length
/// remains attainable; smaller boards are accepted and simply fill up fast.
#[derive(Clone, Copy, Debug)]
pub struct BoardConfig {
    width: u32,
    height: u32,
    pattern_length: u32,
    spawn_per_round: u32,
    rng_seed: u64,
}

impl BoardConfig {
    /// Creates a configuration with explicit values for every parameter.
    #[must_use]
    pub const fn new(
        width: u32,
        height: u32,
        pattern_length: u32,
        spawn_per_round: u32,
        rng_seed: u64,
    ) -> Self {
        Self {
            width,
            height,
            pattern_length,
            spawn_per_round,
            rng_seed,
        }
    }

    /// Board width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Board height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Run length that triggers a purge.
    #[must_use]
    pub const fn pattern_length(&self) -> u32 {
        self.pattern_length
    }

    /// Number of balls spawned after each successful move.
    #[must_use]
    pub const fn spawn_per_round(&self) -> u32 {
        self.spawn_per_round
    }

    /// Seed for the board's deterministic random number generator.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_WIDTH,
            DEFAULT_HEIGHT,
            DEFAULT_PATTERN_LENGTH,
            DEFAULT_SPAWN_PER_ROUND,
            DEFAULT_RNG_SEED,
        )
    }
}

/// Dense rectangular store of ball colors, row-major.
///
/// Reads outside the grid report an empty cell; writes outside the grid are
/// ignored. Callers that mutate the grid are responsible for keeping the
/// free-cell index in step, which the board enforces by funnelling every
/// write through its `occupy`/`vacate` helpers.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Option<BallColor>>,
}

impl Grid {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let capacity = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![None; capacity],
        }
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the coordinate lies within the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.width && cell.y() < self.height
    }

    /// Ball occupying the cell, if any. Out-of-bounds reads return `None`.
    #[must_use]
    pub fn color_at(&self, cell: CellCoord) -> Option<BallColor> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Captures the live tile value for the provided cell.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        if self.contains(cell) {
            Some(Tile::new(cell, self.color_at(cell)))
        } else {
            None
        }
    }

    pub(crate) fn place(&mut self, cell: CellCoord, color: BallColor) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(color);
            }
        }
    }

    pub(crate) fn clear(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = None;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.y() as usize * self.width as usize + cell.x() as usize)
        } else {
            None
        }
    }
}

/// Set of empty cells supporting O(1) insert, removal, and uniform sampling.
///
/// Invariant: the index holds exactly the coordinates whose grid cell is
/// empty. The board keeps the two structures in step by updating them
/// together on every occupy/vacate.
#[derive(Clone, Debug)]
struct FreeCellIndex {
    cells: Vec<CellCoord>,
    positions: HashMap<CellCoord, usize>,
}

impl FreeCellIndex {
    fn filled(width: u32, height: u32) -> Self {
        let capacity = width as usize * height as usize;
        let mut cells = Vec::with_capacity(capacity);
        let mut positions = HashMap::with_capacity(capacity);
        for y in 0..height {
            for x in 0..width {
                let cell = CellCoord::new(x, y);
                let _ = positions.insert(cell, cells.len());
                cells.push(cell);
            }
        }
        Self { cells, positions }
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn insert(&mut self, cell: CellCoord) -> bool {
        if self.positions.contains_key(&cell) {
            return false;
        }
        let _ = self.positions.insert(cell, self.cells.len());
        self.cells.push(cell);
        true
    }

    fn remove(&mut self, cell: CellCoord) -> bool {
        let Some(position) = self.positions.remove(&cell) else {
            return false;
        };
        let _ = self.cells.swap_remove(position);
        if let Some(&moved) = self.cells.get(position) {
            let _ = self.positions.insert(moved, position);
        }
        true
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> Option<CellCoord> {
        if self.cells.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.cells.len());
        self.cells.get(index).copied()
    }
}

/// Represents the authoritative Color Lines board state.
#[derive(Debug)]
pub struct Board {
    config: BoardConfig,
    grid: Grid,
    free: FreeCellIndex,
    preview: Vec<BallColor>,
    score: u32,
    phase: GamePhase,
    started_at: Option<Instant>,
    rng: ChaCha8Rng,
    diagnostics: Vec<Diagnostic>,
    timings: TimingReport,
}

enum BatchOutcome {
    Completed { spawned: Vec<Tile> },
    Exhausted { spawned: Vec<Tile> },
}

impl Board {
    /// Creates an idle board ready for [`Command::StartGame`].
    #[must_use]
    pub fn new(config: BoardConfig) -> Self {
        Self {
            grid: Grid::new(config.width, config.height),
            free: FreeCellIndex::filled(config.width, config.height),
            preview: Vec::new(),
            score: 0,
            phase: GamePhase::Idle,
            started_at: None,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            diagnostics: Vec::new(),
            timings: TimingReport::default(),
            config,
        }
    }

    fn start_game(&mut self, initial_balls: u32, out_events: &mut Vec<Event>) {
        self.grid = Grid::new(self.config.width, self.config.height);
        self.free = FreeCellIndex::filled(self.config.width, self.config.height);
        self.score = 0;
        self.phase = GamePhase::InProgress;
        self.started_at = Some(Instant::now());
        self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);
        self.timings = TimingReport::default();

        out_events.push(Event::GameStarted);
        self.refill_preview(initial_balls);
        self.spawn_batch(initial_balls, out_events);
    }

    fn handle_move(&mut self, mv: Move, out_events: &mut Vec<Event>) {
        if self.phase != GamePhase::InProgress {
            reject(mv, MoveRejection::GameNotInProgress, out_events);
            return;
        }

        if self.grid.color_at(mv.finish).is_some() {
            reject(mv, MoveRejection::DestinationOccupied, out_events);
            return;
        }

        let Some(color) = self.grid.color_at(mv.start) else {
            reject(mv, MoveRejection::NoBallAtStart, out_events);
            return;
        };

        match pathfinding::find_path(&self.grid, mv.start, mv.finish) {
            Ok(_) => {}
            Err(PathError::Unreachable) => {
                reject(mv, MoveRejection::NoPath, out_events);
                return;
            }
            Err(PathError::CorruptQuery { reason }) => {
                // The pre-checks above should have caught every malformed
                // endpoint; anything arriving here indicates a broken
                // snapshot and must not look like a routine blocked path.
                self.diagnostics.push(Diagnostic::PathQueryCorrupt {
                    mv,
                    defect: reason,
                });
                reject(mv, MoveRejection::NoPath, out_events);
                return;
            }
        }

        self.occupy(mv.finish, color);
        self.vacate(mv.start);
        out_events.push(Event::BallMoved {
            from: mv.start,
            to: mv.finish,
        });

        self.purge_matched_runs(out_events);
        self.spawn_batch(self.config.spawn_per_round, out_events);
    }

    fn purge_matched_runs(&mut self, out_events: &mut Vec<Event>) {
        let (matched, took) =
            timing::timed(|| patterns::find_runs(&self.grid, self.config.pattern_length));
        self.timings.record_detection(took);

        if matched.is_empty() {
            return;
        }

        let mut purged = Vec::with_capacity(matched.len());
        for cell in matched {
            purged.push(Tile::new(cell, self.grid.color_at(cell)));
            self.vacate(cell);
        }

        let points = purged.len() as u32;
        self.score += points;
        out_events.push(Event::BallsPurged {
            balls: purged,
            points,
        });
    }

    fn spawn_batch(&mut self, count: u32, out_events: &mut Vec<Event>) {
        let (outcome, took) = timing::timed(|| self.place_batch(count));
        self.timings.record_spawning(took);

        match outcome {
            BatchOutcome::Completed { spawned } => {
                self.refill_preview(self.config.spawn_per_round);
                out_events.push(Event::PreviewUpdated {
                    colors: self.preview.clone(),
                });
                out_events.push(Event::BallsSpawned { balls: spawned });
            }
            BatchOutcome::Exhausted { spawned } => {
                if !spawned.is_empty() {
                    out_events.push(Event::BallsSpawned { balls: spawned });
                }
                // Remaining queue colors in the order they would have been
                // consumed.
                let unplaced: Vec<BallColor> = self.preview.drain(..).rev().collect();
                self.phase = GamePhase::Ended;
                out_events.push(Event::GameEnded {
                    elapsed: self
                        .started_at
                        .map(|started| started.elapsed())
                        .unwrap_or_default(),
                    unplaced,
                    final_score: self.score,
                });
            }
        }
    }

    fn place_batch(&mut self, count: u32) -> BatchOutcome {
        let mut spawned = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let Some(cell) = self.sample_consistent_free_cell() else {
                return BatchOutcome::Exhausted { spawned };
            };

            let color = match self.preview.pop() {
                Some(color) => color,
                None => self.draw_color(),
            };

            self.occupy(cell, color);
            spawned.push(Tile::new(cell, Some(color)));
        }

        if self.free.is_empty() {
            BatchOutcome::Exhausted { spawned }
        } else {
            BatchOutcome::Completed { spawned }
        }
    }

    /// Samples a free cell, repairing and reporting any entry the grid shows
    /// occupied. Each desync removes one stale entry, so the loop terminates.
    fn sample_consistent_free_cell(&mut self) -> Option<CellCoord> {
        loop {
            let cell = self.free.sample(&mut self.rng)?;
            if self.grid.color_at(cell).is_none() {
                return Some(cell);
            }

            self.diagnostics.push(Diagnostic::FreeIndexDesync { cell });
            let _ = self.free.remove(cell);
        }
    }

    fn refill_preview(&mut self, count: u32) {
        self.preview = (0..count).map(|_| self.draw_color()).collect();
    }

    fn draw_color(&mut self) -> BallColor {
        let index = self.rng.gen_range(0..BallColor::PALETTE.len());
        BallColor::PALETTE[index]
    }

    fn occupy(&mut self, cell: CellCoord, color: BallColor) {
        self.grid.place(cell, color);
        let _ = self.free.remove(cell);
    }

    fn vacate(&mut self, cell: CellCoord) {
        self.grid.clear(cell);
        let _ = self.free.insert(cell);
    }
}

fn reject(mv: Move, reason: MoveRejection, out_events: &mut Vec<Event>) {
    out_events.push(Event::MoveRejected { mv, reason });
}

/// Applies the provided command to the board, mutating state deterministically.
pub fn apply(board: &mut Board, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame { initial_balls } => board.start_game(initial_balls, out_events),
        Command::MoveBall { mv } => board.handle_move(mv, out_events),
    }
}

/// Drains the consistency defects recorded since the previous drain.
///
/// This channel is distinct from the event stream: hosts decide whether to
/// log, alert, or halt on its contents.
pub fn drain_diagnostics(board: &mut Board) -> Vec<Diagnostic> {
    board.diagnostics.drain(..).collect()
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use color_lines_core::{BallColor, CellCoord, GamePhase, Move, Tile};

    use super::{pathfinding, Board, Grid, TimingReport};

    /// Captures the live tile value for the provided cell, if it exists.
    #[must_use]
    pub fn tile(board: &Board, cell: CellCoord) -> Option<Tile> {
        board.grid.tile(cell)
    }

    /// Provides read-only access to the underlying grid.
    #[must_use]
    pub fn grid(board: &Board) -> &Grid {
        &board.grid
    }

    /// Computes the shortest open path for the provided move.
    ///
    /// Returns an empty path when the destination is occupied (without
    /// invoking the pathfinder: an occupied destination is never reachable
    /// by definition), when the start holds no ball, or when no route
    /// exists. Callers that need to distinguish a blocked path from a
    /// malformed query use [`pathfinding::find_path`] directly.
    #[must_use]
    pub fn path(board: &Board, mv: Move) -> Vec<CellCoord> {
        if board.grid.color_at(mv.finish).is_some() {
            return Vec::new();
        }
        pathfinding::find_path(&board.grid, mv.start, mv.finish).unwrap_or_default()
    }

    /// Current score. Never decreases within a game.
    #[must_use]
    pub fn score(board: &Board) -> u32 {
        board.score
    }

    /// Current lifecycle phase of the board.
    #[must_use]
    pub fn phase(board: &Board) -> GamePhase {
        board.phase
    }

    /// Colors queued for the next spawn batch, consumed back first.
    #[must_use]
    pub fn preview(board: &Board) -> &[BallColor] {
        &board.preview
    }

    /// Number of cells currently holding no ball.
    #[must_use]
    pub fn free_cell_count(board: &Board) -> usize {
        board.free.len()
    }

    /// Board dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(board: &Board) -> (u32, u32) {
        (board.grid.width(), board.grid.height())
    }

    /// Most recent instrumentation timings. Advisory only.
    #[must_use]
    pub fn timings(board: &Board) -> TimingReport {
        board.timings
    }
}
