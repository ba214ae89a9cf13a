#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Color Lines engine.
//!
//! This crate defines the message surface that connects adapters to the
//! authoritative board. Adapters submit [`Command`] values describing desired
//! mutations, the board executes those commands via its `apply` entry point,
//! and then broadcasts [`Event`] values for collaborators to react to.
//! Consistency defects travel on a separate [`Diagnostic`] channel so hosts
//! can decide whether to log, alert, or halt without entangling gameplay
//! notifications.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single board cell expressed as horizontal and vertical
/// coordinates, both zero-based from the top-left corner.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based horizontal index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based vertical index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether the two cells share an edge on the 4-connected grid.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Colors a ball may take, in the canonical palette order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BallColor {
    /// Palette entry `r`.
    Red,
    /// Palette entry `o`.
    Orange,
    /// Palette entry `y`.
    Yellow,
    /// Palette entry `g`.
    Green,
    /// Palette entry `c`.
    Cyan,
    /// Palette entry `b`.
    Blue,
    /// Palette entry `v`.
    Violet,
}

impl BallColor {
    /// Complete ordered palette used when drawing spawn colors.
    pub const PALETTE: [BallColor; 7] = [
        BallColor::Red,
        BallColor::Orange,
        BallColor::Yellow,
        BallColor::Green,
        BallColor::Cyan,
        BallColor::Blue,
        BallColor::Violet,
    ];

    /// Single-letter code used by text adapters to render the ball.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            BallColor::Red => 'r',
            BallColor::Orange => 'o',
            BallColor::Yellow => 'y',
            BallColor::Green => 'g',
            BallColor::Cyan => 'c',
            BallColor::Blue => 'b',
            BallColor::Violet => 'v',
        }
    }
}

/// Immutable value describing one board cell at a point in time.
///
/// `color` is `Some` exactly when a ball occupies the cell. Start and finish
/// markers used during path queries never appear here; they exist only as
/// transient parameters to the pathfinder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Coordinate of the cell the tile describes.
    pub cell: CellCoord,
    /// Ball occupying the cell, if any.
    pub color: Option<BallColor>,
}

impl Tile {
    /// Creates a tile snapshot for the provided cell.
    #[must_use]
    pub const fn new(cell: CellCoord, color: Option<BallColor>) -> Self {
        Self { cell, color }
    }

    /// Reports whether the cell holds no ball.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.color.is_none()
    }
}

/// A proposed relocation of a ball from one cell to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Cell the ball currently occupies.
    pub start: CellCoord,
    /// Empty cell the ball should travel to.
    pub finish: CellCoord,
}

impl Move {
    /// Creates a new move between the provided cells.
    #[must_use]
    pub const fn new(start: CellCoord, finish: CellCoord) -> Self {
        Self { start, finish }
    }
}

/// Commands that express all permissible board mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resets the board and spawns the opening batch of balls.
    StartGame {
        /// Number of balls placed before the first move.
        initial_balls: u32,
    },
    /// Requests that a ball travel along an open path to an empty cell.
    MoveBall {
        /// Start and finish cells of the requested relocation.
        mv: Move,
    },
}

/// Events broadcast by the board after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a fresh game began.
    GameStarted,
    /// Confirms that a ball travelled between two cells.
    BallMoved {
        /// Cell the ball vacated.
        from: CellCoord,
        /// Cell the ball now occupies.
        to: CellCoord,
    },
    /// Reports that a move request was rejected without mutation.
    MoveRejected {
        /// The move as it was requested.
        mv: Move,
        /// Specific reason the move failed.
        reason: MoveRejection,
    },
    /// Confirms that a batch of balls appeared on the board.
    BallsSpawned {
        /// The spawned balls with their cells and colors.
        balls: Vec<Tile>,
    },
    /// Confirms that matched runs were removed and scored.
    BallsPurged {
        /// Every tile cleared by the purge, deduplicated by coordinate.
        balls: Vec<Tile>,
        /// Points awarded, equal to the number of purged tiles.
        points: u32,
    },
    /// Announces the colors of the next spawn batch.
    PreviewUpdated {
        /// Colors in the order they will be assigned, back first.
        colors: Vec<BallColor>,
    },
    /// Announces that the board filled up and the game is over.
    GameEnded {
        /// Wall-clock time elapsed since the game started. Advisory only.
        elapsed: Duration,
        /// Colors that could not be placed when the board filled.
        unplaced: Vec<BallColor>,
        /// Score at the moment the board filled.
        final_score: u32,
    },
}

/// Reasons a move request may be rejected by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// No game is in progress, so moves are disabled.
    GameNotInProgress,
    /// The start cell holds no ball to relocate.
    NoBallAtStart,
    /// The finish cell already holds a ball.
    DestinationOccupied,
    /// No open 4-connected path joins the start and finish cells.
    NoPath,
}

/// Failures surfaced by a shortest-path query.
///
/// `Unreachable` is a legitimate gameplay outcome; `CorruptQuery` indicates a
/// malformed snapshot and is kept distinct so callers never mistake a broken
/// query for a blocked path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PathError {
    /// No open path joins the start and finish cells.
    #[error("no open path between start and finish")]
    Unreachable,
    /// The query itself was malformed and the search aborted.
    #[error("corrupt path query: {reason}")]
    CorruptQuery {
        /// Specific defect detected in the query.
        reason: PathQueryDefect,
    },
}

/// Specific defects that invalidate a shortest-path query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathQueryDefect {
    /// The start cell lies outside the board.
    StartOutOfBounds,
    /// The finish cell lies outside the board.
    FinishOutOfBounds,
    /// The start and finish cells coincide.
    EndpointsCoincide,
    /// The start cell holds no ball to route.
    StartUnoccupied,
    /// The finish cell already holds a ball.
    FinishOccupied,
    /// Path reconstruction found no predecessor despite a completed search.
    BrokenBacktrack,
}

impl std::fmt::Display for PathQueryDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            PathQueryDefect::StartOutOfBounds => "start out of bounds",
            PathQueryDefect::FinishOutOfBounds => "finish out of bounds",
            PathQueryDefect::EndpointsCoincide => "endpoints coincide",
            PathQueryDefect::StartUnoccupied => "start cell unoccupied",
            PathQueryDefect::FinishOccupied => "finish cell occupied",
            PathQueryDefect::BrokenBacktrack => "broken backtrack",
        };
        f.write_str(text)
    }
}

/// Consistency defects escalated outside the normal event stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// The free-cell index produced a cell the grid shows occupied.
    FreeIndexDesync {
        /// The cell reported free by the index.
        cell: CellCoord,
    },
    /// A path query aborted because its snapshot was malformed.
    PathQueryCorrupt {
        /// The move that produced the corrupt query.
        mv: Move,
        /// Specific defect detected by the pathfinder.
        defect: PathQueryDefect,
    },
}

/// Lifecycle phase of a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// No game has started yet.
    Idle,
    /// A game is underway and accepting moves.
    InProgress,
    /// The board filled up; the phase is terminal.
    Ended,
}

#[cfg(test)]
mod tests {
    use super::{BallColor, CellCoord, Move, MoveRejection, PathError, PathQueryDefect, Tile};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn adjacency_requires_unit_distance() {
        let cell = CellCoord::new(2, 2);
        assert!(cell.is_adjacent(CellCoord::new(2, 3)));
        assert!(cell.is_adjacent(CellCoord::new(1, 2)));
        assert!(!cell.is_adjacent(CellCoord::new(3, 3)));
        assert!(!cell.is_adjacent(cell));
    }

    #[test]
    fn palette_holds_seven_distinct_colors() {
        let mut codes: Vec<char> = BallColor::PALETTE.iter().map(|color| color.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 7);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(7, 3));
    }

    #[test]
    fn tile_round_trips_through_bincode() {
        let tile = Tile::new(CellCoord::new(2, 5), Some(BallColor::Cyan));
        assert_round_trip(&tile);
    }

    #[test]
    fn move_round_trips_through_bincode() {
        let mv = Move::new(CellCoord::new(0, 0), CellCoord::new(8, 8));
        assert_round_trip(&mv);
    }

    #[test]
    fn move_rejection_round_trips_through_bincode() {
        assert_round_trip(&MoveRejection::DestinationOccupied);
    }

    #[test]
    fn path_error_round_trips_through_bincode() {
        assert_round_trip(&PathError::CorruptQuery {
            reason: PathQueryDefect::FinishOccupied,
        });
    }
}
