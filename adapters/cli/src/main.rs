#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Color Lines over stdin.
//!
//! Moves are entered as `x1 y1 x2 y2`; `q` quits. The adapter owns the
//! best-score persistence collaborator and feeds it the final score when
//! the board reports the game over.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Parser;

use color_lines_board::{self as board, query, Board, BoardConfig};
use color_lines_core::{CellCoord, Command, Event, GamePhase, Move};
use color_lines_persistence::HighScoreStore;

#[derive(Debug, Parser)]
#[command(name = "color-lines", about = "Match-five colored balls on a grid")]
struct Options {
    /// Board width in cells.
    #[arg(long, default_value_t = 9)]
    width: u32,

    /// Board height in cells.
    #[arg(long, default_value_t = 9)]
    height: u32,

    /// Number of balls placed before the first move.
    #[arg(long, default_value_t = 5)]
    initial_balls: u32,

    /// Run length that triggers a purge.
    #[arg(long, default_value_t = 5)]
    pattern_length: u32,

    /// Balls spawned after each move.
    #[arg(long, default_value_t = 3)]
    spawn_per_round: u32,

    /// Seed for the deterministic ball generator.
    #[arg(long, default_value_t = 2025)]
    seed: u64,

    /// File holding the persisted best score.
    #[arg(long, default_value = "color-lines-high-score.toml")]
    high_score_file: String,
}

/// Entry point for the Color Lines command-line interface.
fn main() -> Result<()> {
    let options = Options::parse();
    let store = HighScoreStore::new(&options.high_score_file);
    println!("Best score so far: {}", store.load()?);

    let config = BoardConfig::new(
        options.width,
        options.height,
        options.pattern_length,
        options.spawn_per_round,
        options.seed,
    );
    let mut game = Board::new(config);

    let mut events = Vec::new();
    board::apply(
        &mut game,
        Command::StartGame {
            initial_balls: options.initial_balls,
        },
        &mut events,
    );
    report_events(&events, &store)?;
    render(&game)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "q" {
            break;
        }

        let Some(mv) = parse_move(trimmed) else {
            println!("Enter a move as: x1 y1 x2 y2");
            continue;
        };

        events.clear();
        board::apply(&mut game, Command::MoveBall { mv }, &mut events);
        report_events(&events, &store)?;

        for defect in board::drain_diagnostics(&mut game) {
            eprintln!("consistency defect: {defect:?}");
        }

        render(&game)?;
        if query::phase(&game) == GamePhase::Ended {
            break;
        }
    }

    Ok(())
}

fn parse_move(line: &str) -> Option<Move> {
    let mut numbers = line.split_whitespace().map(str::parse::<u32>);
    let x1 = numbers.next()?.ok()?;
    let y1 = numbers.next()?.ok()?;
    let x2 = numbers.next()?.ok()?;
    let y2 = numbers.next()?.ok()?;
    if numbers.next().is_some() {
        return None;
    }
    Some(Move::new(CellCoord::new(x1, y1), CellCoord::new(x2, y2)))
}

fn report_events(events: &[Event], store: &HighScoreStore) -> Result<()> {
    for event in events {
        match event {
            Event::GameStarted => println!("New game."),
            Event::BallMoved { from, to } => {
                println!("Moved ({}, {}) -> ({}, {}).", from.x(), from.y(), to.x(), to.y());
            }
            Event::MoveRejected { reason, .. } => println!("Move rejected: {reason:?}."),
            Event::BallsSpawned { balls } => println!("{} new balls.", balls.len()),
            Event::BallsPurged { points, .. } => println!("Cleared a line: +{points}."),
            Event::PreviewUpdated { colors } => {
                let preview: String = colors.iter().rev().map(|color| color.code()).collect();
                println!("Next up: {preview}.");
            }
            Event::GameEnded {
                elapsed,
                unplaced,
                final_score,
            } => {
                println!(
                    "Game over after {}s with {} points ({} balls left unplaced).",
                    elapsed.as_secs(),
                    final_score,
                    unplaced.len()
                );
                if store.record(*final_score)? {
                    println!("New best score!");
                }
            }
        }
    }
    Ok(())
}

fn render(game: &Board) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let (width, height) = query::dimensions(game);

    for y in 0..height {
        for x in 0..width {
            let glyph = query::tile(game, CellCoord::new(x, y))
                .and_then(|tile| tile.color)
                .map_or('.', |color| color.code());
            write!(out, " {glyph}")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "Score: {}", query::score(game))?;
    Ok(())
}
