use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use beamchess_core::{Board, Color};
use beamchess_engine::{Engine, SearchConfig};
use clap::Parser;
use log::info;

mod logging;

use logging::{GameLogger, PerformanceLogger};

/// Terminal front end: engine-vs-engine self-play with game and
/// performance logging.
#[derive(Parser, Debug)]
#[command(name = "beamchess", about = "Beam-limited alpha-beta chess engine")]
struct Args {
    /// Nominal search depth in plies.
    #[arg(long, default_value_t = 3)]
    depth: u32,
    /// Cap on quiet candidate moves per node.
    #[arg(long, default_value_t = 10)]
    beam: usize,
    /// Starting position as FEN; defaults to the standard start.
    #[arg(long)]
    fen: Option<String>,
    /// Stop the game after this many plies.
    #[arg(long, default_value_t = 200)]
    max_plies: u32,
    /// Directory for plain-text game transcripts.
    #[arg(long, default_value = "games")]
    game_dir: PathBuf,
    /// Directory for CSV performance logs.
    #[arg(long, default_value = "performance_logs")]
    perf_dir: PathBuf,
    /// Skip the board printout between moves.
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut board = match &args.fen {
        Some(fen) => Board::from_fen(fen)?,
        None => Board::new(),
    };
    let mut engine = Engine::new(SearchConfig {
        target_depth: args.depth,
        beam_width: args.beam,
    });
    let mut game_log = GameLogger::create(&args.game_dir)?;
    let mut perf_log = PerformanceLogger::create(&args.perf_dir)?;

    let mut plies = 0;
    while plies < args.max_plies && !board.is_terminal() {
        if !args.quiet {
            print_board(&board);
        }
        let mover = board.side_to_move();
        let started = Instant::now();
        let Some(mv) = engine.pick_move(&mut board) else {
            break;
        };
        let elapsed = started.elapsed();
        let san = board.format_move(&mv);
        let stats = engine.stats();
        perf_log.record(&san, mover, args.depth, stats, elapsed)?;
        game_log.record(&san, mover)?;
        println!(
            "{}: {} ({:.0} ms, {} nodes, {} skips)",
            side_name(mover),
            san,
            elapsed.as_secs_f64() * 1000.0,
            stats.nodes,
            stats.cache_hits,
        );
        board.apply(&mv);
        plies += 1;
    }

    game_log.finish()?;
    if !args.quiet {
        print_board(&board);
    }
    println!("{}", verdict(&board));
    info!("game over after {plies} plies");
    Ok(())
}

fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

fn verdict(board: &Board) -> &'static str {
    if board.is_checkmate() {
        match board.side_to_move() {
            Color::White => "0-1 checkmate",
            Color::Black => "1-0 checkmate",
        }
    } else if board.is_stalemate() {
        "1/2-1/2 stalemate"
    } else if board.is_draw_by_rule() {
        "1/2-1/2 draw"
    } else {
        "game stopped"
    }
}

/// Renders the piece placement field of the FEN as an 8x8 grid.
fn print_board(board: &Board) {
    let fen = board.fen();
    let placement = fen.split(' ').next().unwrap_or("");
    for rank in placement.split('/') {
        let mut line = String::new();
        for c in rank.chars() {
            if let Some(n) = c.to_digit(10) {
                for _ in 0..n {
                    line.push_str(". ");
                }
            } else {
                line.push(c);
                line.push(' ');
            }
        }
        println!("{line}");
    }
    println!();
}
