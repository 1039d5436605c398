#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::time::Instant;
use mimalloc::MiMalloc;

use crate::error::ChessResult;
use crate::move_generator::perft;

pub mod board;
pub mod castling;
pub mod console;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod history;
pub mod move_generator;
pub mod movelist;
pub mod piece;
pub mod r#move;
pub mod search;
pub mod square;
pub mod transposition_table;
pub mod zob_hash;

pub use board::{Board, Outcome};
pub use error::ChessError;
pub use game::Game;
pub use r#move::Move;
pub use search::{Engine, Search, SearchOptions};

/// Prints perft counts for every depth up to `depth`, starting from the
/// given position or the standard one
pub fn run_perft(depth: u32, fen: Option<String>) -> ChessResult<()> {
    println!("perft");
    let mut board = match fen {
        None => Board::new(),
        Some(f) => Board::from_fen(&f)?,
    };
    println!("{}\n", board);
    println!("depth nodes\n--------");
    for d in 0..depth+1 {
        let start = Instant::now();
        let nodes = perft(&mut board, d);
        let elapsed = start.elapsed();
        println!("{}     {} ({}s, {} nps)", d, nodes, elapsed.as_secs_f32(), nodes as f32/elapsed.as_secs_f32());
    }
    Ok(())
}
