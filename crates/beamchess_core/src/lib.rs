// Board abstraction over the external rules engine (shakmaty).
pub mod board;

// Re-export the rule-engine types the search layer works with.
pub use board::{Board, BoardError};
pub use shakmaty::zobrist::Zobrist64;
pub use shakmaty::{Bitboard, Color, Move, MoveList, Piece, Role, Square};

/// Canonical, transposition-stable key for a position.
pub type PositionKey = Zobrist64;
