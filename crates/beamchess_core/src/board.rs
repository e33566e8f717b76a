use log::warn;
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{
    Bitboard, CastlingMode, Chess, Color, EnPassantMode, Move, MoveList, Piece, Position, Role,
    Square,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("invalid FEN \"{fen}\": {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("illegal move {0}")]
    IllegalMove(String),
}

/// The single mutable board shared across a whole search: the current
/// position plus the undo stack that keeps `apply`/`undo` stack-disciplined.
///
/// Positions are stored by value on the stack, so `undo` is an exact
/// restore regardless of how the move changed castling or en passant rights.
pub struct Board {
    position: Chess,
    history: Vec<(Chess, Zobrist64)>,
}

impl Board {
    /// Standard starting position.
    pub fn new() -> Self {
        Self {
            position: Chess::default(),
            history: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let parsed: Fen = fen.parse().map_err(|e| BoardError::InvalidFen {
            fen: fen.to_owned(),
            reason: format!("{e}"),
        })?;
        let position = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| BoardError::InvalidFen {
                fen: fen.to_owned(),
                reason: format!("{e}"),
            })?;
        Ok(Self {
            position,
            history: Vec::new(),
        })
    }

    pub fn side_to_move(&self) -> Color {
        self.position.turn()
    }

    /// Regenerated fresh on every call.
    pub fn legal_moves(&self) -> MoveList {
        self.position.legal_moves()
    }

    /// Plays a move that is assumed legal (it came from `legal_moves`).
    /// Every `apply` must be paired with an `undo` before the caller returns.
    pub fn apply(&mut self, mv: &Move) {
        self.history.push((self.position.clone(), self.position_key()));
        self.position.play_unchecked(mv);
    }

    /// Reverses the most recent unmatched `apply`.
    ///
    /// Panics if there is no pending `apply`; that is a violation of the
    /// stack discipline, not a recoverable state.
    pub fn undo(&mut self) {
        let (position, _) = self
            .history
            .pop()
            .expect("undo without a matching apply");
        self.position = position;
    }

    /// Validated entry point for moves arriving from outside the engine.
    pub fn play(&mut self, mv: &Move) -> Result<(), BoardError> {
        if !self.legal_moves().contains(mv) {
            warn!("rejected illegal move {mv:?}");
            return Err(BoardError::IllegalMove(format!("{mv:?}")));
        }
        self.apply(mv);
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.is_checkmate() || self.is_stalemate() || self.is_draw_by_rule()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    /// Insufficient material, the 100-halfmove rule and repetition all
    /// collapse to a draw.
    pub fn is_draw_by_rule(&self) -> bool {
        self.position.is_insufficient_material()
            || self.position.halfmoves() >= 100
            || self.is_repetition()
    }

    /// Repetition against the undo stack: the current position occurred
    /// earlier in the game or in the line currently being searched.
    fn is_repetition(&self) -> bool {
        let key = self.position_key();
        self.history.iter().any(|(_, seen)| *seen == key)
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn is_capture(&self, mv: &Move) -> bool {
        mv.is_capture()
    }

    pub fn gives_check(&self, mv: &Move) -> bool {
        let mut next = self.position.clone();
        next.play_unchecked(mv);
        next.is_check()
    }

    /// Pieces of `side` attacking `square` in the current position.
    pub fn attackers(&self, side: Color, square: Square) -> Bitboard {
        let board = self.position.board();
        board.attacks_to(square, side, board.occupied())
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    pub fn role_at(&self, square: Square) -> Option<Role> {
        self.position.board().role_at(square)
    }

    /// Transposition-stable Zobrist key: equal for equal positions reached
    /// via different move orders.
    pub fn position_key(&self) -> Zobrist64 {
        self.position.zobrist_hash::<Zobrist64>(EnPassantMode::Legal)
    }

    /// Human-readable SAN, including check and mate suffixes.
    pub fn format_move(&self, mv: &Move) -> String {
        SanPlus::from_move(self.position.clone(), mv).to_string()
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
