use beamchess_core::{Board, Color, Role, Square};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Score of a position from White's (the maximizing side's) perspective.
pub type Score = f64;

/// Sentinel for a forced win; well clear of anything the heuristic can produce.
pub const MATE_SCORE: Score = 100_000.0;
pub const DRAW_SCORE: Score = 0.0;
/// Bound on the tie-breaking perturbation, well under one material
/// percentage point so it can only ever reorder near-equal moves.
pub const EVAL_NOISE: Score = 0.01;

const MIN_SQUARE_WEIGHT: f64 = 2.0;
const MAX_SQUARE_WEIGHT: f64 = 4.0;

// Closeness to the center, per square: 4 on the four central squares,
// decaying one point per ring, floored so edge squares still count.
static CENTER_WEIGHTS: Lazy<[f64; 64]> = Lazy::new(|| {
    let mut weights = [0.0; 64];
    for sq in Square::ALL {
        let file = sq.file() as i32 as f64;
        let rank = sq.rank() as i32 as f64;
        let ring = (file - 3.5).abs().max((rank - 3.5).abs()) - 0.5;
        weights[sq as usize] = (MAX_SQUARE_WEIGHT - ring).max(MIN_SQUARE_WEIGHT);
    }
    weights
});

/// Material value in pawns. The king carries no weight: it can never be captured.
pub fn piece_value(role: Role) -> f64 {
    match role {
        Role::Pawn => 1.0,
        Role::Knight | Role::Bishop => 3.0,
        Role::Rook => 5.0,
        Role::Queen => 9.0,
        Role::King => 0.0,
    }
}

/// Static evaluator: terminal classification plus a material/control
/// heuristic with a small random perturbation for tie breaking.
///
/// The random source is injected so tests can seed it and assert exact
/// orderings; production code uses [`Evaluator::from_entropy`].
pub struct Evaluator<R: Rng> {
    rng: R,
    positional_control: bool,
    evaluations: u64,
}

impl Evaluator<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Evaluator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            positional_control: true,
            evaluations: 0,
        }
    }

    /// Material-only variant: skips the positional control layer.
    pub fn material_only(rng: R) -> Self {
        Self {
            rng,
            positional_control: false,
            evaluations: 0,
        }
    }

    /// Score for a finished game. Checkmate is signed against the side to
    /// move (the side to move lost); every draw rule scores zero.
    pub fn evaluate_terminal(&self, board: &Board) -> Score {
        if board.is_checkmate() {
            match board.side_to_move() {
                Color::White => -MATE_SCORE,
                Color::Black => MATE_SCORE,
            }
        } else {
            DRAW_SCORE
        }
    }

    /// Heuristic score for a position that is still being played.
    /// Reads the board without mutating it; the noise term is drawn once
    /// per call and never re-drawn for cached reuse.
    pub fn evaluate_heuristic(&mut self, board: &Board) -> Score {
        self.evaluations += 1;
        let mut score = relative_material(board);
        if self.positional_control {
            score += positional_control(board);
        }
        score + self.rng.gen_range(-EVAL_NOISE..=EVAL_NOISE)
    }

    /// Random key used by the move orderer to break exact score ties.
    pub(crate) fn tie_break(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Number of heuristic evaluations since the last reset.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub(crate) fn reset_evaluations(&mut self) {
        self.evaluations = 0;
    }
}

/// Signed material difference normalized to a percentage of the material
/// still on the board, in roughly [-100, 100].
fn relative_material(board: &Board) -> f64 {
    let mut difference = 0.0;
    let mut total = 0.0;
    for sq in Square::ALL {
        let Some(piece) = board.piece_at(sq) else {
            continue;
        };
        let value = piece_value(piece.role);
        total += value;
        match piece.color {
            Color::White => difference += value,
            Color::Black => difference -= value,
        }
    }
    if total == 0.0 {
        0.0
    } else {
        100.0 * difference / total
    }
}

/// Center-weighted attacker counts over every square, normalized to the
/// total contested weight; roughly [-1, 1].
fn positional_control(board: &Board) -> f64 {
    let mut difference = 0.0;
    let mut total = 0.0;
    for sq in Square::ALL {
        let weight = CENTER_WEIGHTS[sq as usize];
        let white = board.attackers(Color::White, sq).count() as f64;
        let black = board.attackers(Color::Black, sq).count() as f64;
        difference += weight * (white - black);
        total += weight * (white + black);
    }
    if total == 0.0 {
        0.0
    } else {
        difference / total
    }
}
