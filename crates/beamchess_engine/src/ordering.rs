use beamchess_core::{Bitboard, Board, Color, Move, Square};
use rand::Rng;

use crate::evaluation::{piece_value, Evaluator, Score};

struct RankedMove {
    mv: Move,
    // One-ply look-ahead score from the mover's perspective.
    score: Score,
    tie_break: u64,
}

/// Full ordering for a regular node: every tactically pertinent move
/// (checks and favorable captures) best-first and uncapped, then at most
/// `beam_width` of the quiet remainder. Quiet moves past the beam are
/// never searched at this node.
pub fn ordered_moves<R: Rng>(
    board: &mut Board,
    evaluator: &mut Evaluator<R>,
    beam_width: usize,
) -> Vec<Move> {
    let (mut pertinent, mut normal) = rank_moves(board, evaluator);
    sort_best_first(&mut pertinent);
    sort_best_first(&mut normal);
    normal.truncate(beam_width);
    pertinent
        .into_iter()
        .chain(normal)
        .map(|ranked| ranked.mv)
        .collect()
}

/// Quiescence ordering: checks and favorable captures only, no quiet
/// fallback and no cap.
pub fn tactical_moves<R: Rng>(board: &mut Board, evaluator: &mut Evaluator<R>) -> Vec<Move> {
    let (mut pertinent, _) = rank_moves(board, evaluator);
    sort_best_first(&mut pertinent);
    pertinent.into_iter().map(|ranked| ranked.mv).collect()
}

/// Scores every legal move with a one-ply static look-ahead and splits the
/// list into pertinent and normal moves. The board is restored before
/// returning.
fn rank_moves<R: Rng>(
    board: &mut Board,
    evaluator: &mut Evaluator<R>,
) -> (Vec<RankedMove>, Vec<RankedMove>) {
    let mover = board.side_to_move();
    let mut pertinent = Vec::new();
    let mut normal = Vec::new();
    for mv in board.legal_moves() {
        let capture = board.is_capture(&mv);
        let target = mv.to();
        board.apply(&mv);
        let white_score = evaluator.evaluate_heuristic(board);
        // The opponent is to move now, so in_check means this move gave check.
        let tactical = board.in_check() || (capture && wins_exchange(board, mover, target));
        board.undo();
        let ranked = RankedMove {
            score: match mover {
                Color::White => white_score,
                Color::Black => -white_score,
            },
            tie_break: evaluator.tie_break(),
            mv,
        };
        if tactical {
            pertinent.push(ranked);
        } else {
            normal.push(ranked);
        }
    }
    (pertinent, normal)
}

/// Static-exchange heuristic on the capture square, judged after the
/// capture has been played. The capture is worth deep search when no
/// recapture is possible, or when the recapturers are outnumbered and the
/// cheapest supporting attacker is not worth more than the cheapest
/// recapturer.
fn wins_exchange(board: &Board, mover: Color, target: Square) -> bool {
    let defenders = board.attackers(!mover, target);
    if defenders.is_empty() {
        return true;
    }
    let attackers = board.attackers(mover, target);
    if defenders.count() >= attackers.count() {
        return false;
    }
    min_piece_value(board, attackers) <= min_piece_value(board, defenders)
}

fn min_piece_value(board: &Board, squares: Bitboard) -> f64 {
    squares
        .into_iter()
        .filter_map(|sq| board.role_at(sq))
        .map(piece_value)
        .fold(f64::INFINITY, f64::min)
}

fn sort_best_first(moves: &mut [RankedMove]) {
    moves.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.tie_break.cmp(&b.tie_break))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn evaluator() -> Evaluator<StdRng> {
        Evaluator::material_only(StdRng::seed_from_u64(7))
    }

    fn san_move(board: &Board, san: &str) -> Move {
        board
            .legal_moves()
            .into_iter()
            .find(|m| board.format_move(m) == san)
            .unwrap_or_else(|| panic!("no legal move {san}"))
    }

    #[test]
    fn beam_caps_quiet_moves() {
        let mut board = Board::new();
        let mut eval = evaluator();
        // No checks or captures exist at the start, so everything is quiet.
        let moves = ordered_moves(&mut board, &mut eval, 5);
        assert_eq!(moves.len(), 5);
        assert!(tactical_moves(&mut board, &mut eval).is_empty());
    }

    #[test]
    fn pertinent_moves_are_not_capped() {
        let mut board = Board::from_fen("k7/8/8/3q4/8/8/8/3R3K w - - 0 1").unwrap();
        let mut eval = evaluator();
        let rxd5 = san_move(&board, "Rxd5");
        let moves = ordered_moves(&mut board, &mut eval, 0);
        // Beam width zero discards every quiet move but keeps the capture.
        assert_eq!(moves, vec![rxd5]);
    }

    #[test]
    fn checks_are_pertinent() {
        let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R6K w - - 0 1").unwrap();
        let mut eval = evaluator();
        let mate = san_move(&board, "Ra8#");
        assert!(tactical_moves(&mut board, &mut eval).contains(&mate));
    }

    #[test]
    fn undefended_capture_is_favorable() {
        let mut board = Board::from_fen("k7/8/8/3q4/8/8/8/3R3K w - - 0 1").unwrap();
        let mut eval = evaluator();
        let rxd5 = san_move(&board, "Rxd5");
        assert!(tactical_moves(&mut board, &mut eval).contains(&rxd5));
    }

    #[test]
    fn defended_capture_is_not_favorable() {
        // Qxd5 would be recaptured by the c6 pawn with no support behind it.
        let mut board = Board::from_fen("k7/8/2p5/3p4/8/8/8/3Q3K w - - 0 1").unwrap();
        let mut eval = evaluator();
        let qxd5 = san_move(&board, "Qxd5");
        assert!(!tactical_moves(&mut board, &mut eval).contains(&qxd5));
    }

    #[test]
    fn best_capture_sorts_first() {
        let mut board = Board::from_fen("k7/8/8/3q4/8/8/8/3R3K w - - 0 1").unwrap();
        let mut eval = evaluator();
        let rxd5 = san_move(&board, "Rxd5");
        let moves = ordered_moves(&mut board, &mut eval, 32);
        assert_eq!(moves[0], rxd5);
    }

    #[test]
    fn ordering_restores_the_board() {
        let mut board = Board::new();
        let mut eval = evaluator();
        let before = board.position_key();
        ordered_moves(&mut board, &mut eval, 8);
        tactical_moves(&mut board, &mut eval);
        assert_eq!(board.position_key(), before);
    }
}
