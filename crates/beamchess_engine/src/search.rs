use beamchess_core::{Board, Color, Move};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::Rng;

use crate::cache::PositionCache;
use crate::evaluation::{Evaluator, Score};
use crate::ordering;

/// Search limits. Well-formedness is the caller's contract; a time budget
/// must be imposed externally by bounding depth and beam width.
#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
    /// Nominal search depth in plies; quiescence continues past it.
    pub target_depth: u32,
    /// Cap on quiet candidate moves per node.
    pub beam_width: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            target_depth: 3,
            beam_width: 10,
        }
    }
}

/// Observational counters for one search; they never affect behavior.
#[derive(Clone, Copy, Debug)]
pub struct SearchStats {
    /// Search nodes entered.
    pub nodes: u64,
    /// Positions scored by the heuristic evaluator.
    pub evaluated: u64,
    /// Re-searches skipped thanks to the position cache.
    pub cache_hits: u64,
    pub alpha_cutoffs: u64,
    pub beta_cutoffs: u64,
    /// Root score of the last completed search.
    pub best_score: Score,
    /// Lowest candidate score seen anywhere in the tree; +inf until the
    /// first candidate is scored.
    pub min_score: Score,
    /// Highest candidate score seen anywhere in the tree; -inf until the
    /// first candidate is scored.
    pub max_score: Score,
}

impl Default for SearchStats {
    fn default() -> Self {
        Self {
            nodes: 0,
            evaluated: 0,
            cache_hits: 0,
            alpha_cutoffs: 0,
            beta_cutoffs: 0,
            best_score: 0.0,
            min_score: f64::INFINITY,
            max_score: f64::NEG_INFINITY,
        }
    }
}

/// Alpha-beta driver: one parametrized recursion alternating maximizing
/// (White) and minimizing (Black) plies over the shared board.
pub struct Engine<R: Rng = StdRng> {
    config: SearchConfig,
    evaluator: Evaluator<R>,
    cache: PositionCache,
    stats: SearchStats,
}

impl Engine<StdRng> {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_evaluator(config, Evaluator::from_entropy())
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_evaluator(config: SearchConfig, evaluator: Evaluator<R>) -> Self {
        Self {
            config,
            evaluator,
            cache: PositionCache::new(),
            stats: SearchStats::default(),
        }
    }

    /// Counters from the most recent `pick_move` or `evaluate` call.
    pub fn stats(&self) -> SearchStats {
        let mut stats = self.stats;
        stats.evaluated = self.evaluator.evaluations();
        stats
    }

    /// Searches the position and returns the best move for the side to
    /// move, or `None` when the game is over or no candidate was searched.
    /// The board is restored to its pre-call state on every path.
    pub fn pick_move(&mut self, board: &mut Board) -> Option<Move> {
        self.begin_search();
        if board.is_terminal() {
            return None;
        }
        let maximizing = board.side_to_move() == Color::White;
        let (score, best) = self.search(board, 0, f64::NEG_INFINITY, f64::INFINITY, maximizing);
        self.stats.best_score = score;
        match &best {
            Some(mv) => debug!(
                "picked {} score {:.2} ({} nodes, {} cache hits)",
                board.format_move(mv),
                score,
                self.stats.nodes,
                self.stats.cache_hits
            ),
            None => debug!("no candidate move, score {score:.2}"),
        }
        best
    }

    /// Score of the position at the configured depth, or the terminal
    /// score directly when the game is already over.
    pub fn evaluate(&mut self, board: &mut Board) -> Score {
        self.begin_search();
        if board.is_terminal() {
            let score = self.evaluator.evaluate_terminal(board);
            self.stats.best_score = score;
            return score;
        }
        let maximizing = board.side_to_move() == Color::White;
        let (score, _) = self.search(board, 0, f64::NEG_INFINITY, f64::INFINITY, maximizing);
        self.stats.best_score = score;
        score
    }

    fn begin_search(&mut self) {
        self.cache.clear();
        self.stats = SearchStats::default();
        self.evaluator.reset_evaluations();
    }

    fn search(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
    ) -> (Score, Option<Move>) {
        self.stats.nodes += 1;
        if board.is_terminal() {
            return (self.evaluator.evaluate_terminal(board), None);
        }

        let candidates = if depth < self.config.target_depth {
            ordering::ordered_moves(board, &mut self.evaluator, self.config.beam_width)
        } else {
            ordering::tactical_moves(board, &mut self.evaluator)
        };

        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        let mut best_move: Option<Move> = None;
        let remaining = self.config.target_depth.saturating_sub(depth);

        for mv in candidates {
            trace!(
                "{}{} at depth {depth}",
                "\t".repeat(depth as usize),
                board.format_move(&mv)
            );
            board.apply(&mv);
            let key = board.position_key();
            let value = match self.cache.lookup(key, remaining) {
                Some(cached) => {
                    self.stats.cache_hits += 1;
                    cached
                }
                None => {
                    let (value, _) = self.search(board, depth + 1, alpha, beta, !maximizing);
                    self.cache.store(key, remaining, value);
                    value
                }
            };
            board.undo();
            self.stats.min_score = self.stats.min_score.min(value);
            self.stats.max_score = self.stats.max_score.max(value);

            if maximizing {
                if value > best {
                    best = value;
                    best_move = Some(mv);
                }
                if best >= beta {
                    self.stats.beta_cutoffs += 1;
                    break;
                }
                alpha = alpha.max(best);
            } else {
                if value < best {
                    best = value;
                    best_move = Some(mv);
                }
                if best <= alpha {
                    self.stats.alpha_cutoffs += 1;
                    break;
                }
                beta = beta.min(best);
            }
        }

        if best_move.is_none() {
            // Quiet horizon: no tactical continuation at this depth, so the
            // position is scored statically instead of as a terminal.
            return (self.evaluator.evaluate_heuristic(board), None);
        }
        (best, best_move)
    }
}
