pub mod cache;
pub mod evaluation;
pub mod ordering;
pub mod search;

pub use cache::PositionCache;
pub use evaluation::{Evaluator, Score, DRAW_SCORE, EVAL_NOISE, MATE_SCORE};
pub use search::{Engine, SearchConfig, SearchStats};
