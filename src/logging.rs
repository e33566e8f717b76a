use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use beamchess_core::Color;
use beamchess_engine::SearchStats;
use chrono::Local;

fn timestamp() -> String {
    Local::now().format("%m_%d_%Y_%H_%M_%S_%3f").to_string()
}

/// Plain-text transcript of one game, one numbered move pair per line.
pub struct GameLogger {
    file: File,
    move_number: u32,
    line_open: bool,
}

impl GameLogger {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let file = File::create(dir.join(format!("{}.txt", timestamp())))?;
        Ok(Self {
            file,
            move_number: 1,
            line_open: false,
        })
    }

    pub fn record(&mut self, san: &str, mover: Color) -> Result<()> {
        match mover {
            Color::White => {
                write!(self.file, "{}. {}", self.move_number, san)?;
                self.line_open = true;
            }
            Color::Black => {
                if self.line_open {
                    writeln!(self.file, " {san}")?;
                } else {
                    // Game starting from a position with Black to move.
                    writeln!(self.file, "{}... {}", self.move_number, san)?;
                }
                self.move_number += 1;
                self.line_open = false;
            }
        }
        self.file.flush()?;
        Ok(())
    }

    /// Terminates a transcript that ends on White's move.
    pub fn finish(&mut self) -> Result<()> {
        if self.line_open {
            writeln!(self.file)?;
            self.line_open = false;
        }
        self.file.flush()?;
        Ok(())
    }
}

/// CSV log of per-move search statistics.
pub struct PerformanceLogger {
    writer: csv::Writer<File>,
}

impl PerformanceLogger {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("performance_{}.csv", timestamp()));
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "timestamp",
            "depth",
            "positions_evaluated",
            "positions_skipped",
            "time_taken_ms",
            "move_san",
            "color",
            "branching_factor",
            "nodes_per_second",
            "best_score",
            "min_score",
            "max_score",
            "alpha_prunes",
            "beta_prunes",
            "total_prunes",
        ])?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn record(
        &mut self,
        san: &str,
        mover: Color,
        depth: u32,
        stats: SearchStats,
        elapsed: Duration,
    ) -> Result<()> {
        let ms = elapsed.as_secs_f64() * 1000.0;
        let branching_factor = if depth > 0 && stats.evaluated > 1 {
            (stats.evaluated as f64).powf(1.0 / f64::from(depth))
        } else {
            0.0
        };
        let nodes_per_second = if ms > 0.0 {
            stats.evaluated as f64 / ms * 1000.0
        } else {
            0.0
        };
        // An untouched range (min above max) means no candidate was ever
        // scored; report the best score for both bounds.
        let (min_score, max_score) = if stats.min_score <= stats.max_score {
            (stats.min_score, stats.max_score)
        } else {
            (stats.best_score, stats.best_score)
        };
        self.writer.write_record([
            Local::now().to_rfc3339(),
            depth.to_string(),
            stats.evaluated.to_string(),
            stats.cache_hits.to_string(),
            format!("{ms:.2}"),
            san.to_owned(),
            match mover {
                Color::White => "white",
                Color::Black => "black",
            }
            .to_owned(),
            format!("{branching_factor:.2}"),
            format!("{nodes_per_second:.2}"),
            format!("{:.2}", stats.best_score),
            format!("{min_score:.2}"),
            format!("{max_score:.2}"),
            stats.alpha_cutoffs.to_string(),
            stats.beta_cutoffs.to_string(),
            (stats.alpha_cutoffs + stats.beta_cutoffs).to_string(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("beamchess_{tag}_{nanos}"))
    }

    fn only_file(dir: &Path) -> PathBuf {
        fs::read_dir(dir).unwrap().next().unwrap().unwrap().path()
    }

    #[test]
    fn game_log_numbers_move_pairs() {
        let dir = scratch_dir("pairs");
        let mut log = GameLogger::create(&dir).unwrap();
        log.record("e4", Color::White).unwrap();
        log.record("e5", Color::Black).unwrap();
        log.record("Nf3", Color::White).unwrap();
        log.finish().unwrap();
        let text = fs::read_to_string(only_file(&dir)).unwrap();
        assert_eq!(text, "1. e4 e5\n2. Nf3\n");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn game_log_handles_black_moving_first() {
        let dir = scratch_dir("black_first");
        let mut log = GameLogger::create(&dir).unwrap();
        log.record("d5", Color::Black).unwrap();
        log.record("c4", Color::White).unwrap();
        log.finish().unwrap();
        let text = fs::read_to_string(only_file(&dir)).unwrap();
        assert_eq!(text, "1... d5\n2. c4\n");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn performance_log_header_carries_the_score_range() {
        let dir = scratch_dir("perf_header");
        let _log = PerformanceLogger::create(&dir).unwrap();
        let text = fs::read_to_string(only_file(&dir)).unwrap();
        let header: Vec<&str> = text.trim_end().split(',').collect();
        assert_eq!(header.len(), 15);
        assert_eq!(header[9], "best_score");
        assert_eq!(header[10], "min_score");
        assert_eq!(header[11], "max_score");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn performance_log_score_range_falls_back_to_best_score() {
        let dir = scratch_dir("perf_range");
        let mut log = PerformanceLogger::create(&dir).unwrap();
        let stats = SearchStats {
            best_score: 1.5,
            ..SearchStats::default()
        };
        log.record("e4", Color::White, 3, stats, Duration::from_millis(10))
            .unwrap();
        let text = fs::read_to_string(only_file(&dir)).unwrap();
        let row: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(row[9], "1.50");
        assert_eq!(row[10], "1.50");
        assert_eq!(row[11], "1.50");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn performance_log_reports_the_observed_range() {
        let dir = scratch_dir("perf_observed");
        let mut log = PerformanceLogger::create(&dir).unwrap();
        let stats = SearchStats {
            best_score: 2.0,
            min_score: -3.0,
            max_score: 4.5,
            ..SearchStats::default()
        };
        log.record("e4", Color::White, 3, stats, Duration::from_millis(10))
            .unwrap();
        let text = fs::read_to_string(only_file(&dir)).unwrap();
        let row: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(row[10], "-3.00");
        assert_eq!(row[11], "4.50");
        fs::remove_dir_all(&dir).unwrap();
    }
}
