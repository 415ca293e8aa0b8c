use quadrix_engine::GameController;
use serde::{Deserialize, Serialize};

use crate::view;

/// Outcome of a headless simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub start_level: usize,
    pub ticks_run: u64,
    pub game_over: bool,
    pub score: usize,
    pub level: usize,
    pub lines_cleared: usize,
    pub pieces_locked: usize,
    /// Locks by number of rows completed (0 to 4).
    pub line_clear_histogram: [usize; 5],
    pub board: Vec<String>,
}

impl SimulationReport {
    pub fn new(seed: u64, game: &GameController) -> Self {
        let stats = game.stats();
        Self {
            seed,
            start_level: stats.start_level(),
            ticks_run: game.total_ticks(),
            game_over: game.is_game_over(),
            score: stats.score(),
            level: stats.level(),
            lines_cleared: stats.total_cleared_lines(),
            pieces_locked: stats.completed_pieces(),
            line_clear_histogram: *stats.line_cleared_counter(),
            board: view::board_rows(game.board()),
        }
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "score {} | level {} | lines {} | pieces {} | ticks {}",
            self.score, self.level, self.lines_cleared, self.pieces_locked, self.ticks_run
        );
        if self.game_over {
            summary.push_str(" | game over");
        }
        summary
    }
}
