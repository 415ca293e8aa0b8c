use serde::Serialize;

use super::settings::GameSettings;

/// Base score for clearing 0 to 4 rows at once, multiplied by the level.
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Score, level and counters of one game.
///
/// - **Score**: line clears (`SCORE_TABLE[n] × level`) plus hard drops
///   (`2 × level` per row dropped)
/// - **Level**: start level plus one per `lines_per_level` cleared rows,
///   capped at `max_level`
/// - **Line clear distribution**: locks by number of rows they completed
///
/// # Example
///
/// ```
/// use quadrix_engine::{GameSettings, GameStats};
///
/// let settings = GameSettings::default();
/// let mut stats = GameStats::new(1);
/// stats.complete_piece_lock(4);
/// stats.clear_lines(4, &settings);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    start_level: usize,
    level: usize,
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new(1)
    }
}

impl GameStats {
    #[must_use]
    pub const fn new(start_level: usize) -> Self {
        Self {
            start_level,
            level: start_level,
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn start_level(&self) -> usize {
        self.start_level
    }

    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by rows completed.
    ///
    /// Index `n` counts locks that completed `n` rows; `[4]` also counts
    /// anything larger.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Records a locked piece that completed `pending_lines` rows.
    pub const fn complete_piece_lock(&mut self, pending_lines: usize) {
        self.completed_pieces += 1;
        let bucket = table_index(pending_lines);
        self.line_cleared_counter[bucket] += 1;
    }

    /// Scores a hard drop over `rows` rows.
    pub const fn add_hard_drop(&mut self, rows: usize) {
        self.score += 2 * self.level * rows;
    }

    /// Scores `lines` removed rows and updates the level.
    ///
    /// Returns whether the level changed.
    pub fn clear_lines(&mut self, lines: usize, settings: &GameSettings) -> bool {
        self.total_cleared_lines += lines;
        self.score += SCORE_TABLE[table_index(lines)] * self.level;

        let earned = self.total_cleared_lines / settings.lines_per_level.max(1);
        let level = (self.start_level + earned).min(settings.max_level.max(self.start_level));
        let changed = level != self.level;
        self.level = level;
        changed
    }
}

const fn table_index(lines: usize) -> usize {
    if lines < SCORE_TABLE.len() {
        lines
    } else {
        SCORE_TABLE.len() - 1
    }
}
