use std::time::Duration;

use crate::core::{Board, PieceKind, Rotation};

use super::{
    game_stats::GameStats,
    piece_bag::{PieceBag, PieceSeed},
    settings::{GameSettings, seconds_per_line},
};

/// Keys held down during one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeldInput {
    pub soft_drop: bool,
    pub move_right: bool,
    pub move_left: bool,
}

impl HeldInput {
    pub const NONE: Self = Self {
        soft_drop: false,
        move_right: false,
        move_left: false,
    };
    pub const LEFT: Self = Self {
        move_left: true,
        ..Self::NONE
    };
    pub const RIGHT: Self = Self {
        move_right: true,
        ..Self::NONE
    };
    pub const SOFT_DROP: Self = Self {
        soft_drop: true,
        ..Self::NONE
    };
}

/// Horizontal direction the piece is currently being driven in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Motion {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// Fixed-step game driver.
///
/// Each call to [`GameController::update`] advances the game by one time
/// step: line-clear pause, horizontal input with auto-repeat, gravity and lock
/// delay, in that order. Rotation and hard drop are discrete actions issued
/// between updates.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use quadrix_engine::{Board, GameController, HeldInput, PieceSeed};
///
/// let mut game = GameController::new(Board::new(20, 10), Duration::from_millis(5), PieceSeed::from(42));
/// let row = game.board().piece_row();
///
/// // One second of idle play moves the piece down one row at level 1.
/// for _ in 0..205 {
///     game.update(HeldInput::NONE);
/// }
/// assert_eq!(game.board().piece_row(), row + 1);
///
/// game.hard_drop();
/// assert_eq!(game.stats().completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GameController {
    board: Board,
    settings: GameSettings,
    time_step: Duration,
    bag: PieceBag,
    stats: GameStats,
    session_state: SessionState,
    seconds_per_line: f64,
    gravity_timer: f64,
    move_repeat_timer: f64,
    move_repeat_delay_timer: f64,
    lock_timer: f64,
    lines_clear_timer: f64,
    on_ground: bool,
    paused_for_lines_clear: bool,
    moves_while_grounded: usize,
    motion: Motion,
    prev_input: HeldInput,
    total_ticks: u64,
}

impl GameController {
    /// Starts a level-1 game on `board` with default settings.
    ///
    /// The board is cleared. The first piece is the first draw of a
    /// [`PieceBag`] seeded with `seed`.
    #[must_use]
    pub fn new(board: Board, time_step: Duration, seed: PieceSeed) -> Self {
        Self::with_settings(board, time_step, seed, GameSettings::default())
    }

    #[must_use]
    pub fn with_settings(
        board: Board,
        time_step: Duration,
        seed: PieceSeed,
        settings: GameSettings,
    ) -> Self {
        assert!(!time_step.is_zero(), "Time step must be positive");
        let mut this = Self {
            board,
            settings,
            time_step,
            bag: PieceBag::with_seed(seed),
            stats: GameStats::new(1),
            session_state: SessionState::Playing,
            seconds_per_line: seconds_per_line(1),
            gravity_timer: 0.0,
            move_repeat_timer: 0.0,
            move_repeat_delay_timer: 0.0,
            lock_timer: 0.0,
            lines_clear_timer: 0.0,
            on_ground: false,
            paused_for_lines_clear: false,
            moves_while_grounded: 0,
            motion: Motion::None,
            prev_input: HeldInput::NONE,
            total_ticks: 0,
        };
        this.start(1);
        this
    }

    /// Starts a new game at `level` on the same board and piece sequence.
    ///
    /// Both halves of the bag are reshuffled. Level 0 is treated as level 1.
    pub fn restart(&mut self, level: usize) {
        self.bag.reset();
        self.start(level);
    }

    fn start(&mut self, level: usize) {
        let level = level.max(1);
        self.board.clear();
        self.stats = GameStats::new(level);
        self.session_state = SessionState::Playing;
        self.seconds_per_line = seconds_per_line(level);
        self.gravity_timer = 0.0;
        self.move_repeat_timer = 0.0;
        self.move_repeat_delay_timer = 0.0;
        self.lock_timer = 0.0;
        self.lines_clear_timer = 0.0;
        self.on_ground = false;
        self.paused_for_lines_clear = false;
        self.motion = Motion::None;
        self.prev_input = HeldInput::NONE;
        self.total_ticks = 0;
        self.spawn_piece();
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.stats.level()
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn lines_cleared(&self) -> usize {
        self.stats.total_cleared_lines()
    }

    #[must_use]
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Seconds per row of gravity at the current level.
    #[must_use]
    pub fn seconds_per_line(&self) -> f64 {
        self.seconds_per_line
    }

    #[must_use]
    pub fn time_step(&self) -> Duration {
        self.time_step
    }

    /// Number of updates processed since the game started.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Game time elapsed since the game started.
    #[must_use]
    pub fn duration(&self) -> Duration {
        u32::try_from(self.total_ticks)
            .map_or(Duration::MAX, |ticks| self.time_step.saturating_mul(ticks))
    }

    /// Kind of the piece that will spawn next.
    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.bag.peek_next()
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.next_pieces()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.session_state.is_game_over()
    }

    #[must_use]
    pub fn is_paused_for_lines_clear(&self) -> bool {
        self.paused_for_lines_clear
    }

    /// Progress of the lock delay, from 0 (just landed) to 1 (locking).
    #[must_use]
    pub fn lock_percent(&self) -> f64 {
        ratio(self.lock_timer, self.settings.lock_down_time_limit)
    }

    /// Progress of the line-clear pause, from 0 to 1.
    #[must_use]
    pub fn lines_clear_pause_percent(&self) -> f64 {
        ratio(self.lines_clear_timer, self.settings.line_clear_pause)
    }

    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            SessionState::GameOver => SessionState::GameOver,
        };
    }

    /// Advances the game by one time step with `input` held.
    pub fn update(&mut self, input: HeldInput) {
        if !self.session_state.is_playing() {
            return;
        }
        self.total_ticks += 1;
        let dt = self.time_step.as_secs_f64();

        if self.paused_for_lines_clear {
            self.lines_clear_timer += dt;
            if self.lines_clear_timer < self.settings.line_clear_pause {
                return;
            }
            self.commit_lines_clear();
            self.paused_for_lines_clear = false;
            self.spawn_piece();
            if self.is_game_over() {
                return;
            }
        }

        self.gravity_timer += dt;
        self.move_repeat_timer += dt;
        self.move_repeat_delay_timer += dt;
        if self.on_ground {
            self.lock_timer += dt;
        } else {
            self.lock_timer = 0.0;
        }

        let motion = self.resolve_motion(input);
        self.prev_input = input;
        let d_col = match motion {
            Motion::None => 0,
            Motion::Left => -1,
            Motion::Right => 1,
        };
        if d_col != 0 {
            if self.motion != motion {
                self.move_repeat_delay_timer = 0.0;
                self.move_repeat_timer = 0.0;
                self.move_horizontal(d_col);
            } else if self.move_repeat_delay_timer >= self.settings.move_repeat_delay
                && self.move_repeat_timer >= self.settings.move_repeat_interval
            {
                self.move_repeat_timer = 0.0;
                self.move_horizontal(d_col);
            }
        }
        self.motion = motion;

        let speed_factor = if input.soft_drop {
            self.settings.soft_drop_speed_factor
        } else {
            1.0
        };
        if self.gravity_timer >= self.seconds_per_line / speed_factor {
            _ = self.board.move_vertical(1);
            self.gravity_timer = 0.0;
        }

        self.check_lock();
    }

    /// Rotates the active piece, with wall kicks.
    pub fn rotate(&mut self, direction: Rotation) {
        if !self.accepts_actions() {
            return;
        }
        if self.board.rotate(direction).is_ok() && self.on_ground {
            self.lock_timer = 0.0;
            self.moves_while_grounded += 1;
        }
        self.check_lock();
    }

    /// Drops the active piece to its ghost row and locks it at once.
    pub fn hard_drop(&mut self) {
        if !self.accepts_actions() {
            return;
        }
        let rows = self.board.hard_drop();
        self.stats.add_hard_drop(rows);
        self.lock();
    }

    fn accepts_actions(&self) -> bool {
        self.session_state.is_playing()
            && !self.paused_for_lines_clear
            && self.board.piece().is_some()
    }

    /// Picks one direction when both horizontal keys are held: the newly
    /// pressed key wins, otherwise the current motion continues.
    fn resolve_motion(&self, input: HeldInput) -> Motion {
        match (input.move_left, input.move_right) {
            (false, false) => Motion::None,
            (true, false) => Motion::Left,
            (false, true) => Motion::Right,
            (true, true) => {
                if !self.prev_input.move_right {
                    Motion::Right
                } else if !self.prev_input.move_left {
                    Motion::Left
                } else if self.motion.is_right() {
                    Motion::Right
                } else {
                    Motion::Left
                }
            }
        }
    }

    fn move_horizontal(&mut self, d_col: i32) {
        if self.board.move_horizontal(d_col).is_ok() && self.on_ground {
            self.lock_timer = 0.0;
            self.moves_while_grounded += 1;
        }
    }

    fn check_lock(&mut self) {
        if !self.board.is_on_ground() {
            self.on_ground = false;
            return;
        }
        self.on_ground = true;
        if self.lock_timer >= self.settings.lock_down_time_limit
            || self.moves_while_grounded >= self.settings.lock_down_moves_limit
        {
            self.lock();
        }
    }

    fn lock(&mut self) {
        self.lock_timer = 0.0;
        self.on_ground = false;
        let frozen = self.board.freeze_piece();
        self.stats.complete_piece_lock(self.board.num_lines_to_clear());
        if frozen.is_err() {
            self.session_state = SessionState::GameOver;
            return;
        }

        if self.board.num_lines_to_clear() == 0 {
            self.spawn_piece();
        } else {
            self.paused_for_lines_clear = true;
            self.lines_clear_timer = 0.0;
        }
    }

    fn spawn_piece(&mut self) {
        let kind = self.bag.pop_next();
        if self.board.spawn_piece(kind).is_err() {
            self.session_state = SessionState::GameOver;
        }
        self.moves_while_grounded = 0;
    }

    fn commit_lines_clear(&mut self) {
        let lines = self.board.num_lines_to_clear();
        self.board.clear_lines();
        if self.stats.clear_lines(lines, &self.settings) {
            self.seconds_per_line = seconds_per_line(self.stats.level());
        }
    }
}

fn ratio(elapsed: f64, limit: f64) -> f64 {
    if limit > 0.0 {
        (elapsed / limit).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(5);

    fn game(seed: u64) -> GameController {
        GameController::new(Board::new(20, 10), STEP, PieceSeed::from(seed))
    }

    fn run(game: &mut GameController, input: HeldInput, ticks: usize) {
        for _ in 0..ticks {
            game.update(input);
        }
    }

    /// Soft-drops the active piece until it rests on something.
    fn land(game: &mut GameController) {
        for _ in 0..2000 {
            if game.board().is_on_ground() {
                return;
            }
            game.update(HeldInput::SOFT_DROP);
        }
        panic!("piece never landed");
    }

    fn seed_starting_with(kind: PieceKind) -> u64 {
        seed_starting_with_all(&[kind])
    }

    fn seed_starting_with_all(kinds: &[PieceKind]) -> u64 {
        (0..)
            .find(|seed| {
                PieceBag::with_seed(PieceSeed::from(*seed))
                    .next_pieces()
                    .take(kinds.len())
                    .eq(kinds.iter().copied())
            })
            .unwrap()
    }

    #[test]
    fn test_first_piece_comes_from_seeded_bag() {
        let game = game(42);
        let mut bag = PieceBag::with_seed(PieceSeed::from(42));
        assert_eq!(game.board().piece().unwrap().kind(), bag.pop_next());
        assert_eq!(game.next_piece(), bag.peek_next());
        assert!(game.next_pieces().eq(bag.next_pieces()));
        assert_eq!(game.level(), 1);
        assert_eq!(game.score(), 0);
        assert!(game.session_state().is_playing());
    }

    #[test]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn test_idle_gravity_moves_one_row_per_second() {
        let mut game = game(42);
        let row = game.board().piece_row();
        let ticks_per_row = (game.seconds_per_line() / STEP.as_secs_f64()).round() as usize;
        assert_eq!(ticks_per_row, 200);

        run(&mut game, HeldInput::NONE, ticks_per_row - 5);
        assert_eq!(game.board().piece_row(), row);
        run(&mut game, HeldInput::NONE, 10);
        assert_eq!(game.board().piece_row(), row + 1);
    }

    #[test]
    fn test_soft_drop_speeds_up_gravity() {
        let mut game = game(42);
        let row = game.board().piece_row();
        run(&mut game, HeldInput::SOFT_DROP, 100);
        let fallen = game.board().piece_row() - row;
        assert!((9..=10).contains(&fallen), "fell {fallen} rows");
    }

    #[test]
    fn test_input_arbitration() {
        let both = HeldInput {
            move_left: true,
            move_right: true,
            ..HeldInput::NONE
        };
        let mut game = game(42);
        let col = game.board().piece_col();

        game.update(HeldInput::RIGHT);
        assert_eq!(game.motion(), Motion::Right);
        assert_eq!(game.board().piece_col(), col + 1);

        // Left was pressed last, so it wins.
        game.update(both);
        assert_eq!(game.motion(), Motion::Left);
        assert_eq!(game.board().piece_col(), col);

        // Both still held: keep going left.
        game.update(both);
        assert_eq!(game.motion(), Motion::Left);

        game.update(HeldInput::NONE);
        assert_eq!(game.motion(), Motion::None);

        // Both pressed on the same tick: right wins.
        game.update(both);
        assert_eq!(game.motion(), Motion::Right);
    }

    #[test]
    fn test_auto_repeat() {
        let mut game = game(42);
        let col = game.board().piece_col();

        run(&mut game, HeldInput::RIGHT, 25);
        assert_eq!(game.board().piece_col(), col + 1, "no repeat before the delay");

        run(&mut game, HeldInput::RIGHT, 15);
        assert!(game.board().piece_col() >= col + 2, "repeat after the delay");

        run(&mut game, HeldInput::RIGHT, 100);
        let piece = game.board().piece().unwrap().clone();
        let (row, col) = (game.board().piece_row(), game.board().piece_col());
        assert!(!game.board().is_position_possible(row, col + 1, &piece));
    }

    #[test]
    fn test_lock_after_delay() {
        let mut game = game(42);
        land(&mut game);
        let landed_row = game.board().piece_row();

        run(&mut game, HeldInput::NONE, 40);
        assert!((0.4..=0.6).contains(&game.lock_percent()));
        run(&mut game, HeldInput::NONE, 30);
        assert_eq!(game.stats().completed_pieces(), 0);

        run(&mut game, HeldInput::NONE, 20);
        assert_eq!(game.stats().completed_pieces(), 1);
        assert!(game.board().piece_row() < landed_row);
        assert!(game.board().tile_at(19, 4).is_filled());
    }

    #[test]
    fn test_lock_after_move_limit() {
        let mut game = game(42);
        land(&mut game);

        for i in 0..15 {
            assert_eq!(game.stats().completed_pieces(), 0, "move {i}");
            let input = if i % 2 == 0 {
                HeldInput::RIGHT
            } else {
                HeldInput::LEFT
            };
            game.update(input);
        }
        assert_eq!(game.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_lock_delay_resets_when_sliding_off_ledge() {
        let mut game = GameController::new(
            Board::new(20, 10),
            STEP,
            PieceSeed::from(seed_starting_with_all(&[PieceKind::O, PieceKind::I])),
        );
        // O settles in columns 4 and 5; the flat I lands on top of it.
        game.hard_drop();
        assert_eq!(game.board().piece().unwrap().kind(), PieceKind::I);
        land(&mut game);
        assert_eq!(game.board().piece_row(), 16);

        run(&mut game, HeldInput::NONE, 40);
        assert!(game.lock_percent() > 0.4);

        // Tap left until the I no longer overlaps the O.
        for _ in 0..3 {
            game.update(HeldInput::LEFT);
            game.update(HeldInput::NONE);
        }
        assert_eq!(game.board().piece_col(), 0);
        assert!(!game.board().is_on_ground());

        run(&mut game, HeldInput::NONE, 50);
        assert!(game.lock_percent() < f64::EPSILON);
        assert_eq!(game.stats().completed_pieces(), 1);

        land(&mut game);
        assert_eq!(game.board().piece_row(), 18);
        run(&mut game, HeldInput::NONE, 20);
        assert!(game.lock_percent() > 0.2);
        assert_eq!(game.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_grounded_rotation_resets_lock_delay() {
        let mut game = GameController::new(
            Board::new(20, 10),
            STEP,
            PieceSeed::from(seed_starting_with(PieceKind::T)),
        );
        land(&mut game);
        run(&mut game, HeldInput::NONE, 60);
        assert!(game.lock_percent() > 0.5);

        game.rotate(Rotation::Right);
        assert_eq!(game.board().piece().unwrap().rotation().as_u8(), 1);
        assert!(game.lock_percent() < f64::EPSILON);
        assert_eq!(game.stats().completed_pieces(), 0);
    }

    #[test]
    fn test_hard_drop_scores_and_spawns() {
        let mut game = GameController::new(
            Board::new(20, 10),
            STEP,
            PieceSeed::from(seed_starting_with(PieceKind::T)),
        );
        let next = game.next_piece();
        assert_eq!(game.board().piece_row(), 0);

        game.hard_drop();
        assert_eq!(game.score(), 2 * 18);
        assert_eq!(game.stats().completed_pieces(), 1);
        assert_eq!(game.board().piece().unwrap().kind(), next);
        assert!(game.board().tile_at(19, 4).is_filled());
    }

    #[test]
    fn test_line_clear_pause_then_score() {
        let mut game = GameController::new(
            Board::new(20, 4),
            STEP,
            PieceSeed::from(seed_starting_with(PieceKind::I)),
        );
        assert_eq!(game.board().piece_row(), -1);

        game.hard_drop();
        assert_eq!(game.score(), 2 * 19);
        assert!(game.is_paused_for_lines_clear());
        assert!(game.board().piece().is_none());
        assert_eq!(game.board().lines_to_clear(), [19]);

        // Actions are ignored while the row is on display.
        game.hard_drop();
        game.rotate(Rotation::Left);
        assert_eq!(game.score(), 2 * 19);

        run(&mut game, HeldInput::NONE, 55);
        assert!(game.is_paused_for_lines_clear());
        assert!(game.lines_clear_pause_percent() > 0.9);

        run(&mut game, HeldInput::NONE, 10);
        assert!(!game.is_paused_for_lines_clear());
        assert_eq!(game.lines_cleared(), 1);
        assert_eq!(game.score(), 2 * 19 + 100);
        assert!(game.board().piece().is_some());
        assert!((0..4).all(|col| game.board().tile_at(19, col).is_empty()));
        assert_eq!(game.stats().line_cleared_counter()[1], 1);
    }

    #[test]
    fn test_level_up_speeds_gravity() {
        let settings = GameSettings {
            lines_per_level: 1,
            ..GameSettings::default()
        };
        let mut game = GameController::with_settings(
            Board::new(20, 4),
            STEP,
            PieceSeed::from(seed_starting_with(PieceKind::I)),
            settings,
        );
        game.hard_drop();
        run(&mut game, HeldInput::NONE, 70);
        assert_eq!(game.level(), 2);
        assert!((game.seconds_per_line() - seconds_per_line(2)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stacking_ends_the_game() {
        let mut game = game(42);
        for _ in 0..200 {
            if game.is_game_over() {
                break;
            }
            game.hard_drop();
        }
        assert!(game.is_game_over());
        assert!(game.session_state().is_game_over());

        let score = game.score();
        let ticks = game.total_ticks();
        game.hard_drop();
        game.update(HeldInput::SOFT_DROP);
        assert_eq!(game.score(), score);
        assert_eq!(game.total_ticks(), ticks);

        game.toggle_pause();
        assert!(game.is_game_over());
    }

    #[test]
    fn test_pause_freezes_update() {
        let mut game = game(42);
        run(&mut game, HeldInput::NONE, 10);
        game.toggle_pause();
        assert!(game.session_state().is_paused());

        let row = game.board().piece_row();
        run(&mut game, HeldInput::SOFT_DROP, 500);
        assert_eq!(game.board().piece_row(), row);
        assert_eq!(game.total_ticks(), 10);
        assert_eq!(game.duration(), STEP * 10);

        game.toggle_pause();
        assert!(game.session_state().is_playing());
    }

    #[test]
    fn test_restart_resets_game() {
        let mut game = game(42);
        for _ in 0..5 {
            game.hard_drop();
        }
        run(&mut game, HeldInput::RIGHT, 50);

        game.restart(5);
        assert_eq!(game.level(), 5);
        assert_eq!(game.score(), 0);
        assert_eq!(game.stats().completed_pieces(), 0);
        assert_eq!(game.total_ticks(), 0);
        assert_eq!(game.motion(), Motion::None);
        assert!((game.seconds_per_line() - seconds_per_line(5)).abs() < f64::EPSILON);
        // One piece drawn from a fresh two-half bag.
        assert_eq!(game.next_pieces().count(), 13);
        assert_eq!(
            game.board()
                .visible_rows()
                .flatten()
                .filter(|tile| tile.is_filled())
                .count(),
            0
        );
    }

    #[test]
    fn test_same_seed_same_game() {
        let script = |tick: usize| HeldInput {
            soft_drop: tick % 7 == 0,
            move_right: tick % 90 < 20,
            move_left: tick % 130 > 100,
        };
        let mut games = [game(1234), game(1234)];
        for game in &mut games {
            for tick in 0..3000 {
                game.update(script(tick));
                if tick % 150 == 0 {
                    game.rotate(Rotation::Right);
                }
                if tick % 400 == 399 {
                    game.hard_drop();
                }
            }
        }

        let [a, b] = &games;
        assert_eq!(a.score(), b.score());
        assert_eq!(a.stats(), b.stats());
        assert_eq!(a.board().piece(), b.board().piece());
        assert_eq!(a.board().piece_row(), b.board().piece_row());
        assert!(a.board().visible_rows().eq(b.board().visible_rows()));
    }
}
