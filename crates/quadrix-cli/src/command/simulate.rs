use std::{path::PathBuf, time::Duration};

use anyhow::ensure;
use quadrix_engine::{Board, GameController, GameSettings, HeldInput, PieceSeed, Rotation};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    schema::simulation::SimulationReport,
    util::{self, Output},
};

const BOARD_ROWS: usize = 20;
const BOARD_COLS: usize = 10;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Policy {
    /// No input: pieces fall and lock where gravity takes them
    #[default]
    Idle,
    /// Random held keys and actions, reproducible from the game seed
    Random,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Seed for the piece sequence (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Level to start at
    #[arg(long, default_value_t = 1)]
    level: usize,
    /// Maximum number of time steps to run
    #[arg(long, default_value_t = 20_000)]
    ticks: u64,
    /// Length of one time step in milliseconds
    #[arg(long, default_value_t = 5)]
    time_step_ms: u64,
    /// Input policy: idle or random
    #[arg(long, default_value = "idle")]
    policy: Policy,
    /// Game settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: Format,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Default for SimulateArg {
    fn default() -> Self {
        Self {
            seed: None,
            level: 1,
            ticks: 20_000,
            time_step_ms: 5,
            policy: Policy::Idle,
            settings: None,
            format: Format::Text,
            output: None,
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        seed,
        level,
        ticks,
        time_step_ms,
        policy,
        settings,
        format,
        output,
    } = arg;
    ensure!(*time_step_ms > 0, "Time step must be at least 1 ms");

    let settings = match settings {
        Some(path) => util::read_settings_file(path)?,
        None => GameSettings::default(),
    };
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let time_step = Duration::from_millis(*time_step_ms);

    let mut game = GameController::with_settings(
        Board::new(BOARD_ROWS, BOARD_COLS),
        time_step,
        PieceSeed::from(seed),
        settings,
    );
    if *level != 1 {
        game.restart(*level);
    }

    eprintln!(
        "Simulating up to {ticks} ticks of {:?} (seed {seed}, {policy:?} policy)",
        game.time_step()
    );
    let mut player = match policy {
        Policy::Idle => None,
        Policy::Random => Some(RandomPlayer::new(seed)),
    };
    while game.total_ticks() < *ticks && !game.is_game_over() {
        match &mut player {
            Some(player) => player.play_tick(&mut game),
            None => game.update(HeldInput::NONE),
        }
    }
    eprintln!("Simulated {:?} of game time", game.duration());

    let report = SimulationReport::new(seed, &game);
    match format {
        Format::Json => Output::save_json(&report, output.clone())?,
        Format::Text => {
            let mut out = Output::from_output_path(output.clone())?;
            out.write_lines(report.board.iter().chain([&report.summary()]))?;
        }
    }
    Ok(())
}

/// Input source that holds keys for random stretches and occasionally
/// rotates or hard-drops.
#[derive(Debug)]
struct RandomPlayer {
    rng: Pcg32,
    held: HeldInput,
}

impl RandomPlayer {
    const CHANGE_HELD_PROBABILITY: f64 = 0.05;
    const ROTATE_PROBABILITY: f64 = 0.01;
    const HARD_DROP_PROBABILITY: f64 = 0.002;

    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            held: HeldInput::NONE,
        }
    }

    fn play_tick(&mut self, game: &mut GameController) {
        if self.rng.random_bool(Self::CHANGE_HELD_PROBABILITY) {
            self.held = HeldInput {
                soft_drop: self.rng.random_bool(0.3),
                move_right: self.rng.random_bool(0.4),
                move_left: self.rng.random_bool(0.4),
            };
        }
        game.update(self.held);

        if self.rng.random_bool(Self::ROTATE_PROBABILITY) {
            let direction = if self.rng.random() {
                Rotation::Right
            } else {
                Rotation::Left
            };
            game.rotate(direction);
        }
        if self.rng.random_bool(Self::HARD_DROP_PROBABILITY) {
            game.hard_drop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(seed: u64, ticks: u64) -> GameController {
        let mut game = GameController::new(
            Board::new(BOARD_ROWS, BOARD_COLS),
            Duration::from_millis(5),
            PieceSeed::from(seed),
        );
        let mut player = RandomPlayer::new(seed);
        while game.total_ticks() < ticks && !game.is_game_over() {
            player.play_tick(&mut game);
        }
        game
    }

    #[test]
    fn test_random_policy_is_reproducible() {
        let a = SimulationReport::new(9, &play(9, 5000));
        let b = SimulationReport::new(9, &play(9, 5000));
        assert_eq!(a.board, b.board);
        assert_eq!(a.score, b.score);
        assert_eq!(a.ticks_run, b.ticks_run);
        assert!(a.pieces_locked > 0);
    }

    #[test]
    fn test_policy_and_format_parse() {
        assert_eq!("random".parse::<Policy>().unwrap(), Policy::Random);
        assert_eq!("Idle".parse::<Policy>().unwrap(), Policy::Idle);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert!("fast".parse::<Policy>().is_err());
    }
}
