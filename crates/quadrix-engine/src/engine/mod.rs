//! Game driver built on top of [`crate::core`].
//!
//! - [`GameController`] - Fixed-step game loop: gravity, input, lock delay,
//!   line-clear pause, scoring
//! - [`GameStats`] - Score, level and lock counters
//! - [`GameSettings`] - Timing and progression constants
//! - [`PieceBag`] - Two-half 7-bag piece generation
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Create a [`GameController`] with a board, a time step and a seed
//! 2. Call [`GameController::update`] once per time step with the held keys
//! 3. Issue [`GameController::rotate`] and [`GameController::hard_drop`] as
//!    the player presses them
//! 4. Stop when [`GameController::is_game_over`] turns true, or restart

pub use self::{controller::*, game_stats::*, piece_bag::*, settings::*};

mod controller;
mod game_stats;
mod piece_bag;
mod settings;
