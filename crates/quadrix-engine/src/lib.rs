//! Rules engine for a falling-block puzzle game.
//!
//! - [`core`] holds the geometry: pieces, wall kicks and the board
//! - [`engine`] drives a game in fixed time steps: gravity, input, lock
//!   delay, scoring and piece generation
//!
//! The engine has no rendering or input layer of its own. A front end feeds
//! [`GameController::update`] with the keys held during each tick and reads
//! the board back to draw it.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding with the board")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece locked entirely above the visible field")]
pub struct TopOutError;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum RotationError {
    #[display("piece cannot rotate")]
    NotRotatable,
    #[display("no kick position fits the rotated piece")]
    Blocked,
}
