//! Board geometry: pieces, rotation states, wall kicks and the play field.

pub use self::{board::*, kicks::*, piece::*};

mod board;
mod kicks;
mod piece;
