use std::fmt::{self, Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

const BAG_LEN: usize = PieceKind::LEN;

/// Piece generator using a two-half 7-bag.
///
/// # Bag layout
///
/// The bag holds 14 slots: two back-to-back permutations of the 7 kinds,
/// each shuffled independently. Pieces are drawn from the first half. Once
/// its 7th piece is drawn, the second half moves into the first, a fresh
/// permutation fills the second half and drawing restarts at slot 0.
///
/// Every run of 7 draws starting at a bag boundary is therefore a permutation
/// of all kinds, and at least 8 upcoming pieces are always known.
///
/// # Example
///
/// ```
/// use quadrix_engine::{PieceBag, PieceKind, PieceSeed};
///
/// let mut bag = PieceBag::with_seed(PieceSeed::from(42));
///
/// let mut first_bag: Vec<_> = (0..7).map(|_| bag.pop_next()).collect();
/// first_bag.sort_by_key(|kind| *kind as u8);
/// assert_eq!(first_bag, PieceKind::ALL);
///
/// assert!(bag.next_pieces().count() >= 8);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBag {
    rng: Pcg32,
    order: [PieceKind; 2 * BAG_LEN],
    cursor: usize,
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the bag's random number generator. The same seed always
/// yields the same piece sequence. Serialized as a 32-digit hex string.
///
/// # Example
///
/// ```
/// use quadrix_engine::{PieceBag, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
///
/// let mut bag1 = PieceBag::with_seed(seed);
/// let mut bag2 = PieceBag::with_seed(seed);
/// assert_eq!(bag1.pop_next(), bag2.pop_next());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl From<u64> for PieceSeed {
    fn from(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBag {
    /// Creates a bag with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Creates a bag whose two halves are shuffled from `seed`.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut order = [PieceKind::I; 2 * BAG_LEN];
        order[..BAG_LEN].copy_from_slice(&PieceKind::ALL);
        order[BAG_LEN..].copy_from_slice(&PieceKind::ALL);
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            order,
            cursor: 0,
        };
        this.reset();
        this
    }

    /// Reshuffles both halves and rewinds to the start of the first half.
    ///
    /// The random number generator keeps its state, so a reset bag continues
    /// the seeded sequence rather than repeating it.
    pub fn reset(&mut self) {
        let (first, second) = self.order.split_at_mut(BAG_LEN);
        first.shuffle(&mut self.rng);
        second.shuffle(&mut self.rng);
        self.cursor = 0;
    }

    /// Draws the next piece.
    pub fn pop_next(&mut self) -> PieceKind {
        let kind = self.order[self.cursor];
        self.cursor += 1;
        if self.cursor == BAG_LEN {
            self.order.copy_within(BAG_LEN.., 0);
            self.order[BAG_LEN..].shuffle(&mut self.rng);
            self.cursor = 0;
        }
        kind
    }

    /// Returns the piece the next [`Self::pop_next`] will draw.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.order[self.cursor]
    }

    /// Returns an iterator over the known upcoming pieces, next first.
    ///
    /// Yields between 8 and 14 pieces.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.order[self.cursor..].iter().copied()
    }
}
