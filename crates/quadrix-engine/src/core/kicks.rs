//! Wall-kick candidate tables.
//!
//! When a rotated piece does not fit, the board tries a fixed list of small
//! translations in order and keeps the first one that fits. The list depends
//! on the piece class (I or other), the rotation direction, and the
//! orientation state the piece is rotating *from*. Every list starts with the
//! zero offset, so an unobstructed rotation never moves the piece.

use super::piece::{PieceKind, PieceRotation, Rotation};

/// Translation applied to a piece anchor. Rows grow downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KickOffset {
    pub d_row: i32,
    pub d_col: i32,
}

impl KickOffset {
    pub const ZERO: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(d_row: i32, d_col: i32) -> Self {
        Self { d_row, d_col }
    }
}

/// Ordered kick candidates for one (class, direction, state) triple.
pub type KickSequence = [KickOffset; 5];

type KickTable = [KickSequence; 4];

const fn k(d_row: i32, d_col: i32) -> KickOffset {
    KickOffset::new(d_row, d_col)
}

const I_RIGHT: KickTable = [
    [k(0, 0), k(0, -2), k(0, 1), k(1, -2), k(-2, 1)],
    [k(0, 0), k(0, -1), k(0, 2), k(-2, -1), k(1, 2)],
    [k(0, 0), k(0, 2), k(0, -1), k(-1, 2), k(2, -1)],
    [k(0, 0), k(0, 1), k(0, -2), k(2, 1), k(-1, -2)],
];

const I_LEFT: KickTable = [
    [k(0, 0), k(0, -1), k(0, 2), k(-2, -1), k(1, 2)],
    [k(0, 0), k(0, 2), k(0, -1), k(-1, 2), k(2, -1)],
    [k(0, 0), k(0, 1), k(0, -2), k(2, 1), k(-1, -2)],
    [k(0, 0), k(0, -2), k(0, 1), k(1, -2), k(-2, 1)],
];

const OTHER_RIGHT: KickTable = [
    [k(0, 0), k(0, 1), k(-1, -1), k(2, 0), k(2, -1)],
    [k(0, 0), k(0, 1), k(1, 1), k(-2, 0), k(-2, 1)],
    [k(0, 0), k(0, 1), k(-1, 1), k(2, 0), k(2, 1)],
    [k(0, 0), k(0, -1), k(1, -1), k(-2, 0), k(-2, -1)],
];

const OTHER_LEFT: KickTable = [
    [k(0, 0), k(0, 1), k(-1, 1), k(2, 0), k(2, 1)],
    [k(0, 0), k(0, -1), k(1, 1), k(-2, 0), k(-2, 1)],
    [k(0, 0), k(0, -1), k(-1, -1), k(2, 0), k(2, -1)],
    [k(0, 0), k(0, -1), k(1, -1), k(-2, 0), k(-2, -1)],
];

/// Looks up the kick candidates for rotating a piece of `kind` from
/// `rotation` in `direction`.
///
/// Returns `None` for the O-piece, which has no table.
#[must_use]
pub fn kick_sequence(
    kind: PieceKind,
    rotation: PieceRotation,
    direction: Rotation,
) -> Option<&'static KickSequence> {
    let table = match (kind, direction) {
        (PieceKind::O, _) => return None,
        (PieceKind::I, Rotation::Right) => &I_RIGHT,
        (PieceKind::I, Rotation::Left) => &I_LEFT,
        (_, Rotation::Right) => &OTHER_RIGHT,
        (_, Rotation::Left) => &OTHER_LEFT,
    };
    Some(&table[rotation.as_usize()])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLES: [&KickTable; 4] = [&I_RIGHT, &I_LEFT, &OTHER_RIGHT, &OTHER_LEFT];

    #[test]
    fn test_zero_offset_is_tried_first() {
        for table in TABLES {
            for sequence in table {
                assert_eq!(sequence[0], KickOffset::ZERO);
                assert!(sequence[1..].iter().all(|kick| *kick != KickOffset::ZERO));
            }
        }
    }

    #[test]
    fn test_table_selection() {
        let state = PieceRotation::default();
        for kind in PieceKind::ALL {
            let right = kick_sequence(kind, state, Rotation::Right);
            let left = kick_sequence(kind, state, Rotation::Left);
            match kind {
                PieceKind::O => {
                    assert!(right.is_none() && left.is_none());
                }
                PieceKind::I => {
                    assert_eq!(right, Some(&I_RIGHT[0]));
                    assert_eq!(left, Some(&I_LEFT[0]));
                }
                _ => {
                    assert_eq!(right, Some(&OTHER_RIGHT[0]));
                    assert_eq!(left, Some(&OTHER_LEFT[0]));
                }
            }
        }
    }

    #[test]
    fn test_lookup_by_state() {
        let state = PieceRotation::default().rotated_left();
        assert_eq!(
            kick_sequence(PieceKind::I, state, Rotation::Left),
            Some(&[k(0, 0), k(0, -2), k(0, 1), k(1, -2), k(-2, 1)])
        );
        assert_eq!(
            kick_sequence(PieceKind::T, state, Rotation::Right),
            Some(&[k(0, 0), k(0, -1), k(1, -1), k(-2, 0), k(-2, -1)])
        );
    }
}
