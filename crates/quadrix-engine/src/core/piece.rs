use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::kicks::{self, KickSequence};

/// A falling piece (tetromino) detached from any board position.
///
/// A piece owns its occupancy grid: a `side × side` square of [`Tile`]s stored
/// row-major, where `side` is the bounding-box side of its kind. The board
/// tracks where the piece is anchored; the piece only knows its shape and how
/// many quarter-turns it has made.
///
/// Pieces are values. Rotation never mutates in place from the caller's point
/// of view: [`Piece::rotated`] returns the replacement piece.
///
/// # Example
///
/// ```
/// use quadrix_engine::{Piece, PieceKind, Rotation};
///
/// let piece = Piece::new(PieceKind::T);
/// let turned = piece.rotated(Rotation::Right);
/// assert_eq!(turned.rotation().as_u8(), 1);
/// assert_eq!(turned.rotated(Rotation::Left), piece);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    rotation: PieceRotation,
    shape: ArrayVec<Tile, 16>,
    initial_shape: ArrayVec<Tile, 8>,
}

impl Piece {
    /// Creates a piece of the given kind in its spawn orientation.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        let template = kind.template();
        let filled = Tile::Filled(kind.color());
        let to_tile = |&cell: &bool| if cell { filled } else { Tile::Empty };
        Self {
            kind,
            rotation: PieceRotation::default(),
            shape: template.grid.iter().map(to_tile).collect(),
            initial_shape: template.initial.iter().map(to_tile).collect(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn color(&self) -> TileColor {
        self.kind.color()
    }

    /// Side length of the square bounding box (2, 3 or 4).
    #[must_use]
    pub fn side(&self) -> usize {
        self.kind.template().side
    }

    /// Number of rows of the unrotated compact shape.
    #[must_use]
    pub fn initial_rows(&self) -> usize {
        self.kind.template().initial_rows
    }

    /// Number of columns of the unrotated compact shape.
    #[must_use]
    pub fn initial_cols(&self) -> usize {
        self.kind.template().initial_cols
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    /// Current occupancy grid, row-major, `side × side` cells.
    #[must_use]
    pub fn shape(&self) -> &[Tile] {
        &self.shape
    }

    /// The unrotated compact shape, row-major, `initial_rows × initial_cols`
    /// cells. Only meaningful for previews.
    #[must_use]
    pub fn initial_shape(&self) -> &[Tile] {
        &self.initial_shape
    }

    /// Returns the tile at `(row, col)` inside the bounding box.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Tile {
        let side = self.side();
        assert!(row < side && col < side);
        self.shape[row * side + col]
    }

    /// Returns an iterator of `(row, col)` offsets of the occupied cells
    /// within the bounding box.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let side = self.side();
        self.shape
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_filled())
            .map(move |(i, _)| (i / side, i % side))
    }

    /// Returns this piece turned a quarter in the given direction.
    ///
    /// The O-piece is returned unchanged. The result is not checked against
    /// any board; see [`Board::rotate`](crate::Board::rotate) for kicks.
    #[must_use]
    pub fn rotated(&self, direction: Rotation) -> Self {
        if !self.kind.is_rotatable() {
            return self.clone();
        }
        let n = self.side();
        let mut shape = ArrayVec::new();
        for row in 0..n {
            for col in 0..n {
                let src = match direction {
                    Rotation::Right => (n - 1 - col) * n + row,
                    Rotation::Left => col * n + (n - 1 - row),
                };
                shape.push(self.shape[src]);
            }
        }
        Self {
            kind: self.kind,
            rotation: self.rotation.rotated(direction),
            shape,
            initial_shape: self.initial_shape.clone(),
        }
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        self.rotated(Rotation::Right)
    }

    #[must_use]
    pub fn rotated_left(&self) -> Self {
        self.rotated(Rotation::Left)
    }

    /// Kick candidates for rotating from the current orientation state.
    ///
    /// Returns `None` for the O-piece, which never rotates.
    #[must_use]
    pub fn kicks(&self, direction: Rotation) -> Option<&'static KickSequence> {
        kicks::kick_sequence(self.kind, self.rotation, direction)
    }
}

/// Direction of a quarter-turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Clockwise.
    Right,
    /// Counter-clockwise.
    Left,
}

/// Orientation state of a piece.
///
/// Counts cumulative quarter-turns modulo 4:
///
/// - `0`: spawn orientation
/// - `1`: one turn clockwise
/// - `2`: half turn
/// - `3`: one turn counter-clockwise
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn rotated_left(self) -> Self {
        PieceRotation((self.0 + 3) % 4)
    }

    #[must_use]
    pub fn rotated(self, direction: Rotation) -> Self {
        match direction {
            Rotation::Right => self.rotated_right(),
            Rotation::Left => self.rotated_left(),
        }
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    pub(crate) const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Color of a settled or falling cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileColor {
    Cyan,
    Blue,
    Orange,
    Yellow,
    Green,
    Purple,
    Red,
}

/// A single cell of a piece grid or of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tile {
    #[default]
    Empty,
    Filled(TileColor),
}

impl Tile {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Tile::Empty
    }

    #[must_use]
    pub fn is_filled(self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub fn color(self) -> Option<TileColor> {
        match self {
            Tile::Empty => None,
            Tile::Filled(color) => Some(color),
        }
    }
}

/// Enum representing the type of piece.
///
/// The absence of a piece (between a lock and the next spawn) is modelled as
/// `Option<Piece>` rather than as an extra kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    I = 0,
    J = 1,
    L = 2,
    O = 3,
    S = 4,
    T = 5,
    Z = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All kinds in canonical order.
    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    #[must_use]
    pub const fn color(self) -> TileColor {
        match self {
            PieceKind::I => TileColor::Cyan,
            PieceKind::J => TileColor::Blue,
            PieceKind::L => TileColor::Orange,
            PieceKind::O => TileColor::Yellow,
            PieceKind::S => TileColor::Green,
            PieceKind::T => TileColor::Purple,
            PieceKind::Z => TileColor::Red,
        }
    }

    /// Whether pieces of this kind react to rotation at all.
    #[must_use]
    pub const fn is_rotatable(self) -> bool {
        !matches!(self, PieceKind::O)
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadrix_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadrix_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('L'), Some(PieceKind::L));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }

    const fn template(self) -> &'static ShapeTemplate {
        &SHAPE_TEMPLATES[self as usize]
    }
}

/// Hand-authored geometry of one kind.
///
/// `initial` is the compact `initial_rows × initial_cols` shape; `grid` is the
/// same shape placed in its `side × side` bounding box.
struct ShapeTemplate {
    side: usize,
    initial_rows: usize,
    initial_cols: usize,
    initial: &'static [bool],
    grid: &'static [bool],
}

const SHAPE_TEMPLATES: [ShapeTemplate; PieceKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    [
        // I-piece
        ShapeTemplate {
            side: 4,
            initial_rows: 1,
            initial_cols: 4,
            initial: &[C, C, C, C],
            grid: &[E, E, E, E, C, C, C, C, E, E, E, E, E, E, E, E],
        },
        // J-piece
        ShapeTemplate {
            side: 3,
            initial_rows: 2,
            initial_cols: 3,
            initial: &[C, E, E, C, C, C],
            grid: &[C, E, E, C, C, C, E, E, E],
        },
        // L-piece
        ShapeTemplate {
            side: 3,
            initial_rows: 2,
            initial_cols: 3,
            initial: &[E, E, C, C, C, C],
            grid: &[E, E, C, C, C, C, E, E, E],
        },
        // O-piece
        ShapeTemplate {
            side: 2,
            initial_rows: 2,
            initial_cols: 2,
            initial: &[C, C, C, C],
            grid: &[C, C, C, C],
        },
        // S-piece
        ShapeTemplate {
            side: 3,
            initial_rows: 2,
            initial_cols: 3,
            initial: &[E, C, C, C, C, E],
            grid: &[E, C, C, C, C, E, E, E, E],
        },
        // T-piece
        ShapeTemplate {
            side: 3,
            initial_rows: 2,
            initial_cols: 3,
            initial: &[E, C, E, C, C, C],
            grid: &[E, C, E, C, C, C, E, E, E],
        },
        // Z-piece
        ShapeTemplate {
            side: 3,
            initial_rows: 2,
            initial_cols: 3,
            initial: &[C, C, E, E, C, C],
            grid: &[C, C, E, E, C, C, E, E, E],
        },
    ]
};
