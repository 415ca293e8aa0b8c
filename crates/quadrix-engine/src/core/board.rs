use std::mem;

use crate::{PieceCollisionError, RotationError, TopOutError};

use super::piece::{Piece, PieceKind, Rotation, Tile, TileColor};

/// Play field: settled tiles plus the currently falling piece.
///
/// # Coordinate System
///
/// - Rows grow downward, columns grow rightward
/// - Row `0` is the top visible row; rows `-2` and `-1` are hidden spawn rows
/// - A piece is anchored by the top-left corner of its bounding box
///
/// Anything outside `[-2, rows) × [0, cols)` counts as filled, so walls and
/// floor need no sentinel cells.
///
/// # Line clearing
///
/// Freezing a piece detects full rows immediately but does not remove them:
/// the result is parked until [`Board::clear_lines`] is called, so the caller
/// can show the doomed rows for a while.
///
/// # Example
///
/// ```
/// use quadrix_engine::{Board, PieceKind};
///
/// let mut board = Board::new(20, 10);
/// board.spawn_piece(PieceKind::T).unwrap();
/// assert_eq!(board.piece_col(), 3);
///
/// let rows = board.hard_drop();
/// assert_eq!(board.piece_row(), board.ghost_row());
/// assert!(rows > 0);
///
/// board.freeze_piece().unwrap();
/// assert!(board.piece().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    rows: i32,
    cols: i32,
    tiles: Vec<Tile>,
    piece: Option<Piece>,
    row: i32,
    col: i32,
    ghost_row: i32,
    lines_to_clear: Vec<i32>,
    tiles_after_clear: Vec<Tile>,
}

impl Board {
    /// Number of hidden rows above the visible field.
    pub const HIDDEN_ROWS: usize = 2;
    /// Narrowest board every piece's bounding box fits in.
    pub const MIN_COLS: usize = 4;

    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    const ROWS_ABOVE: i32 = Self::HIDDEN_ROWS as i32;
    const MAX_DIMENSION: usize = 1 << 12;

    /// Creates an empty board with `rows` visible rows and `cols` columns.
    ///
    /// # Panics
    ///
    /// Panics if `rows` is zero or `cols` is below [`Self::MIN_COLS`].
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows >= 1, "Board needs at least one visible row");
        assert!(
            cols >= Self::MIN_COLS,
            "Board needs at least {} columns, got {cols}",
            Self::MIN_COLS
        );
        let rows = dimension(rows);
        let cols = dimension(cols);
        let len = grid_len(rows + Self::ROWS_ABOVE, cols);
        Self {
            rows,
            cols,
            tiles: vec![Tile::Empty; len],
            piece: None,
            row: 0,
            col: 0,
            ghost_row: 0,
            lines_to_clear: Vec::new(),
            tiles_after_clear: Vec::new(),
        }
    }

    /// Creates a board from ASCII art for tests and scripted setups.
    ///
    /// Each non-blank line is one row; `.` is empty, a piece letter (`I`,
    /// `J`, ...) is a tile of that kind's color and `#` is a cyan tile. Rows
    /// are bottom-aligned: the last line is the bottom visible row.
    ///
    /// # Example
    ///
    /// ```
    /// use quadrix_engine::Board;
    ///
    /// let board = Board::from_ascii(4, 4, "
    ///     #...
    ///     ###.Z
    /// ");
    /// assert!(board.tile_at(2, 0).is_filled());
    /// assert!(board.tile_at(3, 3).is_filled());
    /// assert!(board.tile_at(3, 2).is_empty());
    /// ```
    #[must_use]
    pub fn from_ascii(rows: usize, cols: usize, art: &str) -> Self {
        let mut board = Self::new(rows, cols);
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(
            lines.len() <= rows,
            "Art has {} rows but the board only has {rows}",
            lines.len()
        );

        let first_row = board.rows - dimension(lines.len());
        for (row, line) in (first_row..).zip(&lines) {
            let cells: Vec<Tile> = line
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| match c {
                    '.' => Tile::Empty,
                    '#' => Tile::Filled(TileColor::Cyan),
                    _ => Tile::Filled(
                        PieceKind::from_char(c)
                            .unwrap_or_else(|| panic!("Unknown tile {c:?} in row {row}"))
                            .color(),
                    ),
                })
                .collect();
            assert_eq!(
                cells.len(),
                cols,
                "Each row must have exactly {cols} cells, got {} at row {row}",
                cells.len()
            );
            for (col, tile) in (0..).zip(cells) {
                let index = board.index(row, col);
                board.tiles[index] = tile;
            }
        }
        board
    }

    /// Number of visible rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        grid_len(self.rows, 1)
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        grid_len(1, self.cols)
    }

    /// Empties the board: settled tiles, active piece and pending clear.
    pub fn clear(&mut self) {
        self.tiles.fill(Tile::Empty);
        self.piece = None;
        self.row = 0;
        self.col = 0;
        self.ghost_row = 0;
        self.lines_to_clear.clear();
        self.tiles_after_clear.clear();
    }

    /// Returns the settled tile at `(row, col)`; `row` may be a hidden row.
    ///
    /// The active piece is not included.
    #[must_use]
    pub fn tile_at(&self, row: i32, col: i32) -> Tile {
        assert!(
            self.contains(row, col),
            "({row}, {col}) is outside the board"
        );
        self.tiles[self.index(row, col)]
    }

    /// Returns an iterator over the visible rows, top to bottom.
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        let width = self.cols();
        self.tiles[Self::HIDDEN_ROWS * width..].chunks(width)
    }

    /// The falling piece, or `None` between a freeze and the next spawn.
    #[must_use]
    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    #[must_use]
    pub fn piece_row(&self) -> i32 {
        self.row
    }

    #[must_use]
    pub fn piece_col(&self) -> i32 {
        self.col
    }

    /// Row the active piece would land on if hard-dropped.
    #[must_use]
    pub fn ghost_row(&self) -> i32 {
        self.ghost_row
    }

    #[must_use]
    pub fn num_lines_to_clear(&self) -> usize {
        self.lines_to_clear.len()
    }

    /// Full rows waiting for [`Board::clear_lines`], bottom-most first.
    #[must_use]
    pub fn lines_to_clear(&self) -> &[i32] {
        &self.lines_to_clear
    }

    /// Places a fresh piece of `kind` at the top of the board.
    ///
    /// The piece is centered horizontally in the hidden rows, then lowered by
    /// up to one row (I) or two rows (others) while it fits. Fails when the
    /// initial position is already blocked; the blocked piece stays active so
    /// it can still be drawn.
    pub fn spawn_piece(&mut self, kind: PieceKind) -> Result<(), PieceCollisionError> {
        let piece = Piece::new(kind);
        self.row = -Self::ROWS_ABOVE;
        self.col = (self.cols - dimension(piece.side())) / 2;
        self.ghost_row = self.row;
        self.piece = Some(piece);
        if !self.fits(self.row, self.col) {
            return Err(PieceCollisionError);
        }

        let max_nudge = if kind == PieceKind::I { 1 } else { 2 };
        for _ in 0..max_nudge {
            if !self.fits(self.row + 1, self.col) {
                break;
            }
            self.row += 1;
        }
        self.update_ghost_row();
        Ok(())
    }

    pub fn move_horizontal(&mut self, d_col: i32) -> Result<(), PieceCollisionError> {
        if !self.fits(self.row, self.col + d_col) {
            return Err(PieceCollisionError);
        }
        self.col += d_col;
        self.update_ghost_row();
        Ok(())
    }

    /// Moves the piece vertically. A failed downward move means the piece is
    /// resting on something.
    ///
    /// The ghost row is left as is: a straight vertical move cannot change it.
    pub fn move_vertical(&mut self, d_row: i32) -> Result<(), PieceCollisionError> {
        if !self.fits(self.row + d_row, self.col) {
            return Err(PieceCollisionError);
        }
        self.row += d_row;
        Ok(())
    }

    /// Rotates the active piece, trying each kick candidate in order.
    ///
    /// The first candidate position that fits is committed. The O-piece and
    /// an empty board reject rotation outright.
    pub fn rotate(&mut self, direction: Rotation) -> Result<(), RotationError> {
        let Some(piece) = &self.piece else {
            return Err(RotationError::NotRotatable);
        };
        let Some(kicks) = piece.kicks(direction) else {
            return Err(RotationError::NotRotatable);
        };
        let rotated = piece.rotated(direction);

        for kick in kicks {
            let row = self.row + kick.d_row;
            let col = self.col + kick.d_col;
            if self.is_position_possible(row, col, &rotated) {
                self.piece = Some(rotated);
                self.row = row;
                self.col = col;
                self.update_ghost_row();
                return Ok(());
            }
        }
        Err(RotationError::Blocked)
    }

    /// Returns whether the active piece cannot move down any further.
    ///
    /// Always `true` without an active piece.
    #[must_use]
    pub fn is_on_ground(&self) -> bool {
        !self.fits(self.row + 1, self.col)
    }

    /// Moves the active piece straight to its ghost row and returns the
    /// number of rows it fell.
    pub fn hard_drop(&mut self) -> usize {
        if self.piece.is_none() {
            return 0;
        }
        let fallen = self.ghost_row - self.row;
        self.row = self.ghost_row;
        usize::try_from(fallen).unwrap_or(0)
    }

    /// Merges the active piece into the settled tiles and detects full rows.
    ///
    /// Fails with [`TopOutError`] when none of the piece's cells ended up in
    /// the visible field. The piece is merged either way; cells off the board
    /// are dropped.
    pub fn freeze_piece(&mut self) -> Result<(), TopOutError> {
        let Some(piece) = self.piece.take() else {
            return Err(TopOutError);
        };
        let tile = Tile::Filled(piece.color());
        let mut below_skyline = false;
        for (row, col) in cells_at(&piece, self.row, self.col) {
            if !self.contains(row, col) {
                continue;
            }
            if row >= 0 {
                below_skyline = true;
            }
            let index = self.index(row, col);
            self.tiles[index] = tile;
        }
        self.find_lines_to_clear();

        if below_skyline {
            Ok(())
        } else {
            Err(TopOutError)
        }
    }

    /// Removes the rows found by the last freeze, if any.
    pub fn clear_lines(&mut self) {
        if self.lines_to_clear.is_empty() {
            return;
        }
        mem::swap(&mut self.tiles, &mut self.tiles_after_clear);
        self.tiles_after_clear.clear();
        self.lines_to_clear.clear();
    }

    /// Checks whether `piece` anchored at `(row, col)` overlaps neither a
    /// settled tile nor the outside of the board.
    #[must_use]
    pub fn is_position_possible(&self, row: i32, col: i32, piece: &Piece) -> bool {
        cells_at(piece, row, col).all(|(r, c)| !self.is_tile_filled(r, c))
    }

    fn fits(&self, row: i32, col: i32) -> bool {
        self.piece
            .as_ref()
            .is_some_and(|piece| self.is_position_possible(row, col, piece))
    }

    fn contains(&self, row: i32, col: i32) -> bool {
        (-Self::ROWS_ABOVE..self.rows).contains(&row) && (0..self.cols).contains(&col)
    }

    fn is_tile_filled(&self, row: i32, col: i32) -> bool {
        !self.contains(row, col) || self.tiles[self.index(row, col)].is_filled()
    }

    fn index(&self, row: i32, col: i32) -> usize {
        debug_assert!(self.contains(row, col));
        grid_len(row + Self::ROWS_ABOVE, self.cols) + grid_len(1, col)
    }

    fn update_ghost_row(&mut self) {
        self.ghost_row = self.row;
        while self.fits(self.ghost_row + 1, self.col) {
            self.ghost_row += 1;
        }
    }

    fn find_lines_to_clear(&mut self) {
        self.lines_to_clear.clear();
        self.tiles_after_clear.clone_from(&self.tiles);

        let width = self.cols();
        let mut cleared = 0;
        for row in (-Self::ROWS_ABOVE..self.rows).rev() {
            let start = self.index(row, 0);
            let cells = &self.tiles[start..start + width];
            if cells.iter().all(|tile| tile.is_filled()) {
                self.lines_to_clear.push(row);
                cleared += 1;
            } else if cleared > 0 {
                let dest = start + cleared * width;
                self.tiles_after_clear[dest..dest + width].copy_from_slice(cells);
            }
        }

        if cleared == 0 {
            self.tiles_after_clear.clear();
        } else {
            self.tiles_after_clear[..cleared * width].fill(Tile::Empty);
        }
    }
}

/// Board cells covered by `piece` anchored at `(row, col)`.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn cells_at(piece: &Piece, row: i32, col: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
    piece
        .occupied_cells()
        .map(move |(dr, dc)| (row + dr as i32, col + dc as i32))
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn dimension(value: usize) -> i32 {
    assert!(
        value <= Board::MAX_DIMENSION,
        "Board dimension {value} exceeds {}",
        Board::MAX_DIMENSION
    );
    value as i32
}

#[expect(clippy::cast_sign_loss)]
fn grid_len(rows: i32, cols: i32) -> usize {
    debug_assert!(rows >= 0 && cols >= 0);
    (rows * cols) as usize
}
