//! Plain-text rendering of a board.

use quadrix_engine::{Board, Piece};

const EMPTY: char = '.';
const SETTLED: char = '#';
const GHOST: char = '+';
const ACTIVE: char = '@';

/// Renders the visible rows of `board`, top to bottom.
///
/// The active piece is drawn over its ghost, and both over settled tiles.
pub fn board_rows(board: &Board) -> Vec<String> {
    let mut rows: Vec<Vec<char>> = board
        .visible_rows()
        .map(|row| {
            row.iter()
                .map(|tile| if tile.is_filled() { SETTLED } else { EMPTY })
                .collect()
        })
        .collect();

    if let Some(piece) = board.piece() {
        draw_piece(&mut rows, piece, board.ghost_row(), board.piece_col(), GHOST);
        draw_piece(&mut rows, piece, board.piece_row(), board.piece_col(), ACTIVE);
    }

    rows.into_iter().map(|row| row.into_iter().collect()).collect()
}

fn draw_piece(rows: &mut [Vec<char>], piece: &Piece, row: i32, col: i32, mark: char) {
    for (dr, dc) in piece.occupied_cells() {
        let (Ok(dr), Ok(dc)) = (i32::try_from(dr), i32::try_from(dc)) else {
            continue;
        };
        // Cells in the hidden rows are not drawn.
        let (Ok(r), Ok(c)) = (usize::try_from(row + dr), usize::try_from(col + dc)) else {
            continue;
        };
        if let Some(cell) = rows.get_mut(r).and_then(|line| line.get_mut(c)) {
            *cell = mark;
        }
    }
}
