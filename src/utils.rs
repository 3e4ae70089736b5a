//! Parsing boards from text.

use crate::engine::{Board, Color};
use crate::error::BoardError;

/// Parses an array of string slices into a `Board`.
///
/// Each string slice represents one row, starting from row 0 at the top. The board is as
/// wide as the longest row; shorter rows are padded on the right with empty cells.
///
/// Valid characters are `R`, `G`, `B`, `Y`, `P` for the five colors and `.` for an empty
/// cell. Any other character results in an error.
///
/// # Errors
/// * `BoardError::InvalidDimensions` if there are no rows or every row is empty.
/// * `BoardError::UnrecognizedGlyph` for a character outside the set above.
///
/// # Examples
/// ```
/// use samegame_engine::utils::board_from_str_array;
/// use samegame_engine::engine::Color;
///
/// let board = board_from_str_array(&["RGY", "B"]).unwrap();
/// assert_eq!(board.cols(), 3);
/// assert_eq!(board.cell(0, 2), Some(Color::Yellow));
/// assert_eq!(board.cell(1, 0), Some(Color::Blue));
/// assert_eq!(board.cell(1, 1), None); // padded
///
/// assert!(board_from_str_array(&["RXB"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, BoardError> {
    let width = s.iter().map(|row| row.chars().count()).max().unwrap_or(0);
    let mut board = Board::new_empty(s.len(), width)?;

    for (r, row_str) in s.iter().enumerate() {
        for (c, glyph) in row_str.chars().enumerate() {
            let cell = match glyph {
                '.' => None,
                other => Some(Color::from_char(other).ok_or(BoardError::UnrecognizedGlyph {
                    glyph: other,
                    row: r,
                    col: c,
                })?),
            };
            board.set_cell(r, c, cell)?;
        }
    }
    Ok(board)
}

/// Parses a board file: one row per line, surrounding whitespace trimmed, blank lines skipped.
///
/// Unlike [`board_from_str_array`], every row must have the same width, since a file with
/// ragged rows is more likely a typo than an intentionally padded board.
pub fn board_from_text(text: &str) -> Result<Board, BoardError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if let Some(first) = lines.first() {
        let expected = first.chars().count();
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(BoardError::RaggedRow {
                    row,
                    expected,
                    found,
                });
            }
        }
    }
    board_from_str_array(&lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&["RGYBP", ".....", "PBYGR"]).unwrap();
        assert_eq!(board.rows(), 3);
        assert_eq!(board.cols(), 5);
        assert_eq!(board.cell(0, 0), Some(Color::Red));
        assert_eq!(board.cell(0, 4), Some(Color::Purple));
        assert_eq!(board.cell(1, 0), None);
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["RGX"]);
        assert_eq!(
            result,
            Err(BoardError::UnrecognizedGlyph {
                glyph: 'X',
                row: 0,
                col: 2
            })
        );
    }

    #[test]
    fn test_board_from_str_array_with_spaces() {
        let result = board_from_str_array(&["R G"]);
        assert!(result.unwrap_err().to_string().contains("unrecognized character ' '"));
    }

    #[test]
    fn test_board_from_str_array_empty_input() {
        let rows: [&str; 0] = [];
        assert!(board_from_str_array(&rows).is_err());
        assert!(board_from_str_array(&["", ""]).is_err());
    }

    #[test]
    fn test_board_from_str_array_partial_rows() {
        let board = board_from_str_array(&["RGY", "B"]).unwrap();
        assert_eq!(board.cell(1, 0), Some(Color::Blue));
        assert_eq!(board.cell(1, 2), None);
    }

    #[test]
    fn test_board_from_text_skips_blank_lines() {
        let board = board_from_text("  RRG\n\nRGG \nBBB\n").unwrap();
        assert_eq!(board.rows(), 3);
        assert_eq!(board.cell(2, 2), Some(Color::Blue));
    }

    #[test]
    fn test_board_from_text_rejects_ragged_rows() {
        let result = board_from_text("RRG\nRG\n");
        assert_eq!(
            result,
            Err(BoardError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
    }
}
