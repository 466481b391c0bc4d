use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::piece::PieceId;

/// Number of rows and columns on the board.
pub const BOARD_SIZE: usize = 8;

/// Zero-based board coordinate.
///
/// Row 0 is Black's back rank (rank 8), row 7 is White's back rank (rank 1).
/// Signed components so move generation can step off the edge and let the
/// bounds check reject the result, rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    #[inline]
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// The position shifted by the given row/column deltas. May be off the board.
    #[inline]
    pub const fn offset(self, d_row: i8, d_col: i8) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match ChessSquare::from_position(*self) {
            Some(square) => write!(f, "{square}"),
            None => write!(f, "({}, {})", self.row, self.col),
        }
    }
}

/// Human-facing square notation: file letter (`'a'..='h'`) and rank number (1–8).
///
/// Maps bidirectionally to [`Position`]; used by setup, tests, and the
/// terminal front-end. Parsing full move notation is out of scope, only
/// single squares like `"e4"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChessSquare {
    file: char,
    rank: u8,
}

impl ChessSquare {
    pub const fn new(file: char, rank: u8) -> Option<Self> {
        if matches!(file, 'a'..='h') && matches!(rank, 1..=8) {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    #[inline]
    pub const fn file(self) -> char {
        self.file
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// Convert to the zero-based grid coordinate (rank 8 is row 0).
    pub const fn to_position(self) -> Position {
        Position {
            row: (8 - self.rank) as i8,
            col: (self.file as u8 - b'a') as i8,
        }
    }

    /// Convert from a grid coordinate. Returns `None` if it is off the board.
    pub const fn from_position(pos: Position) -> Option<Self> {
        if pos.row < 0 || pos.row >= 8 || pos.col < 0 || pos.col >= 8 {
            return None;
        }
        Some(Self {
            file: (b'a' + pos.col as u8) as char,
            rank: 8 - pos.row as u8,
        })
    }
}

impl fmt::Display for ChessSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file, self.rank)
    }
}

/// Error when parsing a square from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid square notation: '{0}'")]
pub struct ParseSquareError(String);

impl FromStr for ChessSquare {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next())
            && let Some(rank) = rank.to_digit(10)
            && let Some(square) = Self::new(file, rank as u8)
        {
            return Ok(square);
        }
        Err(ParseSquareError(s.to_string()))
    }
}

/// Error from a board placement operation.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("position {0} is off the board")]
    OutOfBounds(Position),
    #[error("position {0} is already occupied")]
    Occupied(Position),
}

/// Fixed-size grid holding at most one piece id per square.
///
/// The board only tracks occupancy; piece attributes (color, kind, move
/// counter) live in the match's piece arena, addressed by [`PieceId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<PieceId>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub const fn in_bounds(pos: Position) -> bool {
        pos.row >= 0 && (pos.row as usize) < BOARD_SIZE && pos.col >= 0 && (pos.col as usize) < BOARD_SIZE
    }

    /// The piece occupying `pos`, if any. Off-board positions read as empty.
    #[inline]
    pub fn piece_at(&self, pos: Position) -> Option<PieceId> {
        if Self::in_bounds(pos) {
            self.squares[pos.row as usize][pos.col as usize]
        } else {
            None
        }
    }

    /// Place a piece on an empty square.
    pub fn place(&mut self, id: PieceId, pos: Position) -> Result<(), BoardError> {
        if !Self::in_bounds(pos) {
            return Err(BoardError::OutOfBounds(pos));
        }
        let square = &mut self.squares[pos.row as usize][pos.col as usize];
        if square.is_some() {
            return Err(BoardError::Occupied(pos));
        }
        *square = Some(id);
        Ok(())
    }

    /// Remove and return the piece at `pos`, if any.
    pub fn remove(&mut self, pos: Position) -> Option<PieceId> {
        if Self::in_bounds(pos) {
            self.squares[pos.row as usize][pos.col as usize].take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("a1", 7, 0; "corner a1")]
    #[test_case("h8", 0, 7; "corner h8")]
    #[test_case("e2", 6, 4; "white pawn square")]
    #[test_case("e4", 4, 4; "center square")]
    fn square_maps_to_grid_coordinate(notation: &str, row: i8, col: i8) {
        let square: ChessSquare = notation.parse().expect("valid square");
        assert_eq!(square.to_position(), Position::new(row, col));
        assert_eq!(
            ChessSquare::from_position(Position::new(row, col)),
            Some(square)
        );
    }

    #[test_case(""; "empty")]
    #[test_case("e"; "too short")]
    #[test_case("e44"; "too long")]
    #[test_case("i4"; "file out of range")]
    #[test_case("e9"; "rank out of range")]
    #[test_case("4e"; "swapped")]
    fn invalid_notation_is_rejected(notation: &str) {
        assert_eq!(
            notation.parse::<ChessSquare>(),
            Err(ParseSquareError(notation.to_string()))
        );
    }

    #[test]
    fn place_and_remove_round_trip() {
        let mut board = Board::new();
        let pos = Position::new(3, 3);
        let id = PieceId::new(7);

        board.place(id, pos).expect("square is free");
        assert_eq!(board.piece_at(pos), Some(id));
        assert_eq!(board.remove(pos), Some(id));
        assert_eq!(board.piece_at(pos), None);
    }

    #[test]
    fn place_on_occupied_square_fails() {
        let mut board = Board::new();
        let pos = Position::new(0, 0);
        board.place(PieceId::new(0), pos).expect("square is free");

        assert_eq!(
            board.place(PieceId::new(1), pos),
            Err(BoardError::Occupied(pos))
        );
    }

    #[test]
    fn place_off_board_fails() {
        let mut board = Board::new();
        let pos = Position::new(8, 0);

        assert_eq!(
            board.place(PieceId::new(0), pos),
            Err(BoardError::OutOfBounds(pos))
        );
        assert_eq!(board.piece_at(pos), None);
        assert_eq!(board.remove(pos), None);
    }
}
