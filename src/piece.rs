use std::fmt;

use crate::board::Position;

/// Side of the match a piece belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// Closed set of piece variants. Behavior differences (move generation,
/// castling and en-passant handling) match on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Stable identifier of a piece in the match's arena.
///
/// Ids are handed out at placement time and never reused; captured pieces
/// keep their id so undo can resurrect them exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(u32);

impl PieceId {
    #[inline]
    pub(crate) const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A piece's attributes: color, kind, current position, and how many times
/// it has moved. The move counter is what gates castling and the pawn
/// double step, and it is decremented on undo so a speculative
/// apply-then-undo pair is net neutral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    color: Color,
    kind: PieceKind,
    position: Position,
    moves: u32,
}

impl Piece {
    pub(crate) const fn new(color: Color, kind: PieceKind, position: Position) -> Self {
        Self {
            color,
            kind,
            position,
            moves: 0,
        }
    }

    #[inline]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub const fn move_count(&self) -> u32 {
        self.moves
    }

    #[inline]
    pub(crate) const fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    #[inline]
    pub(crate) const fn record_move(&mut self) {
        self.moves += 1;
    }

    #[inline]
    pub(crate) const fn unrecord_move(&mut self) {
        self.moves -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_alternates() {
        assert_eq!(Color::White.opponent(), Color::Black);
        assert_eq!(Color::Black.opponent(), Color::White);
        assert_eq!(Color::White.opponent().opponent(), Color::White);
    }

    #[test]
    fn move_counter_round_trips() {
        let mut piece = Piece::new(Color::White, PieceKind::Pawn, Position::new(6, 4));
        assert_eq!(piece.move_count(), 0);

        piece.record_move();
        piece.record_move();
        piece.unrecord_move();
        assert_eq!(piece.move_count(), 1);
    }
}
