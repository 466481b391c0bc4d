//! Rules-enforcement engine for a two-player chess match.
//!
//! [`game_logic::ChessMatch`] owns the authoritative state of a single game
//! and guarantees that every accepted move is legal under standard chess
//! rules, including castling, en passant, and check/checkmate detection.
//! The [`terminal`] module provides an interactive console front-end on top
//! of it.

pub mod board;
pub mod game_logic;
pub mod movegen;
pub mod piece;
pub mod terminal;

pub use board::{Board, ChessSquare, Position};
pub use game_logic::{ChessMatch, IllegalMove, InvalidState, MatchError};
pub use piece::{Color, Piece, PieceId, PieceKind};
