//! The match-state machine: move execution and exact inverse undo, check
//! and checkmate detection, turn alternation, and termination.

use std::collections::HashSet;

use thiserror::Error;

use crate::board::{Board, BoardError, ChessSquare, Position};
use crate::movegen::{MoveContext, MoveMatrix, reachable_squares};
use crate::piece::{Color, Piece, PieceId, PieceKind};

/// A requested move that violates the rules. The board is never left
/// partially mutated when one of these is returned.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("no piece on the chosen origin square")]
    VacantOrigin,
    #[error("the chosen piece belongs to the opponent")]
    OpponentPiece,
    #[error("the chosen piece has no reachable squares")]
    NoReachableSquares,
    #[error("the chosen piece cannot reach the destination square")]
    UnreachableDestination,
    #[error("the move would leave your own king in check")]
    SelfCheck,
}

/// A match invariant is broken independent of caller input.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidState {
    #[error("no piece to move on {0}")]
    VacantSquare(Position),
    #[error("no {0} king on the board")]
    MissingKing(Color),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Any failure surfaced by the match controller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalMove),
    #[error("invalid match state: {0}")]
    InvalidState(#[from] InvalidState),
}

/// Authoritative state of a single two-player match.
///
/// Owns the board grid and the piece arena. Pieces are registered once and
/// never destroyed: capturing moves an id into the captured set and clears
/// its square, so undo can resurrect it with its exact prior position and
/// move count. In-play pieces of a color are the registry minus the
/// captured set.
#[derive(Debug)]
pub struct ChessMatch {
    board: Board,
    pieces: Vec<Piece>,
    captured: HashSet<PieceId>,
    turn: u32,
    active_color: Color,
    finished: bool,
    in_check: bool,
    en_passant_target: Option<PieceId>,
}

impl Default for ChessMatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessMatch {
    const BACK_RANK: [PieceKind; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    /// A match in the standard 32-piece starting position, White to move.
    pub fn new() -> Self {
        let mut game = Self::empty();
        game.setup_standard_position();
        game
    }

    /// A match with no pieces on the board. Populate it with
    /// [`ChessMatch::place_new_piece`] to play out a custom position.
    pub fn empty() -> Self {
        Self {
            board: Board::new(),
            pieces: Vec::new(),
            captured: HashSet::new(),
            turn: 1,
            active_color: Color::White,
            finished: false,
            in_check: false,
            en_passant_target: None,
        }
    }

    fn setup_standard_position(&mut self) {
        for (color, back_rank, pawn_rank) in [(Color::White, 1, 2), (Color::Black, 8, 7)] {
            for (col, &kind) in Self::BACK_RANK.iter().enumerate() {
                let file = (b'a' + col as u8) as char;
                let back = ChessSquare::new(file, back_rank).expect("standard square is valid");
                let pawn = ChessSquare::new(file, pawn_rank).expect("standard square is valid");
                self.place_new_piece(back, color, kind)
                    .expect("standard square starts free");
                self.place_new_piece(pawn, color, PieceKind::Pawn)
                    .expect("standard square starts free");
            }
        }
    }

    /// Register a new piece and place it on the board. Setup-only by
    /// contract; not meant to be called once play has started.
    pub fn place_new_piece(
        &mut self,
        square: ChessSquare,
        color: Color,
        kind: PieceKind,
    ) -> Result<PieceId, BoardError> {
        let position = square.to_position();
        let id = PieceId::new(self.pieces.len() as u32);
        self.board.place(id, position)?;
        self.pieces.push(Piece::new(color, kind, position));
        Ok(id)
    }

    // --- accessors ---

    /// Read-only view of the board grid.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Read a piece from the arena. Captured pieces remain addressable.
    #[inline]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.index()]
    }

    /// Turn counter. Starts at 1 and increments on every completed,
    /// non-terminating move.
    #[inline]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// The side permitted to move this turn.
    #[inline]
    pub const fn active_color(&self) -> Color {
        self.active_color
    }

    #[inline]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Check flag for the side now to move, as computed after the last
    /// completed move. Not recomputed on read.
    #[inline]
    pub const fn in_check(&self) -> bool {
        self.in_check
    }

    /// Pieces of `color` that have left the board.
    pub fn captured_pieces(&self, color: Color) -> HashSet<PieceId> {
        self.captured
            .iter()
            .copied()
            .filter(|id| self.pieces[id.index()].color() == color)
            .collect()
    }

    /// Pieces of `color` still on the board.
    pub fn pieces_in_play(&self, color: Color) -> HashSet<PieceId> {
        self.in_play_ids(color).collect()
    }

    fn in_play_ids(&self, color: Color) -> impl Iterator<Item = PieceId> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter_map(move |(index, piece)| {
                let id = PieceId::new(index as u32);
                (piece.color() == color && !self.captured.contains(&id)).then_some(id)
            })
    }

    fn move_context(&self) -> MoveContext<'_> {
        MoveContext {
            board: &self.board,
            pieces: &self.pieces,
            en_passant_target: self.en_passant_target,
            in_check: self.in_check,
        }
    }

    /// Reachability matrix of the piece on `origin`, for legality preview.
    pub fn reachable_from(&self, origin: Position) -> Result<MoveMatrix, IllegalMove> {
        let id = self
            .board
            .piece_at(origin)
            .ok_or(IllegalMove::VacantOrigin)?;
        Ok(reachable_squares(
            &self.pieces[id.index()],
            &self.move_context(),
        ))
    }

    // --- move orchestration ---

    /// Validate that `pos` holds a piece of the active color with at least
    /// one reachable square.
    pub fn validate_origin(&self, pos: Position) -> Result<(), IllegalMove> {
        let id = self.board.piece_at(pos).ok_or(IllegalMove::VacantOrigin)?;
        let piece = &self.pieces[id.index()];
        if piece.color() != self.active_color {
            return Err(IllegalMove::OpponentPiece);
        }
        if !reachable_squares(piece, &self.move_context()).any() {
            return Err(IllegalMove::NoReachableSquares);
        }
        Ok(())
    }

    /// Validate that the piece on `origin` can reach `destination`.
    pub fn validate_destination(
        &self,
        origin: Position,
        destination: Position,
    ) -> Result<(), IllegalMove> {
        if !self.reachable_from(origin)?.is_marked(destination) {
            return Err(IllegalMove::UnreachableDestination);
        }
        Ok(())
    }

    /// Perform one full move for the active color.
    ///
    /// Validates both squares before touching the board. The one rule that
    /// cannot be validated up front, leaving one's own king in check, is
    /// detected by applying the move, testing, and undoing before the
    /// error is returned. On a checkmating move the match finishes and the
    /// turn counter and active color stay put.
    pub fn perform_move(
        &mut self,
        origin: Position,
        destination: Position,
    ) -> Result<(), MatchError> {
        self.validate_origin(origin)?;
        self.validate_destination(origin, destination)?;

        let captured = self.apply_move(origin, destination)?;
        if self.is_in_check(self.active_color)? {
            self.undo_move(origin, destination, captured)?;
            return Err(IllegalMove::SelfCheck.into());
        }
        log::debug!("{} plays {origin} -> {destination}", self.active_color);

        let opponent = self.active_color.opponent();
        self.in_check = self.is_in_check(opponent)?;
        if self.in_check {
            log::info!("{opponent} is in check");
        }
        if self.is_checkmate(opponent)? {
            log::info!("checkmate on turn {}: {} wins", self.turn, self.active_color);
            self.finished = true;
        } else {
            self.turn += 1;
            self.active_color = opponent;
        }

        // A double-stepped pawn becomes the en-passant target until the
        // next completed move clears it. Updated on the terminating branch
        // as well.
        let mover = self
            .board
            .piece_at(destination)
            .ok_or(InvalidState::VacantSquare(destination))?;
        let double_step = (destination.row - origin.row).abs() == 2;
        self.en_passant_target = (self.pieces[mover.index()].kind() == PieceKind::Pawn
            && double_step)
            .then_some(mover);

        Ok(())
    }

    // --- move executor ---

    /// Place `id` on `pos` and keep its arena record in sync.
    fn put(&mut self, id: PieceId, pos: Position) -> Result<(), InvalidState> {
        self.board.place(id, pos)?;
        self.pieces[id.index()].set_position(pos);
        Ok(())
    }

    fn relocate_rook(
        &mut self,
        from: Position,
        to: Position,
        applying: bool,
    ) -> Result<(), InvalidState> {
        let rook = self
            .board
            .remove(from)
            .ok_or(InvalidState::VacantSquare(from))?;
        if applying {
            self.pieces[rook.index()].record_move();
        } else {
            self.pieces[rook.index()].unrecord_move();
        }
        self.put(rook, to)
    }

    /// Apply a single pre-validated move, returning the captured piece.
    ///
    /// Castling and en passant are recognized structurally: a two-column
    /// king step relocates the matching rook, and a diagonal pawn move
    /// onto an empty square captures the pawn one rank behind the
    /// destination.
    fn apply_move(
        &mut self,
        origin: Position,
        destination: Position,
    ) -> Result<Option<PieceId>, InvalidState> {
        let mover = self
            .board
            .remove(origin)
            .ok_or(InvalidState::VacantSquare(origin))?;
        self.pieces[mover.index()].record_move();
        let mut captured = self.board.remove(destination);
        if let Some(id) = captured {
            self.captured.insert(id);
        }
        self.put(mover, destination)?;

        let kind = self.pieces[mover.index()].kind();
        let color = self.pieces[mover.index()].color();

        if kind == PieceKind::King && destination.col == origin.col + 2 {
            self.relocate_rook(origin.offset(0, 3), origin.offset(0, 1), true)?;
        }
        if kind == PieceKind::King && destination.col == origin.col - 2 {
            self.relocate_rook(origin.offset(0, -4), origin.offset(0, -1), true)?;
        }

        if kind == PieceKind::Pawn && origin.col != destination.col && captured.is_none() {
            let behind = match color {
                Color::White => destination.offset(1, 0),
                Color::Black => destination.offset(-1, 0),
            };
            let pawn = self
                .board
                .remove(behind)
                .ok_or(InvalidState::VacantSquare(behind))?;
            self.captured.insert(pawn);
            captured = Some(pawn);
        }

        Ok(captured)
    }

    /// Exact inverse of [`ChessMatch::apply_move`] on the same arguments
    /// and its returned capture.
    fn undo_move(
        &mut self,
        origin: Position,
        destination: Position,
        captured: Option<PieceId>,
    ) -> Result<(), InvalidState> {
        let mover = self
            .board
            .remove(destination)
            .ok_or(InvalidState::VacantSquare(destination))?;
        self.pieces[mover.index()].unrecord_move();
        if let Some(id) = captured {
            self.put(id, destination)?;
            self.captured.remove(&id);
        }
        self.put(mover, origin)?;

        let kind = self.pieces[mover.index()].kind();
        let color = self.pieces[mover.index()].color();

        if kind == PieceKind::King && destination.col == origin.col + 2 {
            self.relocate_rook(origin.offset(0, 1), origin.offset(0, 3), false)?;
        }
        if kind == PieceKind::King && destination.col == origin.col - 2 {
            self.relocate_rook(origin.offset(0, -1), origin.offset(0, -4), false)?;
        }

        // The generic restore above put an en-passant victim back on the
        // destination square; move it to the rank it was captured from.
        // Gated on the tracked target so a direct capture on that square
        // is not mistaken for en passant.
        if kind == PieceKind::Pawn
            && origin.col != destination.col
            && let Some(id) = captured
            && Some(id) == self.en_passant_target
        {
            let pawn = self
                .board
                .remove(destination)
                .ok_or(InvalidState::VacantSquare(destination))?;
            let row = match color {
                Color::White => 3,
                Color::Black => 4,
            };
            self.put(pawn, Position::new(row, destination.col))?;
        }

        Ok(())
    }

    // --- check detection ---

    fn king_of(&self, color: Color) -> Result<&Piece, InvalidState> {
        self.in_play_ids(color)
            .map(|id| &self.pieces[id.index()])
            .find(|piece| piece.kind() == PieceKind::King)
            .ok_or(InvalidState::MissingKing(color))
    }

    /// Whether the king of `color` is attacked by any opposing in-play
    /// piece.
    pub fn is_in_check(&self, color: Color) -> Result<bool, InvalidState> {
        let king_square = self.king_of(color)?.position();
        let ctx = self.move_context();
        Ok(self
            .in_play_ids(color.opponent())
            .any(|id| reachable_squares(&self.pieces[id.index()], &ctx).is_marked(king_square)))
    }

    /// Whether `color` is in check with no escaping move.
    ///
    /// Speculatively applies every reachable move of every in-play piece
    /// and undoes it after testing. The trials share the live board, so
    /// the search is sequential by design and not reentrant.
    pub fn is_checkmate(&mut self, color: Color) -> Result<bool, InvalidState> {
        if !self.is_in_check(color)? {
            return Ok(false);
        }
        let candidates: Vec<PieceId> = self.in_play_ids(color).collect();
        for id in candidates {
            let targets: Vec<Position> =
                reachable_squares(&self.pieces[id.index()], &self.move_context())
                    .marked_squares()
                    .collect();
            for target in targets {
                let origin = self.pieces[id.index()].position();
                let captured = self.apply_move(origin, target)?;
                let still_in_check = self.is_in_check(color)?;
                self.undo_move(origin, target, captured)?;
                if !still_in_check {
                    log::debug!("{color} escapes check with {origin} -> {target}");
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}
