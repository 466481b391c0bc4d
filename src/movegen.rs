//! Per-kind legal-move generation.
//!
//! Each piece kind produces a [`MoveMatrix`]: a boolean reachability grid
//! over the board given the current occupancy and the match context
//! (en-passant target, check flag). Generation is purely positional; the
//! self-check rule is enforced afterwards by the match controller.

use crate::board::{BOARD_SIZE, Board, Position};
use crate::piece::{Color, Piece, PieceId, PieceKind};

/// Boolean reachability grid: one flag per board square.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveMatrix([[bool; BOARD_SIZE]; BOARD_SIZE]);

impl MoveMatrix {
    fn mark(&mut self, pos: Position) {
        debug_assert!(Board::in_bounds(pos));
        self.0[pos.row as usize][pos.col as usize] = true;
    }

    /// Whether `pos` is a reachable target. Off-board positions are not.
    #[inline]
    pub fn is_marked(&self, pos: Position) -> bool {
        Board::in_bounds(pos) && self.0[pos.row as usize][pos.col as usize]
    }

    /// Whether any square is reachable at all.
    pub fn any(&self) -> bool {
        self.0.iter().flatten().any(|&marked| marked)
    }

    /// All reachable squares in row-major order.
    pub fn marked_squares(&self) -> impl Iterator<Item = Position> + '_ {
        self.0.iter().enumerate().flat_map(|(row, squares)| {
            squares
                .iter()
                .enumerate()
                .filter_map(move |(col, &marked)| {
                    marked.then(|| Position::new(row as i8, col as i8))
                })
        })
    }
}

/// Read-only view of the match that move generation is allowed to see:
/// board occupancy, the piece arena, and the en-passant/check context.
///
/// Pieces never hold a reference back to the match; the controller builds
/// this context per query instead.
#[derive(Clone, Copy)]
pub struct MoveContext<'a> {
    pub(crate) board: &'a Board,
    pub(crate) pieces: &'a [Piece],
    pub(crate) en_passant_target: Option<PieceId>,
    pub(crate) in_check: bool,
}

impl MoveContext<'_> {
    fn occupant(&self, pos: Position) -> Option<&Piece> {
        self.board.piece_at(pos).map(|id| &self.pieces[id.index()])
    }

    fn is_free(&self, pos: Position) -> bool {
        Board::in_bounds(pos) && self.board.piece_at(pos).is_none()
    }

    fn holds_enemy_of(&self, pos: Position, color: Color) -> bool {
        self.occupant(pos).is_some_and(|piece| piece.color() != color)
    }

    fn free_or_enemy_of(&self, pos: Position, color: Color) -> bool {
        Board::in_bounds(pos) && self.occupant(pos).is_none_or(|piece| piece.color() != color)
    }
}

const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Compute the reachability matrix for `piece` in the given context.
pub fn reachable_squares(piece: &Piece, ctx: &MoveContext<'_>) -> MoveMatrix {
    match piece.kind() {
        PieceKind::Pawn => pawn_moves(piece, ctx),
        PieceKind::Knight => leap_moves(piece, ctx, &KNIGHT_JUMPS),
        PieceKind::Bishop => slide_moves(piece, ctx, &DIAGONAL),
        PieceKind::Rook => slide_moves(piece, ctx, &ORTHOGONAL),
        PieceKind::Queen => slide_moves(piece, ctx, &ALL_DIRECTIONS),
        PieceKind::King => king_moves(piece, ctx),
    }
}

/// Single-step jumps to any free or enemy-occupied target (knight, king step).
fn leap_moves(piece: &Piece, ctx: &MoveContext<'_>, offsets: &[(i8, i8)]) -> MoveMatrix {
    let mut matrix = MoveMatrix::default();
    for &(d_row, d_col) in offsets {
        let target = piece.position().offset(d_row, d_col);
        if ctx.free_or_enemy_of(target, piece.color()) {
            matrix.mark(target);
        }
    }
    matrix
}

/// Ray scans that stop at the first occupied square, including it when it
/// holds an enemy piece (bishop, rook, queen).
fn slide_moves(piece: &Piece, ctx: &MoveContext<'_>, directions: &[(i8, i8)]) -> MoveMatrix {
    let mut matrix = MoveMatrix::default();
    for &(d_row, d_col) in directions {
        let mut target = piece.position().offset(d_row, d_col);
        while ctx.is_free(target) {
            matrix.mark(target);
            target = target.offset(d_row, d_col);
        }
        if ctx.holds_enemy_of(target, piece.color()) {
            matrix.mark(target);
        }
    }
    matrix
}

fn pawn_moves(piece: &Piece, ctx: &MoveContext<'_>) -> MoveMatrix {
    let mut matrix = MoveMatrix::default();
    let pos = piece.position();
    let color = piece.color();
    // White advances toward row 0, Black toward row 7.
    let forward: i8 = match color {
        Color::White => -1,
        Color::Black => 1,
    };

    let one_ahead = pos.offset(forward, 0);
    if ctx.is_free(one_ahead) {
        matrix.mark(one_ahead);
        let two_ahead = pos.offset(2 * forward, 0);
        if piece.move_count() == 0 && ctx.is_free(two_ahead) {
            matrix.mark(two_ahead);
        }
    }

    for d_col in [-1, 1] {
        let diagonal = pos.offset(forward, d_col);
        if ctx.holds_enemy_of(diagonal, color) {
            matrix.mark(diagonal);
        }
    }

    // En passant: only from the capturing pawn's fifth rank, against the
    // adjacent pawn currently tracked as the en-passant target.
    let fifth_rank: i8 = match color {
        Color::White => 3,
        Color::Black => 4,
    };
    if pos.row == fifth_rank
        && let Some(target) = ctx.en_passant_target
    {
        for d_col in [-1, 1] {
            let beside = pos.offset(0, d_col);
            if ctx.board.piece_at(beside) == Some(target) {
                matrix.mark(beside.offset(forward, 0));
            }
        }
    }

    matrix
}

fn king_moves(piece: &Piece, ctx: &MoveContext<'_>) -> MoveMatrix {
    let mut matrix = leap_moves(piece, ctx, &ALL_DIRECTIONS);

    // Castling: untouched king and rook, clear corridor, and not while in
    // check. Landing in check is rejected by the controller's self-check
    // guard like any other move.
    if piece.move_count() == 0 && !ctx.in_check {
        let pos = piece.position();
        if is_castling_rook(ctx, pos.offset(0, 3), piece.color())
            && ctx.is_free(pos.offset(0, 1))
            && ctx.is_free(pos.offset(0, 2))
        {
            matrix.mark(pos.offset(0, 2));
        }
        if is_castling_rook(ctx, pos.offset(0, -4), piece.color())
            && ctx.is_free(pos.offset(0, -1))
            && ctx.is_free(pos.offset(0, -2))
            && ctx.is_free(pos.offset(0, -3))
        {
            matrix.mark(pos.offset(0, -2));
        }
    }

    matrix
}

fn is_castling_rook(ctx: &MoveContext<'_>, pos: Position, color: Color) -> bool {
    ctx.occupant(pos).is_some_and(|piece| {
        piece.kind() == PieceKind::Rook && piece.color() == color && piece.move_count() == 0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ChessSquare;
    use crate::game_logic::ChessMatch;
    use test_case::test_case;

    fn square(notation: &str) -> Position {
        notation
            .parse::<ChessSquare>()
            .expect("valid square")
            .to_position()
    }

    fn place(game: &mut ChessMatch, notation: &str, color: Color, kind: PieceKind) {
        let sq = notation.parse::<ChessSquare>().expect("valid square");
        game.place_new_piece(sq, color, kind).expect("free square");
    }

    fn matrix_for(game: &ChessMatch, notation: &str) -> MoveMatrix {
        game.reachable_from(square(notation)).expect("piece exists")
    }

    #[test]
    fn pawn_from_start_has_single_and_double_step() {
        let game = ChessMatch::new();
        let matrix = matrix_for(&game, "e2");

        assert!(matrix.is_marked(square("e3")));
        assert!(matrix.is_marked(square("e4")));
        assert_eq!(matrix.marked_squares().count(), 2);
    }

    #[test]
    fn blocked_pawn_has_no_moves() {
        let mut game = ChessMatch::empty();
        place(&mut game, "e2", Color::White, PieceKind::Pawn);
        place(&mut game, "e3", Color::Black, PieceKind::Knight);

        assert!(!matrix_for(&game, "e2").any());
    }

    #[test]
    fn pawn_captures_diagonally_only() {
        let mut game = ChessMatch::empty();
        place(&mut game, "e4", Color::White, PieceKind::Pawn);
        place(&mut game, "d5", Color::Black, PieceKind::Pawn);
        place(&mut game, "f5", Color::White, PieceKind::Knight);

        let matrix = matrix_for(&game, "e4");
        assert!(matrix.is_marked(square("d5")), "enemy piece is capturable");
        assert!(!matrix.is_marked(square("f5")), "own piece is not");
        assert!(matrix.is_marked(square("e5")));
    }

    #[test_case("a1", 2; "corner")]
    #[test_case("d4", 8; "center")]
    fn knight_jump_count(from: &str, expected: usize) {
        let mut game = ChessMatch::empty();
        place(&mut game, from, Color::White, PieceKind::Knight);

        assert_eq!(matrix_for(&game, from).marked_squares().count(), expected);
    }

    #[test]
    fn rook_ray_stops_at_blockers() {
        let mut game = ChessMatch::empty();
        place(&mut game, "d4", Color::White, PieceKind::Rook);
        place(&mut game, "d7", Color::Black, PieceKind::Pawn);
        place(&mut game, "f4", Color::White, PieceKind::Pawn);

        let matrix = matrix_for(&game, "d4");
        assert!(matrix.is_marked(square("d6")));
        assert!(matrix.is_marked(square("d7")), "enemy blocker is capturable");
        assert!(!matrix.is_marked(square("d8")), "ray stops behind the enemy");
        assert!(matrix.is_marked(square("e4")));
        assert!(!matrix.is_marked(square("f4")), "own blocker is excluded");
    }

    #[test]
    fn queen_covers_both_ray_families() {
        let mut game = ChessMatch::empty();
        place(&mut game, "d4", Color::White, PieceKind::Queen);

        let matrix = matrix_for(&game, "d4");
        assert!(matrix.is_marked(square("d8")));
        assert!(matrix.is_marked(square("h8")));
        assert!(matrix.is_marked(square("a1")));
        assert_eq!(matrix.marked_squares().count(), 27);
    }

    #[test]
    fn bishop_stays_on_diagonals() {
        let mut game = ChessMatch::empty();
        place(&mut game, "c1", Color::White, PieceKind::Bishop);

        let matrix = matrix_for(&game, "c1");
        assert!(matrix.is_marked(square("h6")));
        assert!(!matrix.is_marked(square("c4")));
    }

    #[test]
    fn king_steps_one_square() {
        let mut game = ChessMatch::empty();
        place(&mut game, "d4", Color::White, PieceKind::King);

        assert_eq!(matrix_for(&game, "d4").marked_squares().count(), 8);
    }

    #[test]
    fn castling_squares_available_when_untouched() {
        let mut game = ChessMatch::empty();
        place(&mut game, "e1", Color::White, PieceKind::King);
        place(&mut game, "h1", Color::White, PieceKind::Rook);
        place(&mut game, "a1", Color::White, PieceKind::Rook);

        let matrix = matrix_for(&game, "e1");
        assert!(matrix.is_marked(square("g1")), "kingside castle");
        assert!(matrix.is_marked(square("c1")), "queenside castle");
    }

    #[test]
    fn castling_blocked_by_intervening_piece() {
        let mut game = ChessMatch::empty();
        place(&mut game, "e1", Color::White, PieceKind::King);
        place(&mut game, "h1", Color::White, PieceKind::Rook);
        place(&mut game, "b1", Color::White, PieceKind::Knight);
        place(&mut game, "a1", Color::White, PieceKind::Rook);

        let matrix = matrix_for(&game, "e1");
        assert!(matrix.is_marked(square("g1")));
        assert!(!matrix.is_marked(square("c1")), "b1 knight blocks queenside");
    }

    #[test]
    fn no_castling_in_initial_position_corridor() {
        let game = ChessMatch::new();
        let matrix = matrix_for(&game, "e1");

        assert!(!matrix.any(), "boxed-in king has no moves at the start");
    }
}
