//! Interactive terminal front-end for playing a match.
//!
//! Prompts for origin and destination squares, highlights the selected
//! piece's reachable squares with ANSI backgrounds, and reports illegal
//! moves with their reason. All rule enforcement lives in
//! [`ChessMatch`]; this module only renders and relays input.

use std::io::{self, Write};

use crate::board::{BOARD_SIZE, ChessSquare, Position};
use crate::game_logic::ChessMatch;
use crate::movegen::MoveMatrix;
use crate::piece::{Color, Piece, PieceKind};

/// Clears the screen and moves cursor to top-left.
#[inline]
fn clear_screen() {
    print!("\x1B[2J\x1B[H");
}

/// Runs the interactive match loop until checkmate or quit.
pub fn run_interactive_terminal() {
    let mut game = ChessMatch::new();

    clear_screen();
    if let Err(e) = draw_interface(&mut io::stdout(), &game, None) {
        eprintln!("Failed to draw board: {e}");
        return;
    }

    loop {
        if game.is_finished() {
            println!("Checkmate! {} wins.", game.active_color());
            break;
        }

        let Some(input) = read_input("origin") else {
            break;
        };
        match input.as_str() {
            "" => continue,
            "q" => break,
            _ => {}
        }
        let origin = match input.parse::<ChessSquare>() {
            Ok(square) => square,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if let Err(e) = game.validate_origin(origin.to_position()) {
            println!("{e}");
            continue;
        }
        let Ok(matrix) = game.reachable_from(origin.to_position()) else {
            continue;
        };

        clear_screen();
        if let Err(e) = draw_interface(&mut io::stdout(), &game, Some(&matrix)) {
            eprintln!("Failed to draw board: {e}");
            break;
        }

        let Some(input) = read_input("destination") else {
            break;
        };
        let outcome = match input.as_str() {
            "" | "c" => Ok(()),
            "q" => break,
            _ => match input.parse::<ChessSquare>() {
                Ok(destination) => game
                    .perform_move(origin.to_position(), destination.to_position())
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            },
        };

        clear_screen();
        if let Err(e) = draw_interface(&mut io::stdout(), &game, None) {
            eprintln!("Failed to draw board: {e}");
            break;
        }
        if let Err(message) = outcome {
            println!("{message}");
        }
    }
}

/// Prompt for one line of input. Returns `None` on I/O failure or EOF.
fn read_input(label: &str) -> Option<String> {
    print!("{label}> ");
    if let Err(e) = io::stdout().flush() {
        eprintln!("Failed to flush stdout: {e}");
        return None;
    }

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) => None,
        Ok(_) => Some(input.trim().to_string()),
        Err(e) => {
            eprintln!("Failed to read input: {e}");
            None
        }
    }
}

/// Draws the complete interface: help text, board, and match status.
/// Extracted over a writer for testability.
fn draw_interface(
    w: &mut impl Write,
    game: &ChessMatch,
    highlight: Option<&MoveMatrix>,
) -> io::Result<()> {
    writeln!(w, "♟  Chess Match")?;
    writeln!(w)?;
    writeln!(w, "Commands: <square> (e.g. e2) | c (cancel) | q (quit)")?;
    writeln!(w)?;

    writeln!(w, "╔═══╦═════════════════════════╗")?;
    for row in 0..BOARD_SIZE {
        write!(w, "║ {} ║", 8 - row)?;
        for col in 0..BOARD_SIZE {
            let pos = Position::new(row as i8, col as i8);
            write!(w, "{}", format_square(game, pos, highlight))?;
        }
        writeln!(w, " ║")?;
    }
    writeln!(w, "╠═══╬═════════════════════════╣")?;
    writeln!(w, "║   ║ a  b  c  d  e  f  g  h  ║")?;
    writeln!(w, "╚═══╩═════════════════════════╝")?;

    writeln!(
        w,
        "Turn {:02} | {} to move{}",
        game.turn(),
        game.active_color(),
        if game.in_check() { " | CHECK" } else { "" }
    )?;
    writeln!(
        w,
        "Captured: White [{}] | Black [{}]",
        captured_glyphs(game, Color::White),
        captured_glyphs(game, Color::Black)
    )?;
    w.flush()
}

/// Render one cell, with an ANSI background when it is a reachable target:
/// blue for a free square, red for a capture.
fn format_square(game: &ChessMatch, pos: Position, highlight: Option<&MoveMatrix>) -> String {
    let occupant = game.board().piece_at(pos);
    let cell = match occupant {
        Some(id) => format!(" {} ", glyph(game.piece(id))),
        None => " · ".to_string(),
    };
    match highlight {
        Some(matrix) if matrix.is_marked(pos) => {
            let background = if occupant.is_some() {
                "\x1b[41m"
            } else {
                "\x1b[44m"
            };
            format!("{background}{cell}\x1b[0m")
        }
        _ => cell,
    }
}

/// Letter for a piece: uppercase White, lowercase Black.
fn glyph(piece: &Piece) -> char {
    match (piece.kind(), piece.color()) {
        (PieceKind::Pawn, Color::White) => 'P',
        (PieceKind::Knight, Color::White) => 'N',
        (PieceKind::Bishop, Color::White) => 'B',
        (PieceKind::Rook, Color::White) => 'R',
        (PieceKind::Queen, Color::White) => 'Q',
        (PieceKind::King, Color::White) => 'K',
        (PieceKind::Pawn, Color::Black) => 'p',
        (PieceKind::Knight, Color::Black) => 'n',
        (PieceKind::Bishop, Color::Black) => 'b',
        (PieceKind::Rook, Color::Black) => 'r',
        (PieceKind::Queen, Color::Black) => 'q',
        (PieceKind::King, Color::Black) => 'k',
    }
}

fn captured_glyphs(game: &ChessMatch, color: Color) -> String {
    let mut glyphs: Vec<char> = game
        .captured_pieces(color)
        .into_iter()
        .map(|id| glyph(game.piece(id)))
        .collect();
    glyphs.sort_unstable();
    glyphs.into_iter().collect()
}
