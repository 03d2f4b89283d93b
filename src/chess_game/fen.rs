use super::game_state::Game;
use super::model::{ChessSquare, Color, PieceKind};

pub const INITIAL_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Builds a game from Forsyth-Edwards Notation. Castling rights and the en
/// passant square are folded into the per-piece `has_moved` and
/// `just_double_stepped` flags; the clock fields are validated and discarded
/// because the game keeps no halfmove clock.
pub fn from_fen(fen: &str) -> Result<Game, String> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 6 {
        return Err(format!("FEN must have 6 parts, found {}", parts.len()));
    }

    let mut game = Game::empty();
    parse_placement(&mut game, parts[0])?;
    game.side_to_move = match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(format!("Invalid side to move: {}", other)),
    };
    apply_castling_rights(&mut game, parts[2])?;
    apply_en_passant(&mut game, parts[3])?;

    parts[4]
        .parse::<u32>()
        .map_err(|_| format!("Invalid halfmove clock: {}", parts[4]))?;
    game.fullmove_number = parts[5]
        .parse::<u32>()
        .map_err(|_| format!("Invalid fullmove number: {}", parts[5]))?;

    game.refresh_outcome();
    Ok(game)
}

fn parse_placement(game: &mut Game, placement: &str) -> Result<(), String> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(format!(
            "Placement must have 8 rows, found {}",
            rows.len()
        ));
    }

    for (row_index, row) in rows.iter().enumerate() {
        let rank = 7 - row_index as u8;
        let mut file = 0u8;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
                continue;
            }
            if file >= 8 {
                return Err(format!("Row {} overflows the board", row));
            }
            let color = if c.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            let kind = match c.to_ascii_lowercase() {
                'p' => PieceKind::Pawn,
                'n' => PieceKind::Knight,
                'b' => PieceKind::Bishop,
                'r' => PieceKind::Rook,
                'q' => PieceKind::Queen,
                'k' => PieceKind::King,
                other => return Err(format!("Invalid piece character: {}", other)),
            };
            let square = ChessSquare::new(file, rank);
            let id = game.add_piece(kind, color, square);
            // A pawn off its start rank must have moved; everything else is
            // settled by the castling-rights field below.
            if kind == PieceKind::Pawn && rank != color.pawn_start_rank() {
                game.pieces[id].has_moved = true;
            }
            file += 1;
        }
        if file != 8 {
            return Err(format!("Row {} covers {} files instead of 8", row, file));
        }
    }
    Ok(())
}

/// FEN only states which castlings remain possible, while the game tracks
/// `has_moved` per piece. A rook with no right listed is marked moved; a king
/// with neither right (or off its home square) likewise.
fn apply_castling_rights(game: &mut Game, rights: &str) -> Result<(), String> {
    if rights != "-" && rights.chars().any(|c| !"KQkq".contains(c)) {
        return Err(format!("Invalid castling rights: {}", rights));
    }
    for (color, kingside, queenside) in [
        (Color::White, rights.contains('K'), rights.contains('Q')),
        (Color::Black, rights.contains('k'), rights.contains('q')),
    ] {
        let home = color.home_rank();
        mark_moved_unless(game, ChessSquare::new(7, home), PieceKind::Rook, color, kingside);
        mark_moved_unless(game, ChessSquare::new(0, home), PieceKind::Rook, color, queenside);
        mark_moved_unless(
            game,
            ChessSquare::new(4, home),
            PieceKind::King,
            color,
            kingside || queenside,
        );
    }
    Ok(())
}

fn mark_moved_unless(
    game: &mut Game,
    square: ChessSquare,
    kind: PieceKind,
    color: Color,
    keeps_right: bool,
) {
    if keeps_right {
        return;
    }
    if let Some(id) = game.board.piece_at(square) {
        let piece = &mut game.pieces[id];
        if piece.kind == kind && piece.color == color {
            piece.has_moved = true;
        }
    }
}

fn apply_en_passant(game: &mut Game, field: &str) -> Result<(), String> {
    if field == "-" {
        return Ok(());
    }
    let behind = ChessSquare::try_from_algebraic(field)
        .ok_or_else(|| format!("Invalid en passant square: {}", field))?;
    // The capturable pawn sits one rank in front of the listed square, from
    // the double-stepping side's point of view.
    let mover = match behind.rank {
        2 => Color::White,
        5 => Color::Black,
        _ => return Err(format!("Invalid en passant square: {}", field)),
    };
    let pawn_square = ChessSquare::new(behind.file, (behind.rank as isize + mover.forward()) as u8);
    let id = game
        .board
        .piece_at(pawn_square)
        .filter(|&id| {
            game.pieces[id].kind == PieceKind::Pawn && game.pieces[id].color == mover
        })
        .ok_or_else(|| format!("En passant square {} has no matching pawn", field))?;
    game.pieces[id].just_double_stepped = true;
    game.pieces[id].has_moved = true;
    Ok(())
}

/// True iff `color` could still castle with the rook on `rook_file` at some
/// point: both the king and that rook are on their home squares and unmoved.
pub(super) fn has_castle_right(game: &Game, color: Color, rook_file: u8) -> bool {
    let home = color.home_rank();
    let king_ready = game
        .board
        .piece_at(ChessSquare::new(4, home))
        .map(|id| {
            let king = &game.pieces[id];
            king.kind == PieceKind::King && king.color == color && !king.has_moved
        })
        .unwrap_or(false);
    king_ready && game.castle_rook_ready(color, rook_file)
}

pub fn to_fen(game: &Game) -> String {
    let mut placement = String::new();
    for rank in (0..8u8).rev() {
        let mut empty_run = 0;
        for file in 0..8u8 {
            match game.board.piece_at(ChessSquare::new(file, rank)) {
                Some(id) => {
                    if empty_run > 0 {
                        placement.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    placement.push(game.pieces[id].to_char());
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            placement.push_str(&empty_run.to_string());
        }
        if rank > 0 {
            placement.push('/');
        }
    }

    let side = match game.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };

    let mut rights = String::new();
    if has_castle_right(game, Color::White, 7) {
        rights.push('K');
    }
    if has_castle_right(game, Color::White, 0) {
        rights.push('Q');
    }
    if has_castle_right(game, Color::Black, 7) {
        rights.push('k');
    }
    if has_castle_right(game, Color::Black, 0) {
        rights.push('q');
    }
    if rights.is_empty() {
        rights.push('-');
    }

    let en_passant = game
        .pieces
        .iter()
        .find(|p| p.alive && p.just_double_stepped)
        .map(|p| {
            ChessSquare::new(p.square.file, (p.square.rank as isize - p.color.forward()) as u8)
                .as_algebraic()
        })
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} {} {} {} 0 {}",
        placement,
        side,
        rights,
        en_passant,
        game.fullmove_number()
    )
}
