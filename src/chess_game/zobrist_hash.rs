use super::fen::has_castle_right;
use super::game_state::Game;
use super::model::{Color, PieceKind};
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::sync::Arc;

const BOARD_SIZE: usize = 8;

pub struct ZobristHash {
    piece_keys: [[[u64; BOARD_SIZE * BOARD_SIZE]; 6]; 2],
    side_to_move_key: u64,
    castling_keys: [u64; 4],
    en_passant_keys: [u64; BOARD_SIZE],
}

impl ZobristHash {
    fn new(seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);

        // Random numbers for pieces on squares
        let mut piece_keys = [[[0; BOARD_SIZE * BOARD_SIZE]; 6]; 2];
        for color_keys in &mut piece_keys {
            for piece_kind_keys in color_keys {
                for square_key in piece_kind_keys {
                    *square_key = rng.gen();
                }
            }
        }

        // Random number for side-to-move
        let side_to_move_key = rng.gen();

        // Random numbers for castling rights
        let mut castling_keys = [0; 4];
        for key in &mut castling_keys {
            *key = rng.gen();
        }

        // Random numbers for en passant file
        let mut en_passant_keys = [0; BOARD_SIZE];
        for file in &mut en_passant_keys {
            *file = rng.gen();
        }

        ZobristHash {
            piece_keys,
            side_to_move_key,
            castling_keys,
            en_passant_keys,
        }
    }

    /// Position fingerprint over occupied squares, side to move, remaining
    /// castlings and the open en passant file. Two games with equal hashes
    /// allow the same moves from here on.
    pub fn calculate_hash(&self, game: &Game) -> u64 {
        let mut hash = 0;

        for (square, id) in game.board().occupied_squares() {
            let piece = &game.pieces()[id];
            let color_index = match piece.color {
                Color::White => 0,
                Color::Black => 1,
            };
            let piece_index = match piece.kind {
                PieceKind::Pawn => 0,
                PieceKind::Knight => 1,
                PieceKind::Bishop => 2,
                PieceKind::Rook => 3,
                PieceKind::Queen => 4,
                PieceKind::King => 5,
            };
            let square_index = square.rank as usize * BOARD_SIZE + square.file as usize;
            hash ^= self.piece_keys[color_index][piece_index][square_index];
        }

        if game.side_to_move() == Color::Black {
            hash ^= self.side_to_move_key;
        }

        let castlings = [
            has_castle_right(game, Color::White, 7),
            has_castle_right(game, Color::White, 0),
            has_castle_right(game, Color::Black, 7),
            has_castle_right(game, Color::Black, 0),
        ];
        for (i, castling) in castlings.iter().enumerate() {
            if *castling {
                hash ^= self.castling_keys[i];
            }
        }

        if let Some(pawn) = game.pieces().iter().find(|p| p.alive && p.just_double_stepped) {
            hash ^= self.en_passant_keys[pawn.square.file as usize];
        }

        hash
    }
}

lazy_static! {
    pub static ref ZOBRIST: Arc<ZobristHash> = Arc::new(ZobristHash::new(42));
}
