pub mod fen;
pub mod zobrist_hash;
pub use zobrist_hash::ZobristHash;
pub use zobrist_hash::ZOBRIST;
pub mod model;
pub use model::{
    ChessSquare, Color, MoveKind, MoveOutcome, MoveRecord, Outcome, Piece, PieceId, PieceKind,
    Rejection,
};

mod board;
mod game_state;
mod move_generation;
pub mod test_utils;
pub use board::Board;
pub use game_state::Game;
