use super::game_state::Game;
use super::model::{ChessSquare, Color, MoveKind, MoveRecord, PieceId, PieceKind};

const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
];
const KING_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const BISHOP_DIRECTIONS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROOK_DIRECTIONS: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
const QUEEN_DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
];

impl Game {
    /// All piece-pattern moves from `from`, before the self-check filter.
    /// Castling candidates already include the attacked-transit checks; en
    /// passant and the pawn double step are emitted with their own kinds so
    /// that apply/undo know what to do.
    pub fn pseudo_moves_from(&self, from: ChessSquare) -> Vec<MoveRecord> {
        let Some(piece) = self.board.piece_at(from) else {
            return Vec::new();
        };
        match self.pieces[piece].kind {
            PieceKind::Pawn => self.pawn_moves(piece, from),
            PieceKind::Knight => self.step_moves(piece, from, &KNIGHT_OFFSETS),
            PieceKind::Bishop => self.sliding_moves(piece, from, &BISHOP_DIRECTIONS),
            PieceKind::Rook => self.sliding_moves(piece, from, &ROOK_DIRECTIONS),
            PieceKind::Queen => self.sliding_moves(piece, from, &QUEEN_DIRECTIONS),
            PieceKind::King => self.king_moves(piece, from),
        }
    }

    /// Destinations that survive the self-check filter, for move input and
    /// square highlighting. Works for either color regardless of the turn.
    pub fn legal_destinations(&self, from: ChessSquare) -> Vec<ChessSquare> {
        let Some(piece) = self.board.piece_at(from) else {
            return Vec::new();
        };
        let color = self.pieces[piece].color;
        let mut scratch = self.clone();
        let mut destinations = Vec::new();
        for mv in self.pseudo_moves_from(from) {
            scratch.apply(&mv);
            if !scratch.is_in_check(color) {
                destinations.push(mv.to);
            }
            scratch.revert(&mv);
        }
        destinations
    }

    fn step_moves(
        &self,
        piece: PieceId,
        from: ChessSquare,
        offsets: &[(isize, isize)],
    ) -> Vec<MoveRecord> {
        let color = self.pieces[piece].color;
        let mut moves = Vec::new();
        for &(d_file, d_rank) in offsets {
            let Some(to) = from.offset(d_file, d_rank) else {
                continue;
            };
            match self.board.piece_at(to) {
                None => moves.push(self.compose_move(piece, from, to, MoveKind::Normal)),
                Some(other) if self.pieces[other].color != color => {
                    moves.push(self.compose_move(piece, from, to, MoveKind::Normal))
                }
                Some(_) => {}
            }
        }
        moves
    }

    /// Shared ray cast for bishop, rook and queen: walk each direction until
    /// the edge or the first occupied square, which ends the ray and counts
    /// only as a capture of the opposite color.
    fn sliding_moves(
        &self,
        piece: PieceId,
        from: ChessSquare,
        directions: &[(isize, isize)],
    ) -> Vec<MoveRecord> {
        let color = self.pieces[piece].color;
        let mut moves = Vec::new();
        for &(d_file, d_rank) in directions {
            let mut file = from.file as isize;
            let mut rank = from.rank as isize;
            loop {
                file += d_file;
                rank += d_rank;
                if !(0..8).contains(&file) || !(0..8).contains(&rank) {
                    break;
                }
                let to = ChessSquare::new(file as u8, rank as u8);
                match self.board.piece_at(to) {
                    None => moves.push(self.compose_move(piece, from, to, MoveKind::Normal)),
                    Some(other) => {
                        if self.pieces[other].color != color {
                            moves.push(self.compose_move(piece, from, to, MoveKind::Normal));
                        }
                        break;
                    }
                }
            }
        }
        moves
    }

    fn pawn_moves(&self, piece: PieceId, from: ChessSquare) -> Vec<MoveRecord> {
        let pawn = &self.pieces[piece];
        let forward = pawn.color.forward();
        let mut moves = Vec::new();

        // Forward pushes are moves but never attacks.
        if let Some(one) = from.offset(0, forward) {
            if !self.board.is_occupied(one) {
                moves.push(self.compose_move(piece, from, one, MoveKind::Normal));
                if !pawn.has_moved {
                    if let Some(two) = from.offset(0, 2 * forward) {
                        if !self.board.is_occupied(two) {
                            moves.push(self.compose_move(piece, from, two, MoveKind::DoublePawnStep));
                        }
                    }
                }
            }
        }

        for d_file in [-1, 1] {
            let Some(to) = from.offset(d_file, forward) else {
                continue;
            };
            if let Some(other) = self.board.piece_at(to) {
                if self.pieces[other].color != pawn.color {
                    moves.push(self.compose_move(piece, from, to, MoveKind::Normal));
                }
            } else if let Some(neighbor) =
                self.board.piece_at_coords(to.file as isize, from.rank as isize)
            {
                // En passant: the pawn beside us just double-stepped and our
                // diagonal lands on the square directly behind it.
                let neighbor = &self.pieces[neighbor];
                if neighbor.color != pawn.color
                    && neighbor.kind == PieceKind::Pawn
                    && neighbor.just_double_stepped
                {
                    moves.push(self.compose_move(piece, from, to, MoveKind::EnPassantCapture));
                }
            }
        }
        moves
    }

    fn king_moves(&self, piece: PieceId, from: ChessSquare) -> Vec<MoveRecord> {
        let mut moves = self.step_moves(piece, from, &KING_OFFSETS);
        let king = &self.pieces[piece];
        let rank = king.color.home_rank();
        if king.has_moved || from != ChessSquare::new(4, rank) {
            return moves;
        }
        let enemy = king.color.opposite();

        // Kingside: f and g empty, h-rook unmoved, e/f/g not attacked.
        if self.castle_rook_ready(king.color, 7)
            && !self.board.is_occupied(ChessSquare::new(5, rank))
            && !self.board.is_occupied(ChessSquare::new(6, rank))
            && !self.is_square_attacked_by(ChessSquare::new(4, rank), enemy)
            && !self.is_square_attacked_by(ChessSquare::new(5, rank), enemy)
            && !self.is_square_attacked_by(ChessSquare::new(6, rank), enemy)
        {
            moves.push(self.compose_move(
                piece,
                from,
                ChessSquare::new(6, rank),
                MoveKind::CastleKingside,
            ));
        }

        // Queenside: b, c and d empty, a-rook unmoved, e/d/c not attacked.
        if self.castle_rook_ready(king.color, 0)
            && !self.board.is_occupied(ChessSquare::new(1, rank))
            && !self.board.is_occupied(ChessSquare::new(2, rank))
            && !self.board.is_occupied(ChessSquare::new(3, rank))
            && !self.is_square_attacked_by(ChessSquare::new(4, rank), enemy)
            && !self.is_square_attacked_by(ChessSquare::new(3, rank), enemy)
            && !self.is_square_attacked_by(ChessSquare::new(2, rank), enemy)
        {
            moves.push(self.compose_move(
                piece,
                from,
                ChessSquare::new(2, rank),
                MoveKind::CastleQueenside,
            ));
        }
        moves
    }

    pub(super) fn castle_rook_ready(&self, color: Color, file: u8) -> bool {
        self.board
            .piece_at(ChessSquare::new(file, color.home_rank()))
            .map(|id| {
                let rook = &self.pieces[id];
                rook.color == color && rook.kind == PieceKind::Rook && !rook.has_moved
            })
            .unwrap_or(false)
    }

    /// The squares this piece threatens: what it could capture on if an
    /// opponent piece stood there. Differs from the move set only for pawns
    /// (diagonals, never the pushes) and the king (no castling).
    pub fn attack_squares(&self, piece: PieceId) -> Vec<ChessSquare> {
        let attacker = &self.pieces[piece];
        let from = attacker.square;
        match attacker.kind {
            PieceKind::Pawn => [-1, 1]
                .iter()
                .filter_map(|&d_file| from.offset(d_file, attacker.color.forward()))
                .collect(),
            PieceKind::Knight => step_squares(from, &KNIGHT_OFFSETS),
            PieceKind::King => step_squares(from, &KING_OFFSETS),
            PieceKind::Bishop => self.ray_squares(from, &BISHOP_DIRECTIONS),
            PieceKind::Rook => self.ray_squares(from, &ROOK_DIRECTIONS),
            PieceKind::Queen => self.ray_squares(from, &QUEEN_DIRECTIONS),
        }
    }

    fn ray_squares(&self, from: ChessSquare, directions: &[(isize, isize)]) -> Vec<ChessSquare> {
        let mut squares = Vec::new();
        for &(d_file, d_rank) in directions {
            let mut file = from.file as isize;
            let mut rank = from.rank as isize;
            loop {
                file += d_file;
                rank += d_rank;
                if !(0..8).contains(&file) || !(0..8).contains(&rank) {
                    break;
                }
                squares.push(ChessSquare::new(file as u8, rank as u8));
                if self.board.piece_at_coords(file, rank).is_some() {
                    break;
                }
            }
        }
        squares
    }

    /// True iff any live piece of `color` includes `square` in its attack set.
    pub fn is_square_attacked_by(&self, square: ChessSquare, color: Color) -> bool {
        self.live_pieces(color)
            .any(|(id, _)| self.attack_squares(id).contains(&square))
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(square) => self.is_square_attacked_by(square, color.opposite()),
            None => false,
        }
    }
}

fn step_squares(from: ChessSquare, offsets: &[(isize, isize)]) -> Vec<ChessSquare> {
    offsets
        .iter()
        .filter_map(|&(d_file, d_rank)| from.offset(d_file, d_rank))
        .collect()
}
