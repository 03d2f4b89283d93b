use super::board::Board;
use super::model::{
    ChessSquare, Color, MoveKind, MoveOutcome, MoveRecord, Outcome, Piece, PieceId, PieceKind,
    Rejection,
};
use super::zobrist_hash::ZOBRIST;

/// The whole game state: the occupancy board, the piece list it indexes into,
/// whose turn it is and the undo/redo stacks. The board and the piece list are
/// kept consistent by `apply`/`revert`; everything else derives from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub(super) board: Board,
    pub(super) pieces: Vec<Piece>,
    pub(super) side_to_move: Color,
    pub(super) fullmove_number: u32,
    history: Vec<MoveRecord>,
    future: Vec<MoveRecord>,
    pending_promotion: Option<PieceId>,
    outcome: Outcome,
}

impl Game {
    /// Standard initial position, white to move.
    pub fn new_game() -> Self {
        use PieceKind::*;
        let mut game = Game::empty();
        let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for color in [Color::White, Color::Black] {
            for (file, kind) in back_rank.into_iter().enumerate() {
                game.add_piece(kind, color, ChessSquare::new(file as u8, color.home_rank()));
            }
            for file in 0..8 {
                game.add_piece(Pawn, color, ChessSquare::new(file, color.pawn_start_rank()));
            }
        }
        game
    }

    pub(super) fn empty() -> Self {
        Self {
            board: Board::new(),
            pieces: Vec::with_capacity(32),
            side_to_move: Color::White,
            fullmove_number: 1,
            history: Vec::new(),
            future: Vec::new(),
            pending_promotion: None,
            outcome: Outcome::InProgress,
        }
    }

    pub(super) fn add_piece(&mut self, kind: PieceKind, color: Color, square: ChessSquare) -> PieceId {
        let id = self.pieces.len();
        self.pieces.push(Piece::new(kind, color, square));
        self.board.place(id, square);
        id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id]
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// FEN-style fullmove counter: starts at 1, advances after black moves.
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Square of the pawn awaiting its promotion choice, if any.
    pub fn pending_promotion(&self) -> Option<ChessSquare> {
        self.pending_promotion.map(|id| self.pieces[id].square)
    }

    pub(super) fn live_pieces(&self, color: Color) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.pieces
            .iter()
            .enumerate()
            .filter(move |(_, piece)| piece.alive && piece.color == color)
    }

    pub fn king_square(&self, color: Color) -> Option<ChessSquare> {
        self.live_pieces(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(_, piece)| piece.square)
    }

    /// Validates and applies one move for the side to move. On any rejection
    /// the game state is left exactly as it was.
    pub fn try_move(
        &mut self,
        from: ChessSquare,
        to: ChessSquare,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, Rejection> {
        if self.pending_promotion.is_some() {
            return Err(Rejection::MissingPromotionChoice);
        }
        let piece = self
            .board
            .piece_at(from)
            .filter(|&id| self.pieces[id].color == self.side_to_move)
            .ok_or(Rejection::NoMoverOrWrongTurn)?;
        let mut mv = self
            .pseudo_moves_from(from)
            .into_iter()
            .find(|candidate| candidate.to == to)
            .ok_or(Rejection::IllegalForPiece)?;

        let mover = &self.pieces[piece];
        let promotes = mover.kind == PieceKind::Pawn && to.rank == mover.color.promotion_rank();
        if promotes {
            match promotion {
                Some(kind) if kind != PieceKind::Pawn && kind != PieceKind::King => {
                    mv.kind = MoveKind::Promotion(kind);
                }
                Some(_) => return Err(Rejection::MissingPromotionChoice),
                // Applied as a plain push for now; the choice arrives through
                // complete_promotion.
                None => {}
            }
        }

        self.apply(&mv);
        if self.is_in_check(self.side_to_move) {
            self.revert(&mv);
            return Err(Rejection::SelfCheck);
        }

        let result = if promotes && promotion.is_none() {
            self.pending_promotion = Some(piece);
            MoveOutcome::PromotionPending
        } else {
            match mv.kind {
                MoveKind::Promotion(_) => MoveOutcome::Promoted,
                MoveKind::CastleKingside | MoveKind::CastleQueenside => MoveOutcome::Castled,
                MoveKind::EnPassantCapture => MoveOutcome::CapturedEnPassant,
                _ if mv.captured.is_some() => MoveOutcome::Captured,
                _ => MoveOutcome::Moved,
            }
        };

        self.history.push(mv);
        self.future.clear();
        self.side_to_move = self.side_to_move.opposite();
        if self.side_to_move == Color::White {
            self.fullmove_number += 1;
        }
        self.outcome = if self.pending_promotion.is_some() {
            Outcome::InProgress
        } else {
            self.compute_outcome()
        };
        Ok(result)
    }

    /// Resolves a promotion raised by `try_move`. The history record is
    /// rewritten with the chosen kind so that undo and redo replay it exactly.
    pub fn complete_promotion(
        &mut self,
        square: ChessSquare,
        kind: PieceKind,
    ) -> Result<(), Rejection> {
        let piece = self
            .pending_promotion
            .ok_or(Rejection::MissingPromotionChoice)?;
        if self.pieces[piece].square != square
            || kind == PieceKind::Pawn
            || kind == PieceKind::King
        {
            return Err(Rejection::MissingPromotionChoice);
        }
        self.pieces[piece].kind = kind;
        if let Some(last) = self.history.last_mut() {
            last.kind = MoveKind::Promotion(kind);
        }
        self.pending_promotion = None;
        self.outcome = self.compute_outcome();
        Ok(())
    }

    /// Takes back the last applied move. Returns false when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> bool {
        let Some(mv) = self.history.pop() else {
            return false;
        };
        self.revert(&mv);
        self.side_to_move = self.side_to_move.opposite();
        if self.side_to_move == Color::Black {
            self.fullmove_number -= 1;
        }
        self.future.push(mv);
        self.pending_promotion = None;
        self.outcome = self.compute_outcome();
        true
    }

    /// Replays the most recently undone move. Returns false when the redo
    /// stack is empty.
    pub fn redo(&mut self) -> bool {
        let Some(mv) = self.future.pop() else {
            return false;
        };
        self.apply(&mv);
        self.side_to_move = self.side_to_move.opposite();
        if self.side_to_move == Color::White {
            self.fullmove_number += 1;
        }
        let mover = &self.pieces[mv.piece];
        if mover.kind == PieceKind::Pawn && mv.to.rank == mover.color.promotion_rank() {
            self.pending_promotion = Some(mv.piece);
        }
        self.history.push(mv);
        self.outcome = if self.pending_promotion.is_some() {
            Outcome::InProgress
        } else {
            self.compute_outcome()
        };
        true
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_any_legal_move(color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        self.king_square(color).is_some()
            && !self.is_in_check(color)
            && !self.has_any_legal_move(color)
    }

    /// Exhaustive legality search: tries every pseudo move of `color` on a
    /// scratch copy and reports whether any of them leaves the king safe.
    pub fn has_any_legal_move(&self, color: Color) -> bool {
        let mut scratch = self.clone();
        let froms: Vec<ChessSquare> = self.live_pieces(color).map(|(_, p)| p.square).collect();
        for from in froms {
            let candidates = scratch.pseudo_moves_from(from);
            for mv in candidates {
                scratch.apply(&mv);
                let safe = !scratch.is_in_check(color);
                scratch.revert(&mv);
                if safe {
                    return true;
                }
            }
        }
        false
    }

    fn compute_outcome(&self) -> Outcome {
        if self.king_square(self.side_to_move).is_none() {
            // Positions without a king (test fragments) never conclude.
            return Outcome::InProgress;
        }
        if self.has_any_legal_move(self.side_to_move) {
            Outcome::InProgress
        } else if self.is_in_check(self.side_to_move) {
            Outcome::Checkmate(self.side_to_move)
        } else {
            Outcome::Stalemate
        }
    }

    pub(super) fn refresh_outcome(&mut self) {
        self.outcome = self.compute_outcome();
    }

    /// Builds the full undo record for a candidate move before it is applied.
    pub(super) fn compose_move(
        &self,
        piece: PieceId,
        from: ChessSquare,
        to: ChessSquare,
        kind: MoveKind,
    ) -> MoveRecord {
        let captured = match kind {
            // The captured pawn stands beside the mover, not on the
            // destination square.
            MoveKind::EnPassantCapture => self.board.piece_at(ChessSquare::new(to.file, from.rank)),
            _ => self.board.piece_at(to),
        };
        MoveRecord {
            piece,
            from,
            to,
            captured,
            kind,
            mover_had_moved: self.pieces[piece].has_moved,
            cleared_double_step: self
                .pieces
                .iter()
                .position(|p| p.alive && p.just_double_stepped),
        }
    }

    pub(super) fn apply(&mut self, mv: &MoveRecord) {
        if let Some(id) = mv.cleared_double_step {
            self.pieces[id].just_double_stepped = false;
        }
        if let Some(captured) = mv.captured {
            let square = self.pieces[captured].square;
            self.board.remove(square);
            self.pieces[captured].alive = false;
        }
        self.board.relocate(mv.from, mv.to);
        let mover = &mut self.pieces[mv.piece];
        mover.square = mv.to;
        mover.has_moved = true;
        match mv.kind {
            MoveKind::DoublePawnStep => self.pieces[mv.piece].just_double_stepped = true,
            MoveKind::Promotion(kind) => self.pieces[mv.piece].kind = kind,
            MoveKind::CastleKingside => self.hop_rook(mv.to.rank, 7, 5),
            MoveKind::CastleQueenside => self.hop_rook(mv.to.rank, 0, 3),
            _ => {}
        }
        debug_assert!(self.occupancy_consistent());
    }

    pub(super) fn revert(&mut self, mv: &MoveRecord) {
        match mv.kind {
            MoveKind::DoublePawnStep => self.pieces[mv.piece].just_double_stepped = false,
            MoveKind::Promotion(_) => self.pieces[mv.piece].kind = PieceKind::Pawn,
            MoveKind::CastleKingside => self.unhop_rook(mv.to.rank, 7, 5),
            MoveKind::CastleQueenside => self.unhop_rook(mv.to.rank, 0, 3),
            _ => {}
        }
        self.board.relocate(mv.to, mv.from);
        let mover = &mut self.pieces[mv.piece];
        mover.square = mv.from;
        mover.has_moved = mv.mover_had_moved;
        if let Some(captured) = mv.captured {
            self.pieces[captured].alive = true;
            let square = self.pieces[captured].square;
            self.board.place(captured, square);
        }
        if let Some(id) = mv.cleared_double_step {
            self.pieces[id].just_double_stepped = true;
        }
        debug_assert!(self.occupancy_consistent());
    }

    fn hop_rook(&mut self, rank: u8, from_file: u8, to_file: u8) {
        let from = ChessSquare::new(from_file, rank);
        let to = ChessSquare::new(to_file, rank);
        if let Some(rook) = self.board.piece_at(from) {
            self.board.relocate(from, to);
            self.pieces[rook].square = to;
            self.pieces[rook].has_moved = true;
        } else {
            debug_assert!(false, "castling without a rook on its home square");
        }
    }

    fn unhop_rook(&mut self, rank: u8, home_file: u8, castled_file: u8) {
        let from = ChessSquare::new(castled_file, rank);
        let to = ChessSquare::new(home_file, rank);
        if let Some(rook) = self.board.piece_at(from) {
            self.board.relocate(from, to);
            self.pieces[rook].square = to;
            // Castling requires an unmoved rook, so the flag restores to false.
            self.pieces[rook].has_moved = false;
        } else {
            debug_assert!(false, "undoing a castle without the castled rook");
        }
    }

    /// Invariant check: the occupancy map and the alive-piece set agree
    /// square for square.
    pub(super) fn occupancy_consistent(&self) -> bool {
        let occupied = self.board.occupied_squares().count();
        let alive = self.pieces.iter().filter(|p| p.alive).count();
        occupied == alive
            && self
                .pieces
                .iter()
                .enumerate()
                .filter(|(_, p)| p.alive)
                .all(|(id, p)| self.board.piece_at(p.square) == Some(id))
    }

    pub fn position_hash(&self) -> u64 {
        ZOBRIST.calculate_hash(self)
    }

    pub fn render_to_string(&self) -> String {
        let mut board_representation = String::new();
        board_representation.push_str("    a   b   c   d   e   f   g   h  \n");
        board_representation.push_str("  ┌───┬───┬───┬───┬───┬───┬───┬───┐\n");

        for rank in (0..8u8).rev() {
            board_representation.push_str(&format!("{} │", rank + 1));
            for file in 0..8u8 {
                let square = match self.board.piece_at(ChessSquare::new(file, rank)) {
                    Some(id) => self.pieces[id].to_char(),
                    None => ' ',
                };
                board_representation.push_str(&format!(" {} │", square));
            }
            board_representation.push_str(&format!(" {}\n", rank + 1));

            if rank > 0 {
                board_representation.push_str("  ├───┼───┼───┼───┼───┼───┼───┼───┤\n");
            }
        }

        board_representation.push_str("  └───┴───┴───┴───┴───┴───┴───┴───┘\n");
        board_representation.push_str("    a   b   c   d   e   f   g   h  \n");

        board_representation
    }
}

#[cfg(test)]
mod tests {
    use super::super::fen;
    use super::super::test_utils::assert_destinations;
    use super::*;

    fn sq(algebraic: &str) -> ChessSquare {
        ChessSquare::from_algebraic(algebraic)
    }

    /// Everything that defines the position: board, pieces, side to move.
    fn position_snapshot(game: &Game) -> (Board, Vec<Piece>, Color) {
        (game.board.clone(), game.pieces.clone(), game.side_to_move)
    }

    #[test]
    fn test_new_game() {
        let game = Game::new_game();
        assert_eq!(game.pieces().len(), 32);
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.outcome(), Outcome::InProgress);
        assert_eq!(game.king_square(Color::White), Some(sq("e1")));
        assert_eq!(game.king_square(Color::Black), Some(sq("e8")));
        assert!(game.occupancy_consistent());
    }

    #[test]
    fn test_wrong_turn_and_empty_square_rejected() {
        let mut game = Game::new_game();
        let hash = game.position_hash();
        assert_eq!(
            game.try_move(sq("e7"), sq("e5"), None),
            Err(Rejection::NoMoverOrWrongTurn)
        );
        assert_eq!(
            game.try_move(sq("e4"), sq("e5"), None),
            Err(Rejection::NoMoverOrWrongTurn)
        );
        assert_eq!(game.position_hash(), hash);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_illegal_destination_rejected_without_mutation() {
        let mut game = Game::new_game();
        let snapshot = position_snapshot(&game);
        let hash = game.position_hash();
        assert_eq!(
            game.try_move(sq("e2"), sq("e5"), None),
            Err(Rejection::IllegalForPiece)
        );
        assert_eq!(
            game.try_move(sq("g1"), sq("g3"), None),
            Err(Rejection::IllegalForPiece)
        );
        assert_eq!(position_snapshot(&game), snapshot);
        assert_eq!(game.position_hash(), hash);
    }

    #[test]
    fn test_self_check_rejected_without_mutation() {
        // The white rook is pinned against its king by the black rook.
        let mut game = fen::from_fen("4r3/8/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        let snapshot = position_snapshot(&game);
        let hash = game.position_hash();
        assert_eq!(
            game.try_move(sq("e2"), sq("d2"), None),
            Err(Rejection::SelfCheck)
        );
        assert_eq!(
            game.try_move(sq("e2"), sq("a2"), None),
            Err(Rejection::SelfCheck)
        );
        assert_eq!(position_snapshot(&game), snapshot);
        assert_eq!(game.position_hash(), hash);
        // Staying on the pin line is fine.
        assert_eq!(
            game.try_move(sq("e2"), sq("e5"), None),
            Ok(MoveOutcome::Moved)
        );
    }

    #[test]
    fn test_apply_undo_round_trip() {
        let mut game = Game::new_game();
        let snapshot = position_snapshot(&game);
        let hash = game.position_hash();

        assert_eq!(game.try_move(sq("e2"), sq("e4"), None), Ok(MoveOutcome::Moved));
        assert_eq!(game.side_to_move(), Color::Black);
        assert_ne!(game.position_hash(), hash);

        assert!(game.undo());
        assert_eq!(position_snapshot(&game), snapshot);
        assert_eq!(game.position_hash(), hash);
        assert!(!game.undo());
    }

    #[test]
    fn test_undo_redo_are_exact_inverses() {
        let mut game = Game::new_game();
        game.try_move(sq("e2"), sq("e4"), None).unwrap();
        game.try_move(sq("e7"), sq("e5"), None).unwrap();
        game.try_move(sq("g1"), sq("f3"), None).unwrap();
        let snapshot = position_snapshot(&game);
        let hash = game.position_hash();

        assert!(game.undo());
        assert!(game.undo());
        assert!(game.redo());
        assert!(game.redo());
        assert_eq!(position_snapshot(&game), snapshot);
        assert_eq!(game.position_hash(), hash);
        assert!(!game.redo());
    }

    #[test]
    fn test_undo_all_restores_initial_position() {
        let mut game = Game::new_game();
        let initial = position_snapshot(&game);
        for (from, to) in [
            ("e2", "e4"),
            ("e7", "e5"),
            ("d1", "h5"),
            ("b8", "c6"),
            ("f1", "c4"),
            ("g8", "f6"),
            ("h5", "f7"),
        ] {
            game.try_move(sq(from), sq(to), None).unwrap();
        }
        while game.undo() {}
        assert_eq!(position_snapshot(&game), initial);
        assert_eq!(game.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_new_move_discards_redo_branch() {
        let mut game = Game::new_game();
        game.try_move(sq("e2"), sq("e4"), None).unwrap();
        assert!(game.undo());
        game.try_move(sq("d2"), sq("d4"), None).unwrap();
        assert!(!game.redo());
    }

    #[test]
    fn test_capture_marks_piece_dead_and_undo_revives_it() {
        let mut game = fen::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let pawn_d5 = game.board().piece_at(sq("d5")).unwrap();
        let pawn_e4 = game.board().piece_at(sq("e4")).unwrap();
        assert_eq!(
            game.try_move(sq("e4"), sq("d5"), None),
            Ok(MoveOutcome::Captured)
        );
        assert!(!game.piece(pawn_d5).alive);
        assert_eq!(game.board().piece_at(sq("d5")), Some(pawn_e4));
        assert_eq!(game.board().piece_at(sq("e4")), None);
        assert!(game.occupancy_consistent());

        assert!(game.undo());
        assert!(game.piece(pawn_d5).alive);
        assert_eq!(game.board().piece_at(sq("d5")), Some(pawn_d5));
        assert!(game.occupancy_consistent());
    }

    #[test]
    fn test_en_passant_apply_and_undo() {
        let mut game = fen::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
        game.try_move(sq("d7"), sq("d5"), None).unwrap();
        let captured = game.board().piece_at(sq("d5")).unwrap();
        assert!(game.piece(captured).just_double_stepped);

        assert_eq!(
            game.try_move(sq("e5"), sq("d6"), None),
            Ok(MoveOutcome::CapturedEnPassant)
        );
        assert!(!game.piece(captured).alive);
        assert_eq!(game.board().piece_at(sq("d5")), None);
        assert!(game.board().is_occupied(sq("d6")));

        assert!(game.undo());
        assert!(game.piece(captured).alive);
        assert!(game.piece(captured).just_double_stepped);
        assert_eq!(game.board().piece_at(sq("d5")), Some(captured));
    }

    #[test]
    fn test_castling_moves_rook_and_undo_restores_it() {
        let mut game = fen::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let hash = game.position_hash();
        assert_eq!(
            game.try_move(sq("e1"), sq("g1"), None),
            Ok(MoveOutcome::Castled)
        );
        let rook = game.board().piece_at(sq("f1")).unwrap();
        assert_eq!(game.piece(rook).kind, PieceKind::Rook);
        assert!(game.piece(rook).has_moved);
        assert_eq!(game.board().piece_at(sq("h1")), None);

        assert!(game.undo());
        assert_eq!(game.board().piece_at(sq("h1")), Some(rook));
        assert!(!game.piece(rook).has_moved);
        assert_eq!(game.position_hash(), hash);

        // Queenside for black, via redo after a fresh move. White goes
        // kingside: after a queenside castle the rook on d1 would guard d8.
        game.try_move(sq("e1"), sq("g1"), None).unwrap();
        game.try_move(sq("e8"), sq("c8"), None).unwrap();
        let black_rook = game.board().piece_at(sq("d8")).unwrap();
        assert_eq!(game.piece(black_rook).kind, PieceKind::Rook);
        assert!(game.undo());
        assert!(game.redo());
        assert_eq!(game.board().piece_at(sq("d8")), Some(black_rook));
    }

    #[test]
    fn test_castling_rejected_after_king_or_rook_moved() {
        let mut game = fen::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        game.try_move(sq("h1"), sq("g1"), None).unwrap();
        game.try_move(sq("a8"), sq("b8"), None).unwrap();
        game.try_move(sq("g1"), sq("h1"), None).unwrap();
        game.try_move(sq("b8"), sq("a8"), None).unwrap();
        // Both rooks are back home but have moved; kingside white and
        // queenside black are gone for good.
        assert_eq!(
            game.try_move(sq("e1"), sq("g1"), None),
            Err(Rejection::IllegalForPiece)
        );
        game.try_move(sq("e1"), sq("c1"), None).unwrap();
        assert_eq!(
            game.try_move(sq("e8"), sq("c8"), None),
            Err(Rejection::IllegalForPiece)
        );
        game.try_move(sq("e8"), sq("g8"), None).unwrap();
    }

    #[test]
    fn test_castling_rejected_when_king_path_is_attacked() {
        // The king is in check; neither castle may start from e1.
        let mut game = fen::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert_eq!(
            game.try_move(sq("e1"), sq("g1"), None),
            Err(Rejection::IllegalForPiece)
        );
        assert_eq!(
            game.try_move(sq("e1"), sq("c1"), None),
            Err(Rejection::IllegalForPiece)
        );

        // Destination square attacked: c1 by the rook, g1 by the bishop.
        let mut game = fen::from_fen("2r3k1/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert_eq!(
            game.try_move(sq("e1"), sq("c1"), None),
            Err(Rejection::IllegalForPiece)
        );
        let mut game = fen::from_fen("6k1/b7/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        assert_eq!(
            game.try_move(sq("e1"), sq("g1"), None),
            Err(Rejection::IllegalForPiece)
        );

        // After white castles queenside its own rook on d1 guards d8, so
        // black's queenside castle dies with it; kingside stays open.
        let mut game = fen::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        game.try_move(sq("e1"), sq("c1"), None).unwrap();
        assert_eq!(
            game.try_move(sq("e8"), sq("c8"), None),
            Err(Rejection::IllegalForPiece)
        );
        game.try_move(sq("e8"), sq("g8"), None).unwrap();
    }

    #[test]
    fn test_promotion_pending_blocks_moves_until_completed() {
        let mut game = fen::from_fen("8/6P1/8/8/8/1k6/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            game.try_move(sq("g7"), sq("g8"), None),
            Ok(MoveOutcome::PromotionPending)
        );
        assert_eq!(game.pending_promotion(), Some(sq("g8")));
        assert_eq!(
            game.try_move(sq("b3"), sq("b4"), None),
            Err(Rejection::MissingPromotionChoice)
        );
        assert_eq!(
            game.complete_promotion(sq("g8"), PieceKind::King),
            Err(Rejection::MissingPromotionChoice)
        );
        assert_eq!(game.complete_promotion(sq("g8"), PieceKind::Queen), Ok(()));
        assert_eq!(game.pending_promotion(), None);
        let queen = game.board().piece_at(sq("g8")).unwrap();
        assert_eq!(game.piece(queen).kind, PieceKind::Queen);
        game.try_move(sq("b3"), sq("b4"), None).unwrap();
    }

    #[test]
    fn test_promotion_undo_restores_the_pawn() {
        let mut game = fen::from_fen("8/6P1/8/8/8/1k6/8/4K3 w - - 0 1").unwrap();
        let pawn = game.board().piece_at(sq("g7")).unwrap();
        game.try_move(sq("g7"), sq("g8"), Some(PieceKind::Knight))
            .unwrap();
        assert_eq!(game.piece(pawn).kind, PieceKind::Knight);

        assert!(game.undo());
        assert_eq!(game.piece(pawn).kind, PieceKind::Pawn);
        assert_eq!(game.piece(pawn).square, sq("g7"));

        // Redo replays the resolved choice.
        assert!(game.redo());
        assert_eq!(game.piece(pawn).kind, PieceKind::Knight);
        assert_eq!(game.pending_promotion(), None);
    }

    #[test]
    fn test_unresolved_promotion_undo_and_redo() {
        let mut game = fen::from_fen("8/6P1/8/8/8/1k6/8/4K3 w - - 0 1").unwrap();
        game.try_move(sq("g7"), sq("g8"), None).unwrap();
        assert!(game.undo());
        assert_eq!(game.pending_promotion(), None);
        let pawn = game.board().piece_at(sq("g7")).unwrap();
        assert_eq!(game.piece(pawn).kind, PieceKind::Pawn);

        assert!(game.redo());
        assert_eq!(game.pending_promotion(), Some(sq("g8")));
        assert_eq!(game.complete_promotion(sq("g8"), PieceKind::Rook), Ok(()));
        assert_eq!(game.piece(pawn).kind, PieceKind::Rook);
    }

    #[test]
    fn test_promotion_with_inline_choice() {
        let mut game = fen::from_fen("3r4/2P5/8/8/8/1k6/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            game.try_move(sq("c7"), sq("d8"), Some(PieceKind::Queen)),
            Ok(MoveOutcome::Promoted)
        );
        let queen = game.board().piece_at(sq("d8")).unwrap();
        assert_eq!(game.piece(queen).kind, PieceKind::Queen);
        assert!(game.history().last().unwrap().captured.is_some());
    }

    #[test]
    fn test_back_rank_checkmate() {
        let game = fen::from_fen("4Q1k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert!(game.is_in_check(Color::Black));
        assert!(game.is_checkmate(Color::Black));
        assert_eq!(game.outcome(), Outcome::Checkmate(Color::Black));
    }

    #[test]
    fn test_smothered_corner_checkmate() {
        let game = fen::from_fen("1k6/8/8/8/8/8/PPn5/KN6 w - - 0 1").unwrap();
        assert!(game.is_checkmate(Color::White));
        assert_eq!(game.outcome(), Outcome::Checkmate(Color::White));
    }

    #[test]
    fn test_stalemate() {
        let game = fen::from_fen("1k6/8/8/8/8/1r6/7r/K7 w - - 0 1").unwrap();
        assert!(!game.is_in_check(Color::White));
        assert!(game.is_stalemate(Color::White));
        assert!(!game.is_checkmate(Color::White));
        assert_eq!(game.outcome(), Outcome::Stalemate);
    }

    #[test]
    fn test_check_is_not_mate_when_escapable() {
        let game = fen::from_fen("Q5k1/6pp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert!(game.is_in_check(Color::Black));
        assert!(!game.is_checkmate(Color::Black));
        assert_eq!(game.outcome(), Outcome::InProgress);
        assert_destinations(game.legal_destinations(sq("g8")).into_iter(), vec!["f7"]);
    }

    #[test]
    fn test_occupancy_invariant_through_mixed_sequence() {
        let mut game = Game::new_game();
        for (from, to) in [
            ("e2", "e4"),
            ("d7", "d5"),
            ("e4", "d5"),
            ("d8", "d5"),
            ("b1", "c3"),
            ("d5", "e5"),
        ] {
            game.try_move(sq(from), sq(to), None).unwrap();
            assert!(game.occupancy_consistent());
        }
        for _ in 0..3 {
            assert!(game.undo());
            assert!(game.occupancy_consistent());
        }
        for _ in 0..3 {
            assert!(game.redo());
            assert!(game.occupancy_consistent());
        }
    }
}
