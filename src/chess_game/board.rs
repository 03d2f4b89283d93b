use super::{ChessSquare, PieceId};

/// The authoritative square-to-piece occupancy map. Knows nothing about chess
/// legality; the move engine mutates it and keeps it consistent with the
/// piece list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<PieceId>; 8]; 8],
}

impl Board {
    pub fn new() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    pub fn piece_at(&self, square: ChessSquare) -> Option<PieceId> {
        self.piece_at_coords(square.file as isize, square.rank as isize)
    }

    /// Coordinate lookup that tolerates off-board probes; sliding-piece
    /// boundary checks rely on out-of-range squares reading as unoccupied.
    pub fn piece_at_coords(&self, file: isize, rank: isize) -> Option<PieceId> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            self.squares[rank as usize][file as usize]
        } else {
            None
        }
    }

    pub fn is_occupied(&self, square: ChessSquare) -> bool {
        self.piece_at(square).is_some()
    }

    pub fn place(&mut self, piece: PieceId, square: ChessSquare) {
        debug_assert!(
            self.squares[square.rank as usize][square.file as usize].is_none(),
            "placing onto an occupied square"
        );
        self.squares[square.rank as usize][square.file as usize] = Some(piece);
    }

    pub fn remove(&mut self, square: ChessSquare) -> Option<PieceId> {
        self.squares[square.rank as usize][square.file as usize].take()
    }

    pub fn relocate(&mut self, from: ChessSquare, to: ChessSquare) {
        debug_assert!(
            self.squares[to.rank as usize][to.file as usize].is_none(),
            "relocating onto an occupied square"
        );
        self.squares[to.rank as usize][to.file as usize] =
            self.squares[from.rank as usize][from.file as usize].take();
    }

    pub fn occupied_squares(&self) -> impl Iterator<Item = (ChessSquare, PieceId)> + '_ {
        (0..8u8).flat_map(move |rank| {
            (0..8u8).filter_map(move |file| {
                self.squares[rank as usize][file as usize]
                    .map(|id| (ChessSquare::new(file, rank), id))
            })
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_remove() {
        let mut board = Board::new();
        let e4 = ChessSquare::from_algebraic("e4");
        assert!(!board.is_occupied(e4));

        board.place(3, e4);
        assert_eq!(board.piece_at(e4), Some(3));
        assert!(board.is_occupied(e4));

        assert_eq!(board.remove(e4), Some(3));
        assert_eq!(board.piece_at(e4), None);
        assert_eq!(board.remove(e4), None);
    }

    #[test]
    fn test_relocate() {
        let mut board = Board::new();
        let from = ChessSquare::from_algebraic("g1");
        let to = ChessSquare::from_algebraic("f3");
        board.place(6, from);
        board.relocate(from, to);
        assert_eq!(board.piece_at(from), None);
        assert_eq!(board.piece_at(to), Some(6));
    }

    #[test]
    fn test_off_board_queries_read_unoccupied() {
        let board = Board::new();
        assert_eq!(board.piece_at_coords(-1, 0), None);
        assert_eq!(board.piece_at_coords(0, 8), None);
        assert_eq!(board.piece_at_coords(12, -3), None);
    }

    #[test]
    fn test_occupied_squares_iterates_everything() {
        let mut board = Board::new();
        board.place(0, ChessSquare::from_algebraic("a1"));
        board.place(1, ChessSquare::from_algebraic("h8"));
        let occupied: Vec<_> = board.occupied_squares().collect();
        assert_eq!(occupied.len(), 2);
        assert!(occupied.contains(&(ChessSquare::from_algebraic("a1"), 0)));
        assert!(occupied.contains(&(ChessSquare::from_algebraic("h8"), 1)));
    }
}
