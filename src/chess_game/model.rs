use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank direction pawns of this color advance in.
    pub fn forward(&self) -> isize {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn home_rank(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn pawn_start_rank(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn promotion_rank(&self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Pawn => write!(f, "P"),
            PieceKind::Knight => write!(f, "N"),
            PieceKind::Bishop => write!(f, "B"),
            PieceKind::Rook => write!(f, "R"),
            PieceKind::Queen => write!(f, "Q"),
            PieceKind::King => write!(f, "K"),
        }
    }
}

/// Index of a piece in `Game::pieces`. Identity is stable for the whole game:
/// captured pieces stay in the vector so that undo can bring them back.
pub type PieceId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub square: ChessSquare,
    pub has_moved: bool,
    pub just_double_stepped: bool,
    pub alive: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, square: ChessSquare) -> Self {
        Self {
            kind,
            color,
            square,
            has_moved: false,
            just_double_stepped: false,
            alive: true,
        }
    }

    pub fn to_char(&self) -> char {
        let c = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        if self.color == Color::White {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct ChessSquare {
    pub file: u8,
    pub rank: u8,
}

impl ChessSquare {
    pub fn new(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    /// The square displaced by (d_file, d_rank), or None when that falls off
    /// the board.
    pub fn offset(&self, d_file: isize, d_rank: isize) -> Option<ChessSquare> {
        let file = self.file as isize + d_file;
        let rank = self.rank as isize + d_rank;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(ChessSquare::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    pub fn try_from_algebraic(algebraic: &str) -> Option<Self> {
        let mut chars = algebraic.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Some(Self::new(file as u8 - b'a', rank as u8 - b'1'))
    }

    pub fn from_algebraic(algebraic: &str) -> Self {
        match Self::try_from_algebraic(algebraic) {
            Some(square) => square,
            None => panic!("invalid square: {}", algebraic),
        }
    }

    pub fn as_algebraic(&self) -> String {
        to_algebraic_square(self.file, self.rank)
    }
}

pub fn to_algebraic_square(file: u8, rank: u8) -> String {
    let file = (b'a' + file) as char;
    let rank = (rank + 1).to_string();
    format!("{}{}", file, rank)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    DoublePawnStep,
    EnPassantCapture,
    CastleKingside,
    CastleQueenside,
    Promotion(PieceKind),
}

/// One applied move, recorded with everything undo/redo needs to be an exact
/// inverse pair: the captured piece's identity, the mover's previous
/// `has_moved` flag and whichever pawn lost its double-step window this ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub piece: PieceId,
    pub from: ChessSquare,
    pub to: ChessSquare,
    pub captured: Option<PieceId>,
    pub kind: MoveKind,
    pub mover_had_moved: bool,
    pub cleared_double_step: Option<PieceId>,
}

impl MoveRecord {
    pub fn as_algebraic(&self) -> String {
        let base = format!("{}{}", self.from.as_algebraic(), self.to.as_algebraic());
        if let MoveKind::Promotion(kind) = self.kind {
            base + &kind.to_string().to_lowercase()
        } else {
            base
        }
    }
}

/// What a successful `try_move` did, for the caller's benefit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Captured,
    Castled,
    CapturedEnPassant,
    Promoted,
    /// The pawn reached the back rank without a promotion choice; the game is
    /// frozen until `complete_promotion` resolves it.
    PromotionPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("no piece of the side to move on the source square")]
    NoMoverOrWrongTurn,
    #[error("the piece cannot reach the destination square")]
    IllegalForPiece,
    #[error("the move would leave the mover's own king in check")]
    SelfCheck,
    #[error("a pawn promotion is unresolved; choose the new piece first")]
    MissingPromotionChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    /// The named color has been checkmated.
    Checkmate(Color),
    Stalemate,
}
