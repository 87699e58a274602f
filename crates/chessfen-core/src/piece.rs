use serde::{Deserialize, Serialize};
use std::fmt;

/// Side a piece belongs to. In FEN the letter case carries it: uppercase is white.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Lowercase algebraic letter for this kind.
    #[inline]
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// One of the 12 chess piece classes a detector can report.
///
/// Serialized as its FEN letter (`"P"`, `"k"`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

/// Class order of the piece detector's output head. Index `i` is class id `i`.
pub const DETECTOR_CLASS_ORDER: [char; 12] =
    ['B', 'K', 'N', 'P', 'Q', 'R', 'b', 'k', 'n', 'p', 'q', 'r'];

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    pub const fn white(kind: PieceKind) -> Self {
        Self::new(Color::White, kind)
    }

    pub const fn black(kind: PieceKind) -> Self {
        Self::new(Color::Black, kind)
    }

    /// FEN letter: uppercase for white, lowercase for black.
    #[inline]
    pub fn symbol(self) -> char {
        let c = self.kind.letter();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        let kind = PieceKind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self { color, kind })
    }

    /// Resolve a raw detector class id through [`DETECTOR_CLASS_ORDER`].
    ///
    /// This is the only place integer class ids are interpreted.
    pub fn from_class_id(class_id: u32) -> Option<Self> {
        let c = *DETECTOR_CLASS_ORDER.get(class_id as usize)?;
        Self::from_symbol(c)
    }

    /// Inverse of [`Piece::from_class_id`].
    pub fn class_id(self) -> u32 {
        let s = self.symbol();
        DETECTOR_CLASS_ORDER
            .iter()
            .position(|&c| c == s)
            .map(|i| i as u32)
            .unwrap_or_default()
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid piece symbol {0:?} (expected one of PNBRQKpnbrqk)")]
pub struct InvalidPieceSymbol(pub char);

impl TryFrom<char> for Piece {
    type Error = InvalidPieceSymbol;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Piece::from_symbol(c).ok_or(InvalidPieceSymbol(c))
    }
}

impl From<Piece> for char {
    fn from(p: Piece) -> char {
        p.symbol()
    }
}
