use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of squares along one side of the board.
pub const BOARD_SIDE: usize = 8;

/// Discrete address of one of the 64 board cells.
///
/// `row` counts down from the top of the rectified board (row 0 is rank 8),
/// `col` counts files left to right (col 0 is file `a`). The derived ordering
/// therefore walks squares in FEN order: a8..h8, a7..h7, ..., a1..h1.
///
/// Serialized as its algebraic name (`"e4"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Build a square from grid indices; `None` outside `0..8`.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row >= BOARD_SIDE || col >= BOARD_SIDE {
            return None;
        }
        Some(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Build a square from indices that may fall off the board, clamping each to `0..=7`.
    pub fn clamped(row: i64, col: i64) -> Self {
        let max = (BOARD_SIDE - 1) as i64;
        Self {
            row: row.clamp(0, max) as u8,
            col: col.clamp(0, max) as u8,
        }
    }

    /// Build a square from a file letter `a..=h` and rank `1..=8`.
    pub fn from_file_rank(file: char, rank: u8) -> Option<Self> {
        if !('a'..='h').contains(&file) || !(1..=8).contains(&rank) {
            return None;
        }
        let col = file as usize - 'a' as usize;
        let row = BOARD_SIDE - rank as usize;
        Self::new(row, col)
    }

    #[inline]
    pub fn row(self) -> usize {
        self.row as usize
    }

    #[inline]
    pub fn col(self) -> usize {
        self.col as usize
    }

    #[inline]
    pub fn file(self) -> char {
        (b'a' + self.col) as char
    }

    #[inline]
    pub fn rank(self) -> u8 {
        BOARD_SIDE as u8 - self.row
    }

    /// Algebraic name, e.g. `"e4"`.
    pub fn algebraic(self) -> String {
        self.to_string()
    }

    /// All 64 squares in FEN order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIDE).flat_map(|row| {
            (0..BOARD_SIDE).map(move |col| Square {
                row: row as u8,
                col: col as u8,
            })
        })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid square name {0:?} (expected a1..h8)")]
pub struct InvalidSquareName(pub String);

impl FromStr for Square {
    type Err = InvalidSquareName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => rank
                .to_digit(10)
                .and_then(|r| Square::from_file_rank(file, r as u8)),
            _ => None,
        };
        parsed.ok_or_else(|| InvalidSquareName(s.to_string()))
    }
}

impl TryFrom<String> for Square {
    type Error = InvalidSquareName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> String {
        sq.to_string()
    }
}
