//! FEN board-field encoding and parsing.
//!
//! Only the piece-placement field is derived from an image. The remaining five
//! FEN fields (side to move, castling, en passant, clocks) cannot be observed in
//! a single photograph; [`PlaceholderState`] carries the fixed defaults some
//! consumers require, kept apart from the board so the two are never confused.

use crate::piece::Piece;
use crate::placement::PiecePlacement;
use crate::square::{Square, BOARD_SIDE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board field of the standard starting position.
pub const STARTING_BOARD: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// The piece-placement field of a FEN record, e.g. `8/8/8/8/4P3/8/8/8`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FenBoard(String);

impl FenBoard {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Board field of the standard starting position.
    pub fn starting_position() -> Self {
        Self(STARTING_BOARD.to_string())
    }
}

impl fmt::Display for FenBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FenBoard {
    type Err = FenParseError;

    /// Validate a board field; the stored text is re-encoded, so runs of digits are merged.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(encode_board(&PiecePlacement::from_fen_board(s)?))
    }
}

/// Serialize a placement as a FEN board field.
///
/// Ranks run 8 → 1 separated by `/`, files a → h within a rank; runs of empty
/// squares collapse into a single decimal digit.
pub fn encode_board(placement: &PiecePlacement) -> FenBoard {
    let mut out = String::with_capacity(71);
    for rank in (1..=BOARD_SIDE as u8).rev() {
        let mut empty = 0u32;
        for file in 'a'..='h' {
            let Some(sq) = Square::from_file_rank(file, rank) else {
                continue;
            };
            match placement.piece_at(sq) {
                Some(piece) => {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push(piece.symbol());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push_str(&empty.to_string());
        }
        if rank != 1 {
            out.push('/');
        }
    }
    FenBoard(out)
}

/// Fixed FEN tail `w KQkq - 0 1`.
///
/// This is a static default (white to move, all castling rights, no en passant
/// square, zeroed clocks), not state observed from the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceholderState;

impl PlaceholderState {
    pub const FIELDS: &'static str = "w KQkq - 0 1";
}

impl fmt::Display for PlaceholderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::FIELDS)
    }
}

/// A board field plus, optionally, the placeholder game-state fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fen {
    pub board: FenBoard,
    #[serde(default)]
    pub placeholder_state: Option<PlaceholderState>,
}

impl Fen {
    /// Board field only.
    pub fn board_only(board: FenBoard) -> Self {
        Self {
            board,
            placeholder_state: None,
        }
    }

    /// Board field followed by [`PlaceholderState`], for consumers that need six fields.
    pub fn with_placeholder_state(board: FenBoard) -> Self {
        Self {
            board,
            placeholder_state: Some(PlaceholderState),
        }
    }

    /// Whether the game-state fields are placeholders rather than observed values.
    pub fn has_placeholder_state(&self) -> bool {
        self.placeholder_state.is_some()
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.placeholder_state {
            Some(state) => write!(f, "{} {}", self.board, state),
            None => write!(f, "{}", self.board),
        }
    }
}

/// Errors from [`PiecePlacement::from_fen_board`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FenParseError {
    #[error("expected 8 ranks separated by '/', found {found}")]
    RankCount { found: usize },
    #[error("rank {rank} covers {width} files (expected 8)")]
    RankWidth { rank: u8, width: usize },
    #[error("invalid character {ch:?} in rank {rank}")]
    InvalidChar { rank: u8, ch: char },
}

impl PiecePlacement {
    /// Parse a FEN board field. Any trailing game-state fields must be stripped first.
    pub fn from_fen_board(board: &str) -> Result<Self, FenParseError> {
        let ranks: Vec<&str> = board.split('/').collect();
        if ranks.len() != BOARD_SIDE {
            return Err(FenParseError::RankCount { found: ranks.len() });
        }

        let mut placement = PiecePlacement::new();
        for (row, text) in ranks.iter().enumerate() {
            let rank = (BOARD_SIDE - row) as u8;
            let mut col = 0usize;
            for ch in text.chars() {
                if let Some(run) = ch.to_digit(10) {
                    if !(1..=8).contains(&run) {
                        return Err(FenParseError::InvalidChar { rank, ch });
                    }
                    col += run as usize;
                } else {
                    let piece =
                        Piece::from_symbol(ch).ok_or(FenParseError::InvalidChar { rank, ch })?;
                    if let Some(sq) = Square::new(row, col) {
                        placement.insert(sq, piece, 1.0);
                    }
                    col += 1;
                }
                if col > BOARD_SIDE {
                    return Err(FenParseError::RankWidth { rank, width: col });
                }
            }
            if col != BOARD_SIDE {
                return Err(FenParseError::RankWidth { rank, width: col });
            }
        }
        Ok(placement)
    }

    /// The 32 pieces of the standard starting position.
    pub fn starting_position() -> Self {
        match Self::from_fen_board(STARTING_BOARD) {
            Ok(p) => p,
            Err(_) => unreachable!("STARTING_BOARD is a valid board field"),
        }
    }
}
