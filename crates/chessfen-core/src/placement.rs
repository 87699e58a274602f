use crate::piece::Piece;
use crate::square::Square;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A piece on a square together with the score of the detection that put it there.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub piece: Piece,
    pub confidence: f32,
}

/// Sparse square → piece mapping for one frame.
///
/// Keys are unique; iteration follows FEN order (a8 first, h1 last).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PiecePlacement {
    squares: BTreeMap<Square, PlacedPiece>,
}

impl PiecePlacement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `piece` on `square`, returning whatever was there before.
    pub fn insert(&mut self, square: Square, piece: Piece, confidence: f32) -> Option<PlacedPiece> {
        self.squares.insert(square, PlacedPiece { piece, confidence })
    }

    pub fn remove(&mut self, square: Square) -> Option<PlacedPiece> {
        self.squares.remove(&square)
    }

    pub fn get(&self, square: Square) -> Option<&PlacedPiece> {
        self.squares.get(&square)
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares.get(&square).map(|p| p.piece)
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Square, &PlacedPiece)> {
        self.squares.iter().map(|(&sq, p)| (sq, p))
    }

    /// Mean confidence over occupied squares, `0.0` when empty.
    pub fn mean_confidence(&self) -> f32 {
        if self.squares.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.squares.values().map(|p| p.confidence).sum();
        sum / self.squares.len() as f32
    }

    /// Plain square → piece view, dropping confidences.
    pub fn pieces(&self) -> BTreeMap<Square, Piece> {
        self.squares.iter().map(|(&sq, p)| (sq, p.piece)).collect()
    }
}

impl FromIterator<(Square, Piece)> for PiecePlacement {
    /// Collect with confidence `1.0`; later entries overwrite earlier ones.
    fn from_iter<I: IntoIterator<Item = (Square, Piece)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (sq, piece) in iter {
            out.insert(sq, piece, 1.0);
        }
        out
    }
}
