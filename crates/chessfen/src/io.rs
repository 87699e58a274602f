//! JSON configuration, detection and report helpers.

use crate::pipeline::{FrameError, FrameResult, PipelineParams};
use chessfen_core::{
    BoundingBox, Detection, Fen, FenBoard, GridOrigin, Piece, PiecePlacement, Square,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum ChessfenIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// One detector output entry as stored on disk.
///
/// The piece is named either by its FEN `label` or by the detector's integer
/// `class_id`; `label` wins when both are present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub bbox: [f32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<u32>,
    pub confidence: f32,
}

impl DetectionRecord {
    /// The typed detection, or `None` when the piece cannot be identified.
    pub fn resolve(&self) -> Option<Detection> {
        let piece = match (self.label, self.class_id) {
            (Some(c), _) => Piece::from_symbol(c)?,
            (None, Some(id)) => Piece::from_class_id(id)?,
            (None, None) => return None,
        };
        Some(Detection::new(
            BoundingBox::from(self.bbox),
            piece,
            self.confidence,
        ))
    }
}

impl From<&Detection> for DetectionRecord {
    fn from(d: &Detection) -> Self {
        Self {
            bbox: d.bbox.into(),
            label: Some(d.piece.symbol()),
            class_id: None,
            confidence: d.confidence,
        }
    }
}

/// Ordered detections for one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSet {
    pub detections: Vec<DetectionRecord>,
}

impl DetectionSet {
    pub fn from_detections(detections: &[Detection]) -> Self {
        Self {
            detections: detections.iter().map(DetectionRecord::from).collect(),
        }
    }

    /// Typed detections in input order; unidentifiable entries are skipped with a warning.
    pub fn resolve(&self) -> Vec<Detection> {
        self.detections
            .iter()
            .enumerate()
            .filter_map(|(i, rec)| {
                let det = rec.resolve();
                if det.is_none() {
                    log::warn!(
                        "skipping detection {i}: unknown piece (label={:?}, class_id={:?})",
                        rec.label,
                        rec.class_id
                    );
                }
                det
            })
            .collect()
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ChessfenIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ChessfenIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Configuration for a single-frame run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    pub image_path: String,
    pub detections_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub rectified_path: Option<String>,
    #[serde(default)]
    pub params: Option<PipelineParams>,
    /// Append the placeholder game state to the board field.
    #[serde(default)]
    pub full_fen: bool,
    /// Report the starting position as `fallback_fen` when no board is found.
    #[serde(default)]
    pub fallback_to_start: bool,
}

impl FrameConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ChessfenIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ChessfenIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("chessfen_report.json"))
    }

    pub fn build_params(&self) -> PipelineParams {
        self.params.clone().unwrap_or_default()
    }
}

/// Per-frame report in the shape downstream consumers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub success: bool,
    pub board_detected: bool,
    #[serde(default)]
    pub fen: Option<FenBoard>,
    #[serde(default)]
    pub full_fen: Option<String>,
    /// Starting position substituted for a missing board; never a detection result.
    #[serde(default)]
    pub fallback_fen: Option<String>,
    /// Mean confidence of the placed pieces, rounded to 3 decimals.
    pub mean_confidence: f32,
    pub pieces_detected: usize,
    /// Square → `{ piece, confidence }` for every placed piece.
    pub piece_positions: PiecePlacement,
    #[serde(default)]
    pub quad: Option<[[i32; 2]; 4]>,
    #[serde(default)]
    pub grid_origin: Option<GridOrigin>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FrameReport {
    /// Build a report from a pipeline outcome.
    ///
    /// `full_fen` also fills [`FrameReport::full_fen`]; `fallback_to_start`
    /// fills [`FrameReport::fallback_fen`] when the frame failed.
    pub fn from_outcome(
        outcome: &Result<FrameResult, FrameError>,
        full_fen: bool,
        fallback_to_start: bool,
    ) -> Self {
        match outcome {
            Ok(res) => {
                let placement = &res.assignment.placement;
                Self {
                    success: true,
                    board_detected: true,
                    fen: Some(res.board.clone()),
                    full_fen: full_fen.then(|| res.fen(true).to_string()),
                    fallback_fen: None,
                    mean_confidence: round3(placement.mean_confidence()),
                    pieces_detected: placement.len(),
                    piece_positions: placement.clone(),
                    quad: Some(res.quad.points.map(|p| [p.x, p.y])),
                    grid_origin: Some(res.grid.origin),
                    error: None,
                }
            }
            Err(err) => Self {
                success: false,
                board_detected: false,
                fen: None,
                full_fen: None,
                fallback_fen: fallback_to_start.then(|| {
                    let board = FenBoard::starting_position();
                    if full_fen {
                        Fen::with_placeholder_state(board).to_string()
                    } else {
                        board.into_string()
                    }
                }),
                mean_confidence: 0.0,
                pieces_detected: 0,
                piece_positions: PiecePlacement::new(),
                quad: None,
                grid_origin: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ChessfenIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ChessfenIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn round3(v: f32) -> f32 {
    (v * 1000.0).round() / 1000.0
}

/// Parse a `{ "e4": "P", ... }` square → piece map.
pub fn placement_from_json(raw: &str) -> Result<PiecePlacement, ChessfenIoError> {
    let map: BTreeMap<Square, Piece> = serde_json::from_str(raw)?;
    Ok(map.into_iter().collect())
}

/// Render a placement as a `{ "e4": "P", ... }` map.
pub fn placement_to_json(placement: &PiecePlacement) -> Result<String, ChessfenIoError> {
    Ok(serde_json::to_string_pretty(&placement.pieces())?)
}

/// Load an image from disk as 8-bit RGB.
pub fn load_rgb_image(path: impl AsRef<Path>) -> Result<image::RgbImage, ChessfenIoError> {
    Ok(image::open(path)?.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chessfen_core::{Assignment, Quad, SquareGrid};
    use tempfile::tempdir;

    #[test]
    fn records_accept_label_or_class_id() {
        let set: DetectionSet = serde_json::from_str(
            r#"{ "detections": [
                { "bbox": [0, 0, 10, 10], "label": "n", "confidence": 0.9 },
                { "bbox": [0, 0, 10, 10], "class_id": 3, "confidence": 0.8 },
                { "bbox": [0, 0, 10, 10], "class_id": 12, "confidence": 0.8 },
                { "bbox": [0, 0, 10, 10], "label": "x", "confidence": 0.8 },
                { "bbox": [0, 0, 10, 10], "confidence": 0.8 }
            ] }"#,
        )
        .expect("detection set");

        let resolved = set.resolve();
        let symbols: Vec<char> = resolved.iter().map(|d| d.piece.symbol()).collect();
        assert_eq!(symbols, vec!['n', 'P']);
    }

    #[test]
    fn detection_set_file_round_trip() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("dets.json");
        let pawn = Piece::from_symbol('P').expect("pawn");
        let dets = [Detection::new(BoundingBox::new(1.0, 2.0, 3.0, 4.0), pawn, 0.75)];

        DetectionSet::from_detections(&dets)
            .write_json(&path)
            .expect("write");
        let back = DetectionSet::load_json(&path).expect("load").resolve();
        assert_eq!(back, dets);
    }

    #[test]
    fn config_defaults_and_params() {
        let cfg: FrameConfig = serde_json::from_str(
            r#"{ "image_path": "a.png", "detections_path": "d.json",
                 "params": { "square_size_px": 60 } }"#,
        )
        .expect("config");
        assert!(!cfg.full_fen && !cfg.fallback_to_start);
        assert_eq!(cfg.output_path(), PathBuf::from("chessfen_report.json"));
        let params = cfg.build_params();
        assert_eq!(params.square_size_px, 60);
        assert_eq!(params.canonical_height, 600);
    }

    #[test]
    fn failed_frame_report_keeps_fallback_separate() {
        let report = FrameReport::from_outcome(&Err(FrameError::BoardNotFound), true, true);
        assert!(!report.success && !report.board_detected);
        assert_eq!(report.fen, None);
        assert_eq!(
            report.fallback_fen.as_deref(),
            Some("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
        );
        assert_eq!(report.error.as_deref(), Some("no board detected"));

        let plain = FrameReport::from_outcome(&Err(FrameError::DegenerateGeometry), false, false);
        assert_eq!(plain.fallback_fen, None);
    }

    #[test]
    fn successful_report_rounds_confidence() {
        let grid = SquareGrid::centered(600, 600, 65);
        let mut placement = PiecePlacement::new();
        let pawn = Piece::from_symbol('P').expect("pawn");
        let king = Piece::from_symbol('k').expect("king");
        placement.insert("e4".parse().expect("square"), pawn, 0.9);
        placement.insert("a8".parse().expect("square"), king, 0.8);
        placement.insert("h1".parse().expect("square"), king, 0.6);
        let board = chessfen_core::encode_board(&placement);

        let frame = image::RgbImage::new(8, 8);
        let quad = Quad::from_xy([[0, 0], [8, 0], [0, 8], [8, 8]]);
        let rectified =
            crate::rectify::rectify_board(&frame, &quad, &chessfen_core::SumDiffOrdering, 8, 8, 1.0)
                .expect("rectified");
        let result = FrameResult {
            quad,
            rectified,
            grid,
            assignment: Assignment {
                placement,
                accepted: 3,
                low_confidence: 0,
                collisions: 0,
            },
            board,
        };

        let report = FrameReport::from_outcome(&Ok(result), false, true);
        assert!(report.success);
        assert_eq!(report.mean_confidence, 0.767);
        assert_eq!(report.pieces_detected, 3);
        assert_eq!(report.fallback_fen, None);
        assert_eq!(report.full_fen, None);
        assert_eq!(report.grid_origin, Some(GridOrigin { start_x: 40, start_y: 40 }));

        let json = serde_json::to_value(&report).expect("json");
        let e4 = &json["piece_positions"]["e4"];
        assert_eq!(e4["piece"], "P");
        assert!((e4["confidence"].as_f64().expect("confidence") - 0.9).abs() < 1e-6);
        assert_eq!(json["piece_positions"]["h1"]["piece"], "k");
        assert_eq!(json["fen"], "k7/8/8/8/4P3/8/8/7k");
    }

    #[test]
    fn placement_json_encodes() {
        let placement = placement_from_json(r#"{ "e4": "P", "a8": "r" }"#).expect("placement");
        assert_eq!(chessfen_core::encode_board(&placement).as_str(), "r7/8/8/8/4P3/8/8/8");
        let json = placement_to_json(&placement).expect("json");
        let back = placement_from_json(&json).expect("parse");
        assert_eq!(back.pieces(), placement.pieces());
    }
}
