use crate::rectify::RectifiedBoard;
use chessfen_core::{Assignment, Fen, FenBoard, Quad, SquareGrid};

/// Output of one successful frame.
#[derive(Clone, Debug)]
pub struct FrameResult {
    /// Board boundary as found in the resized frame.
    pub quad: Quad,
    pub rectified: RectifiedBoard,
    /// Grid centered in the rectified image.
    pub grid: SquareGrid,
    pub assignment: Assignment,
    pub board: FenBoard,
}

impl FrameResult {
    /// The board field, optionally followed by the placeholder game state.
    pub fn fen(&self, with_placeholder_state: bool) -> Fen {
        if with_placeholder_state {
            Fen::with_placeholder_state(self.board.clone())
        } else {
            Fen::board_only(self.board.clone())
        }
    }
}
