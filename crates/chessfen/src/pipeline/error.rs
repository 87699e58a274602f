/// Per-frame failures. Both are recoverable: the frame simply has no result.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("no board detected")]
    BoardNotFound,
    #[error("board quadrilateral is degenerate")]
    DegenerateGeometry,
}
