use approx::assert_abs_diff_eq;
use chessfen::core::{BoundingBox, Detection, Piece, Quad, SquareGrid};
use chessfen::{
    process_frame, BoardLocator, FrameError, FrameProcessor, LargestQuadLocator, PipelineParams,
};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use nalgebra::Point2;

const BACKGROUND: u8 = 20;

/// 600×600 frame with an axis-aligned board of 8×`square` pixels starting at `origin`.
fn synthetic_board(origin: u32, square: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(600, 600, Rgb([BACKGROUND; 3]));
    for row in 0..8 {
        for col in 0..8 {
            let v = if (row + col) % 2 == 0 { 235 } else { 150 };
            for y in 0..square {
                for x in 0..square {
                    img.put_pixel(
                        origin + col * square + x,
                        origin + row * square + y,
                        Rgb([v; 3]),
                    );
                }
            }
        }
    }
    img
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn det(symbol: char, cx: f32, cy: f32, confidence: f32) -> Detection {
    let piece = Piece::from_symbol(symbol).expect("piece symbol");
    Detection::new(
        BoundingBox::centered_at([cx, cy].into(), 45.0, 60.0),
        piece,
        confidence,
    )
}

fn sorted_coords(quad: &Quad) -> (Vec<i32>, Vec<i32>) {
    let mut xs: Vec<i32> = quad.points.iter().map(|p| p.x).collect();
    let mut ys: Vec<i32> = quad.points.iter().map(|p| p.y).collect();
    xs.sort_unstable();
    ys.sort_unstable();
    (xs, ys)
}

#[test]
fn single_pawn_on_e4() {
    init_logging();
    let frame = synthetic_board(40, 65);
    let res = process_frame(&frame, &[det('P', 332.5, 332.5, 0.92)], &PipelineParams::default())
        .expect("board should be found");

    assert_eq!(res.board.as_str(), "8/8/8/8/4P3/8/8/8");
    assert_eq!(res.grid, SquareGrid::centered(600, 600, 65));
    assert_eq!(res.rectified.image.dimensions(), (600, 600));

    let (xs, ys) = sorted_coords(&res.quad);
    for v in [xs[0], ys[0]] {
        assert!((v - 40).abs() <= 4, "near edge at {v}");
    }
    for v in [xs[3], ys[3]] {
        assert!((v - 560).abs() <= 4, "far edge at {v}");
    }

    // The rectifying homography sends the target rectangle corners onto the board corners.
    let h = res.rectified.h_img_from_rect;
    let c = res.rectified.corners;
    for (rect, img) in [
        (Point2::new(0.0, 0.0), c.top_left),
        (Point2::new(600.0, 0.0), c.top_right),
        (Point2::new(0.0, 600.0), c.bottom_left),
        (Point2::new(600.0, 600.0), c.bottom_right),
    ] {
        let p = h.apply(rect);
        assert_abs_diff_eq!(p.x, img.x as f32, epsilon = 1e-2);
        assert_abs_diff_eq!(p.y, img.y as f32, epsilon = 1e-2);
    }
}

#[test]
fn starting_position_from_detections() {
    let frame = synthetic_board(40, 65);
    let grid = SquareGrid::centered(600, 600, 65);
    let back_rank = ['r', 'n', 'b', 'q', 'k', 'b', 'n', 'r'];

    let mut dets = Vec::new();
    for sq in chessfen::core::Square::all() {
        let symbol = match sq.rank() {
            8 => back_rank[sq.col()],
            7 => 'p',
            2 => 'P',
            1 => back_rank[sq.col()].to_ascii_uppercase(),
            _ => continue,
        };
        let c = grid.cell_center(sq);
        dets.push(det(symbol, c.x, c.y, 0.8));
    }
    // Below the threshold: ignored.
    let c = grid.cell_center("e4".parse().expect("square"));
    dets.push(det('Q', c.x, c.y, 0.5));

    let res = process_frame(&frame, &dets, &PipelineParams::default()).expect("board");
    assert_eq!(res.board.as_str(), chessfen::core::STARTING_BOARD);
    assert_eq!(res.assignment.low_confidence, 1);
    assert_eq!(
        res.fen(true).to_string(),
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    );
}

#[test]
fn frame_is_resized_to_canonical_size() {
    let small = synthetic_board(40, 65);
    let large = image::imageops::resize(&small, 1200, 1200, image::imageops::FilterType::Nearest);
    let res = process_frame(&large, &[det('n', 72.5, 72.5, 0.9)], &PipelineParams::default())
        .expect("board");
    assert_eq!(res.board.as_str(), "n7/8/8/8/8/8/8/8");
}

#[test]
fn blank_frame_reports_board_not_found() {
    let frame = RgbImage::from_pixel(600, 600, Rgb([BACKGROUND; 3]));
    let err = process_frame(&frame, &[det('P', 300.0, 300.0, 0.9)], &PipelineParams::default())
        .unwrap_err();
    assert_eq!(err, FrameError::BoardNotFound);
}

#[test]
fn tilted_board_is_located() {
    init_logging();
    let mut frame = RgbImage::from_pixel(600, 600, Rgb([BACKGROUND; 3]));
    let corners = [
        Point::new(90, 60),
        Point::new(520, 95),
        Point::new(545, 540),
        Point::new(60, 510),
    ];
    draw_polygon_mut(&mut frame, &corners, Rgb([210, 210, 210]));

    let quad = LargestQuadLocator::default()
        .locate(&frame)
        .expect("tilted board");
    for c in corners {
        let nearest = quad
            .points
            .iter()
            .map(|p| (((p.x - c.x).pow(2) + (p.y - c.y).pow(2)) as f64).sqrt())
            .fold(f64::INFINITY, f64::min);
        assert!(nearest <= 6.0, "corner {c:?} missed by {nearest:.1}px");
    }
}

#[test]
fn custom_locator_replaces_contour_search() {
    // The frame has no visible board; the locator supplies it.
    let frame = RgbImage::new(600, 600);
    let processor = FrameProcessor::default().with_locator(|_: &RgbImage| {
        Some(Quad::from_xy([[40, 40], [560, 40], [40, 560], [560, 560]]))
    });

    let dets = [det('K', 72.5, 527.5, 0.99), det('k', 527.5, 72.5, 0.99)];
    let res = processor.process(&frame, &dets).expect("frame");
    assert_eq!(res.board.as_str(), "7k/8/8/8/8/8/8/K7");
}

#[test]
fn later_detection_wins_shared_square() {
    let frame = synthetic_board(40, 65);
    let dets = [det('N', 305.0, 305.0, 0.99), det('B', 315.0, 315.0, 0.6)];
    let res = process_frame(&frame, &dets, &PipelineParams::default()).expect("board");
    assert_eq!(res.board.as_str(), "8/8/8/8/4B3/8/8/8");
    assert_eq!(res.assignment.collisions, 1);
}
