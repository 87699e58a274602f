use crate::corners::CanonicalCorners;
use crate::image::{sample_bilinear_rgb, RgbImage, RgbImageView};
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    pub fn is_finite(&self) -> bool {
        self.h.iter().all(|v| v.is_finite())
    }
}

const MIN_DETERMINANT: f64 = 1e-9;

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

// Translate to the centroid and scale so the mean distance is sqrt(2).
fn normalize_points4(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let cx = pts.iter().map(|p| p.x as f64).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.y as f64).sum::<f64>() / 4.0;
    let mean_dist = pts
        .iter()
        .map(|p| (p.x as f64 - cx).hypot(p.y as f64 - cy))
        .sum::<f64>()
        / 4.0;

    let t = hartley_normalization(cx, cy, mean_dist);
    let out = pts.map(|p| {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new(v[0], v[1])
    });
    (out, t)
}

fn normalize_homography(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if s.abs() < 1e-12 {
        return None;
    }
    Some(h / s)
}

/// Compute H such that `dst ~ H * src` from four point correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns `None` when
/// the system is singular or the solution collapses the plane (three or more
/// collinear points, repeated points).
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    // Unknowns h11..h32 with h33 = 1. Each (x,y)->(u,v) contributes
    //   h11 x + h12 y + h13 - u h31 x - u h32 y = u
    //   h21 x + h22 y + h23 - v h31 x - v h32 y = v
    let (src_n, t_src) = normalize_points4(src);
    let (dst_n, t_dst) = normalize_points4(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let (x, y) = (src_n[k].x, src_n[k].y);
        let (u, v) = (dst_n[k].x, dst_n[k].y);

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b)?;
    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    // H = T_dst^-1 * Hn * T_src
    let h = t_dst.try_inverse()? * hn * t_src;
    let h = normalize_homography(h)?;
    if h.determinant().abs() < MIN_DETERMINANT {
        return None;
    }
    let h = Homography::new(h);
    h.is_finite().then_some(h)
}

/// Homography taking the `width × height` target rectangle onto the board in the frame.
///
/// Rectangle corners pair with canonical roles as TL→(0,0), TR→(w,0), BL→(0,h), BR→(w,h).
pub fn board_homography(
    corners: &CanonicalCorners,
    width: usize,
    height: usize,
) -> Option<Homography> {
    let (w, h) = (width as f32, height as f32);
    let rect = [
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(0.0, h),
        Point2::new(w, h),
    ];
    let img = corners
        .to_array()
        .map(|p| Point2::new(p.x as f32, p.y as f32));
    homography_from_4pt(&rect, &img)
}

/// Warp into the rectified frame: each output pixel is mapped through
/// `h_img_from_rect` and sampled bilinearly from `src`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, h_img_from_rect), fields(w = src.width, h = src.height))
)]
pub fn warp_perspective_rgb(
    src: &RgbImageView<'_>,
    h_img_from_rect: Homography,
    out_w: usize,
    out_h: usize,
) -> RgbImage {
    let mut out = RgbImage::new(out_w, out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let pi = h_img_from_rect.apply(Point2::new(x as f32, y as f32));
            let px = sample_bilinear_rgb(src, pi.x, pi.y);
            let i = (y * out_w + x) * 3;
            out.data[i..i + 3].copy_from_slice(&px);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = tol);
        assert_abs_diff_eq!(a.y, b.y, epsilon = tol);
    }

    // A 600×600 board seen slightly from below and to the left.
    fn tilted_board() -> Homography {
        Homography::new(Matrix3::new(
            0.74, -0.03, 95.0, //
            0.02, 0.69, 70.0, //
            -0.00012, 0.00021, 1.0,
        ))
    }

    #[test]
    fn inverse_maps_frame_back_to_board() {
        let h = tilted_board();
        let inv = h.inverse().expect("invertible");
        for p in [
            Point2::new(32.5_f32, 32.5),
            Point2::new(292.5, 357.5),
            Point2::new(567.5, 567.5),
        ] {
            assert_close(inv.apply(h.apply(p)), p, 1e-3);
        }
    }

    #[test]
    fn four_corners_determine_the_warp() {
        let truth = tilted_board();
        let rect = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(600.0, 0.0),
            Point2::new(0.0, 600.0),
            Point2::new(600.0, 600.0),
        ];
        let frame = rect.map(|p| truth.apply(p));
        let solved = homography_from_4pt(&rect, &frame).expect("solvable");
        // Square centers of a1, e4 and h8.
        for p in [
            Point2::new(32.5_f32, 567.5),
            Point2::new(292.5, 292.5),
            Point2::new(567.5, 32.5),
        ] {
            assert_close(solved.apply(p), truth.apply(p), 1e-3);
        }
    }

    #[test]
    fn collinear_target_is_rejected() {
        let src = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 10.0),
        ];
        let dst = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(5.0, 5.0),
            Point2::new(10.0, 10.0),
            Point2::new(15.0, 15.0),
        ];
        assert!(homography_from_4pt(&src, &dst).is_none());
    }

    #[test]
    fn board_homography_maps_rectangle_onto_corners() {
        let corners = CanonicalCorners {
            top_left: Point2::new(100, 80),
            top_right: Point2::new(500, 60),
            bottom_left: Point2::new(90, 520),
            bottom_right: Point2::new(530, 540),
        };
        let h = board_homography(&corners, 600, 600).expect("homography");
        assert_close(h.apply(Point2::new(0.0, 0.0)), Point2::new(100.0, 80.0), 1e-2);
        assert_close(h.apply(Point2::new(600.0, 0.0)), Point2::new(500.0, 60.0), 1e-2);
        assert_close(h.apply(Point2::new(0.0, 600.0)), Point2::new(90.0, 520.0), 1e-2);
        assert_close(
            h.apply(Point2::new(600.0, 600.0)),
            Point2::new(530.0, 540.0),
            1e-2,
        );
    }

    #[test]
    fn identity_warp_copies_pixels() {
        let mut src = RgbImage::new(4, 3);
        for (i, v) in src.data.iter_mut().enumerate() {
            *v = (i * 7 % 251) as u8;
        }
        let id = Homography::new(Matrix3::identity());
        let out = warp_perspective_rgb(&src.view(), id, 4, 3);
        assert_eq!(out, src);
    }
}
