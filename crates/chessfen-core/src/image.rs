/// Borrowed interleaved RGB buffer, row-major, `data.len() == width * height * 3`.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height * 3],
        }
    }

    pub fn view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

#[inline]
fn get_rgb(src: &RgbImageView<'_>, x: i32, y: i32) -> [f32; 3] {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return [0.0; 3];
    }
    let i = (y as usize * src.width + x as usize) * 3;
    [
        src.data[i] as f32,
        src.data[i + 1] as f32,
        src.data[i + 2] as f32,
    ]
}

/// Bilinear sample of all three channels; pixels outside the image read as black.
#[inline]
pub fn sample_bilinear_rgb(src: &RgbImageView<'_>, x: f32, y: f32) -> [u8; 3] {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let a = p00[c] + fx * (p10[c] - p00[c]);
        let b = p01[c] + fx * (p11[c] - p01[c]);
        out[c] = (a + fy * (b - a)).round().clamp(0.0, 255.0) as u8;
    }
    out
}
