/// Borrowed row-major 8-bit grayscale buffer.
///
/// Built from an [`image::GrayImage`] without copying; the sampling helpers
/// treat everything outside the buffer as black.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> From<&'a ::image::GrayImage> for GrayImageView<'a> {
    fn from(img: &'a ::image::GrayImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            data: img.as_raw(),
        }
    }
}

impl GrayImageView<'_> {
    /// Pixel value, or 0 outside the image.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.data[y as usize * self.width + x as usize]
    }
}

#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = src.get(x0, y0) as f32;
    let p10 = src.get(x0 + 1, y0) as f32;
    let p01 = src.get(x0, y0 + 1) as f32;
    let p11 = src.get(x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayImageView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear(src, x, y).round().clamp(0.0, 255.0) as u8
}

/// Intensity with BT.601 weights (0.299 R + 0.587 G + 0.114 B), rounded.
///
/// Gray pixels map to themselves.
pub fn luma_bt601(rgb: &::image::RgbImage) -> ::image::GrayImage {
    ::image::GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let weighted = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
        ::image::Luma([((weighted + 500) / 1000) as u8])
    })
}
