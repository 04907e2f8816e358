//! Offscreen RGBA8 pixel buffer.

use crate::Color;

/// CPU-side RGBA8 image that text is rasterized into and composited from.
///
/// Pixels are stored row-major, top row first, tightly packed, so
/// [`Canvas::as_bytes`] can be handed straight to a texture upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Blends `color` over the pixel at `(x, y)`; out-of-bounds writes are dropped.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color.over(self.pixels[i], coverage);
        }
    }

    /// Composites `src` with its top-left corner at `(x, y)`, untransformed.
    ///
    /// The part of `src` falling outside this canvas is clipped.
    pub fn draw_canvas(&mut self, src: &Canvas, x: i32, y: i32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x as i64 + src.width as i64).min(self.width as i64);
        let y1 = (y as i64 + src.height as i64).min(self.height as i64);
        if x0 as i64 >= x1 || y0 as i64 >= y1 {
            return;
        }

        for dy in y0..y1 as i32 {
            let sy = (dy - y) as usize;
            for dx in x0..x1 as i32 {
                let sx = (dx - x) as usize;
                let s = src.pixels[sy * src.width as usize + sx];
                let d = dy as usize * self.width as usize + dx as usize;
                self.pixels[d] = s.over(self.pixels[d], 1.0);
            }
        }
    }

    /// Raw RGBA8 bytes, `width * height * 4` long.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[cfg(feature = "utils")]
    pub fn to_rgba_image(&self) -> anyhow::Result<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.as_bytes().to_vec())
            .ok_or_else(|| {
                anyhow::anyhow!("canvas buffer does not match {}x{}", self.width, self.height)
            })
    }
}
