use bytemuck::{Pod, Zeroable};

/// Straight-alpha RGBA8 color, laid out exactly as one canvas pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Source-over blend of `self` (scaled by `coverage`) onto `dst`.
    pub(crate) fn over(self, dst: Color, coverage: f32) -> Color {
        let alpha = (self.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return dst;
        }
        let inv = 1.0 - alpha;
        let mix = |s: u8, d: u8| channel(s as f32 * alpha + d as f32 * inv);
        Color {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a: channel(alpha * 255.0 + dst.a as f32 * inv),
        }
    }
}

fn channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

impl From<[f32; 4]> for Color {
    fn from(v: [f32; 4]) -> Self {
        let c = |x: f32| {
            let x = if x.is_finite() { x } else { 0.0 };
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        Color::rgba(c(v[0]), c(v[1]), c(v[2]), c(v[3]))
    }
}
