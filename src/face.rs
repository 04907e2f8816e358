//! Text measurement and rasterization.

use ab_glyph::{Font as _, FontArc, Glyph, GlyphId, PxScale, ScaleFont as _};

use crate::{Canvas, Color};

/// Pixel extent of a measured string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextBounds {
    pub width: u32,
    pub height: u32,
}

/// A font face the field measures and draws with.
///
/// `draw` places the string's baseline at `baseline_y`, starting at `x`.
pub trait FontFace: Send + Sync {
    fn measure(&self, text: &str) -> TextBounds;

    fn draw(
        &self,
        target: &mut Canvas,
        text: &str,
        x: i32,
        baseline_y: i32,
        color: Color,
    ) -> anyhow::Result<()>;
}

/// [`FontFace`] backed by an `ab_glyph` font at a fixed pixel size.
#[derive(Clone)]
pub struct GlyphFace {
    font: FontArc,
    scale: PxScale,
}

impl std::fmt::Debug for GlyphFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFace")
            .field("px_size", &self.scale.y)
            .finish()
    }
}

impl GlyphFace {
    /// Parses TrueType/OpenType data and fixes the face at `px_size`.
    pub fn from_bytes(font_data: Vec<u8>, px_size: f32) -> anyhow::Result<Self> {
        let font = FontArc::try_from_vec(font_data)
            .map_err(|e| anyhow::anyhow!("Failed to parse font: {}", e))?;
        Ok(Self::new(font, px_size))
    }

    pub fn from_file(path: &str, px_size: f32) -> anyhow::Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to load font from {}: {}", path, e))?;
        Self::from_bytes(data, px_size)
    }

    pub fn new(font: FontArc, px_size: f32) -> Self {
        let px_size = if px_size.is_finite() { px_size } else { 1.0 };
        Self {
            font,
            scale: PxScale::from(px_size.max(1.0)),
        }
    }

    pub fn px_size(&self) -> f32 {
        self.scale.y
    }

    /// Lays `text` out on one line, yielding each glyph at its pen position.
    fn layout(&self, text: &str, x: f32, baseline_y: f32) -> Vec<Glyph> {
        let scaled = self.font.as_scaled(self.scale);
        let mut caret = x;
        let mut prev: Option<GlyphId> = None;
        let mut glyphs = Vec::with_capacity(text.len());

        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            glyphs.push(id.with_scale_and_position(self.scale, ab_glyph::point(caret, baseline_y)));
            caret += scaled.h_advance(id);
            prev = Some(id);
        }

        glyphs
    }

    fn advance_width(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0f32;
        let mut prev: Option<GlyphId> = None;

        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }

        width
    }
}

impl FontFace for GlyphFace {
    /// Width follows pen advances and kerning; height is the ink extent of the
    /// glyphs that have outlines.
    fn measure(&self, text: &str) -> TextBounds {
        let width = self.advance_width(text).ceil().max(0.0) as u32;

        let mut min_y = f32::MAX;
        let mut max_y = f32::MIN;
        for glyph in self.layout(text, 0.0, 0.0) {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                min_y = min_y.min(bounds.min.y);
                max_y = max_y.max(bounds.max.y);
            }
        }
        let height = if max_y > min_y {
            (max_y - min_y).ceil() as u32
        } else {
            0
        };

        TextBounds { width, height }
    }

    fn draw(
        &self,
        target: &mut Canvas,
        text: &str,
        x: i32,
        baseline_y: i32,
        color: Color,
    ) -> anyhow::Result<()> {
        for glyph in self.layout(text, x as f32, baseline_y as f32) {
            // Whitespace has no outline.
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let ox = bounds.min.x.floor() as i32;
            let oy = bounds.min.y.floor() as i32;
            outlined.draw(|gx, gy, coverage| {
                target.blend_pixel(ox + gx as i32, oy + gy as i32, color, coverage);
            });
        }
        Ok(())
    }
}
