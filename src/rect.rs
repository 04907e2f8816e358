/// Pixel rectangle in host coordinates.
///
/// The zero value is the "hidden" rectangle: a field laid out with it keeps no
/// render target and draws nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub(crate) x: i32,
    /// Y coordinate of the top-left corner.
    pub(crate) y: i32,
    /// Width in pixels.
    pub(crate) width: u32,
    /// Height in pixels.
    pub(crate) height: u32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle spanning `[x0, x1) x [y0, y1)`.
    ///
    /// Inverted corners are swapped, so the result is always well formed.
    pub fn from_min_max(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (y0, y1) = (y0.min(y1), y0.max(y1));
        Self::new(x0, y0, x1.abs_diff(x0), y1.abs_diff(y0))
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_zero(&self) -> bool {
        *self == Rect::default()
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
