//! Inputfield - a multi-line text input widget for game loops.
//!
//! The field collects typed text, backspace and enter each tick, wraps the text
//! to its pixel width and keeps the result rasterized in an offscreen
//! [`Canvas`] that is composited onto the frame on every draw.
//!
//! # Example
//! ```no_run
//! use inputfield::{Canvas, FrameInput, GlyphFace, Rect, TextField};
//!
//! fn main() -> anyhow::Result<()> {
//!     let face = GlyphFace::from_file("assets/DejaVuSans.ttf", 32.0)?;
//!     let field = TextField::new(face);
//!     field.set_rect(Rect::new(5, 190, 630, 100))?;
//!
//!     let mut screen = Canvas::new(640, 480);
//!     // Once per tick:
//!     field.update(&FrameInput::new().with_text("hello"))?;
//!     field.draw(&mut screen);
//!     Ok(())
//! }
//! ```

mod canvas;
mod color;
mod face;
mod field;
mod input;
mod key;
mod rect;
mod wrap;

pub use canvas::Canvas;
pub use color::Color;
pub use face::{FontFace, GlyphFace, TextBounds};
pub use field::{TextField, TextFieldConfig};
pub use input::{FrameInput, InputManager};
pub use key::Key;
pub use rect::Rect;
pub use wrap::wrap_content;
