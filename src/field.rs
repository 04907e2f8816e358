use std::sync::{Mutex, MutexGuard};

use anyhow::Context as _;

use crate::{Canvas, Color, FontFace, FrameInput, InputManager, Rect, wrap};

const DEFAULT_PADDING: u32 = 2;
const LINE_HEIGHT_PROBE: &str = "ATZgpq.";

/// Static style of a [`TextField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFieldConfig {
    pub text_color: Color,
    pub background: Color,
    pub padding: u32,
}

impl Default for TextFieldConfig {
    fn default() -> Self {
        Self {
            text_color: Color::BLACK,
            background: Color::WHITE,
            padding: DEFAULT_PADDING,
        }
    }
}

impl TextFieldConfig {
    pub fn with_text_color(mut self, color: impl Into<Color>) -> Self {
        self.text_color = color.into();
        self
    }

    pub fn with_background(mut self, color: impl Into<Color>) -> Self {
        self.background = color.into();
        self
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }
}

#[derive(Debug, Default)]
struct FieldState {
    bounds: Rect,
    content: String,
    wrapped_lines: Vec<String>,
    /// Present iff `bounds` covers at least one pixel.
    render_target: Option<Canvas>,
}

/// Multi-line text input field.
///
/// Call [`TextField::update`] and [`TextField::draw`] once per tick. The field
/// starts hidden; give it a position and size with [`TextField::set_rect`].
pub struct TextField {
    face: Box<dyn FontFace>,
    line_height: u32,
    config: TextFieldConfig,
    state: Mutex<FieldState>,
}

impl std::fmt::Debug for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("TextField")
            .field("bounds", &state.bounds)
            .field("content_len", &state.content.len())
            .field("wrapped_lines", &state.wrapped_lines.len())
            .field("line_height", &self.line_height)
            .finish()
    }
}

impl TextField {
    pub fn new(face: impl FontFace + 'static) -> Self {
        Self::with_config(face, TextFieldConfig::default())
    }

    pub fn with_config(face: impl FontFace + 'static, config: TextFieldConfig) -> Self {
        let line_height = face.measure(LINE_HEIGHT_PROBE).height;
        Self {
            face: Box::new(face),
            line_height,
            config,
            state: Mutex::new(FieldState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FieldState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            log::warn!("input field lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn line_height(&self) -> u32 {
        self.line_height
    }

    pub fn config(&self) -> TextFieldConfig {
        self.config
    }

    pub fn get_rect(&self) -> Rect {
        self.lock().bounds
    }

    pub fn is_visible(&self) -> bool {
        self.lock().render_target.is_some()
    }

    pub fn content(&self) -> String {
        self.lock().content.clone()
    }

    /// Lines as last rendered. Empty while the field is hidden.
    pub fn wrapped_lines(&self) -> Vec<String> {
        self.lock().wrapped_lines.clone()
    }

    /// Runs `f` on the cached render target, if the field is visible.
    pub fn with_render_target<R>(&self, f: impl FnOnce(&Canvas) -> R) -> Option<R> {
        self.lock().render_target.as_ref().map(f)
    }

    /// Moves and resizes the field.
    ///
    /// An empty rect hides the field and releases its render target. Any other
    /// rect gets a fresh render target of exactly its size and a full redraw.
    pub fn set_rect(&self, rect: Rect) -> anyhow::Result<()> {
        let mut state = self.lock();
        state.bounds = rect;

        if rect.is_empty() {
            if state.render_target.take().is_some() {
                log::debug!("input field hidden, render target released");
            }
            state.wrapped_lines.clear();
            return Ok(());
        }

        log::debug!(
            "input field render target allocated: {}x{}",
            rect.width(),
            rect.height()
        );
        state.render_target = Some(Canvas::new(rect.width(), rect.height()));
        self.redraw(&mut state)
            .context("failed to render input field after layout change")
    }

    /// Applies one tick of input.
    ///
    /// Backspace drops the last char, confirm appends a line break, typed
    /// chars are appended in order. The field re-renders only if one of
    /// those changed the content.
    pub fn update(&self, input: &FrameInput) -> anyhow::Result<()> {
        let mut state = self.lock();
        let mut redraw = false;

        if input.backspace && state.content.pop().is_some() {
            redraw = true;
        }

        if input.confirm {
            state.content.push('\n');
            redraw = true;
        }

        if !input.typed.is_empty() {
            state.content.extend(input.typed.iter());
            redraw = true;
        }

        log::trace!(
            "input field update: backspace={} confirm={} typed={} redraw={}",
            input.backspace,
            input.confirm,
            input.typed.len(),
            redraw
        );

        if !redraw {
            return Ok(());
        }
        self.redraw(&mut state)
            .context("failed to redraw input field")
    }

    /// Drains this tick's input from `input` and applies it.
    pub fn update_from(&self, input: &mut InputManager) -> anyhow::Result<()> {
        let frame = input.take_frame();
        self.update(&frame)
    }

    /// Replaces the whole content and re-renders.
    pub fn set_content(&self, content: impl Into<String>) -> anyhow::Result<()> {
        let mut state = self.lock();
        state.content = content.into();
        self.redraw(&mut state)
            .context("failed to redraw input field")
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.set_content(String::new())
    }

    /// Composites the field onto `target` at its top-left corner. Hidden
    /// fields draw nothing.
    pub fn draw(&self, target: &mut Canvas) {
        let state = self.lock();
        if let Some(image) = state.render_target.as_ref() {
            target.draw_canvas(image, state.bounds.x(), state.bounds.y());
        }
    }

    fn redraw(&self, state: &mut FieldState) -> anyhow::Result<()> {
        let FieldState {
            bounds,
            content,
            wrapped_lines,
            render_target,
        } = state;

        let Some(image) = render_target.as_mut() else {
            wrapped_lines.clear();
            return Ok(());
        };

        let padding = self.config.padding.saturating_mul(2);
        let max_width = bounds.width().saturating_sub(padding);
        *wrapped_lines = wrap::wrap_content(self.face.as_ref(), content, max_width);
        log::debug!(
            "input field wrapped {} chars into {} lines",
            content.chars().count(),
            wrapped_lines.len()
        );

        image.fill(self.config.background);
        for (i, line) in wrapped_lines.iter().enumerate() {
            let baseline = self.line_height as i64 * (i as i64 + 1);
            let baseline = baseline.min(i32::MAX as i64) as i32;
            self.face
                .draw(image, line, 0, baseline, self.config.text_color)
                .with_context(|| format!("failed to draw line {}", i))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Key;
    use crate::face::tests::{BrokenFace, MonoFace, dark_pixels, dejavu};

    fn field() -> TextField {
        TextField::new(MonoFace::new())
    }

    /// Visible field whose text area is 115px wide.
    fn shown_field() -> TextField {
        let f = field();
        f.set_rect(Rect::new(5, 5, 119, 60)).unwrap();
        f
    }

    fn typed(text: &str) -> FrameInput {
        FrameInput::new().with_text(text)
    }

    fn snapshot(f: &TextField) -> Canvas {
        let mut screen = Canvas::new(200, 100);
        f.draw(&mut screen);
        screen
    }

    #[test]
    fn test_line_height_from_probe() {
        assert_eq!(field().line_height(), 12);
    }

    #[test]
    fn test_starts_hidden() {
        let f = field();
        assert!(f.get_rect().is_zero());
        assert!(!f.is_visible());
        assert_eq!(snapshot(&f), Canvas::new(200, 100));
    }

    #[test]
    fn test_set_rect_allocates_target_of_rect_size() {
        let f = shown_field();
        assert_eq!(f.get_rect(), Rect::new(5, 5, 119, 60));
        assert_eq!(
            f.with_render_target(|c| (c.width(), c.height())),
            Some((119, 60))
        );
        assert_eq!(
            f.with_render_target(|c| c.pixel(0, 0)),
            Some(Some(Color::WHITE))
        );
    }

    #[test]
    fn test_wraps_on_whitespace() {
        let f = shown_field();
        f.update(&typed("hello world foo")).unwrap();
        assert_eq!(f.content(), "hello world foo");
        assert_eq!(f.wrapped_lines(), vec!["hello world", "foo"]);
    }

    #[test]
    fn test_relayout_rewraps() {
        let f = shown_field();
        f.update(&typed("hello world foo")).unwrap();
        f.set_rect(Rect::new(0, 0, 1000, 20)).unwrap();
        assert_eq!(f.wrapped_lines(), vec!["hello world foo"]);
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let f = shown_field();
        let before = snapshot(&f);
        f.update(&FrameInput::new().with_backspace()).unwrap();
        assert_eq!(f.content(), "");
        assert!(f.wrapped_lines().is_empty());
        assert_eq!(snapshot(&f), before);
    }

    #[test]
    fn test_backspace_removes_one_code_point() {
        let f = shown_field();
        f.update(&typed("caf\u{e9}\u{1F600}")).unwrap();

        f.update(&FrameInput::new().with_backspace()).unwrap();
        assert_eq!(f.content(), "caf\u{e9}");
        f.update(&FrameInput::new().with_backspace()).unwrap();
        assert_eq!(f.content(), "caf");
        assert_eq!(f.wrapped_lines(), vec!["caf"]);
    }

    #[test]
    fn test_update_order_backspace_then_confirm_then_text() {
        let f = shown_field();
        f.update(&typed("ab")).unwrap();
        let frame = FrameInput::new()
            .with_backspace()
            .with_confirm()
            .with_text("c");
        f.update(&frame).unwrap();
        assert_eq!(f.content(), "a\nc");
        assert_eq!(f.wrapped_lines(), vec!["a", "c"]);
    }

    #[test]
    fn test_enter_always_appends_and_redraws() {
        let f = shown_field();
        f.update(&typed("a")).unwrap();
        f.update(&FrameInput::new().with_confirm()).unwrap();
        assert_eq!(f.content(), "a\n");

        f.update(&FrameInput::new().with_confirm()).unwrap();
        f.update(&typed("b")).unwrap();
        assert_eq!(f.content(), "a\n\nb");
        assert_eq!(f.wrapped_lines(), vec!["a", "b"]);
    }

    #[test]
    fn test_enter_on_hidden_field_still_appends() {
        let f = field();
        f.update(&FrameInput::new().with_confirm()).unwrap();
        assert_eq!(f.content(), "\n");
        assert!(f.wrapped_lines().is_empty());
    }

    #[test]
    fn test_text_is_rasterized_below_first_baseline() {
        let f = shown_field();
        f.update(&typed("a")).unwrap();
        let ink = f
            .with_render_target(|c| [c.pixel(0, 0), c.pixel(0, 11), c.pixel(0, 12)])
            .unwrap();
        let expected = [Color::BLACK, Color::BLACK, Color::WHITE];
        assert_eq!(ink, expected.map(Some));
    }

    #[test]
    fn test_draw_composites_at_origin_and_is_idempotent() {
        let f = shown_field();
        f.update(&typed("hi")).unwrap();

        let first = snapshot(&f);
        let second = snapshot(&f);
        assert_eq!(first, second);
        assert_eq!(first.pixel(4, 4), Some(Color::TRANSPARENT));
        assert_eq!(first.pixel(5, 5), Some(Color::BLACK));
        assert_eq!(first.pixel(5 + 118, 5 + 59), Some(Color::WHITE));
        assert_eq!(first.pixel(5 + 119, 5), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_zero_rect_hides_field() {
        let f = shown_field();
        f.update(&typed("hello")).unwrap();
        f.set_rect(Rect::default()).unwrap();

        assert!(!f.is_visible());
        assert_eq!(f.with_render_target(|_| ()), None);
        assert_eq!(snapshot(&f), Canvas::new(200, 100));
        assert_eq!(f.content(), "hello");
    }

    #[test]
    fn test_degenerate_rect_hides_field() {
        let f = shown_field();
        f.set_rect(Rect::new(10, 10, 0, 30)).unwrap();
        assert!(!f.is_visible());
    }

    #[test]
    fn test_set_content_and_clear() {
        let f = shown_field();
        f.set_content("one\ntwo").unwrap();
        assert_eq!(f.wrapped_lines(), vec!["one", "two"]);
        f.clear().unwrap();
        assert_eq!(f.content(), "");
        assert!(f.wrapped_lines().is_empty());
    }

    #[test]
    fn test_padding_narrows_wrap_width() {
        let config = TextFieldConfig::default().with_padding(10);
        let f = TextField::with_config(MonoFace::new(), config);
        // 119 - 20 = 99px: "hello world" no longer fits.
        f.set_rect(Rect::new(0, 0, 119, 60)).unwrap();
        f.update(&typed("hello world")).unwrap();
        assert_eq!(f.wrapped_lines(), vec!["hello", "world"]);
    }

    #[test]
    fn test_custom_colors() {
        let config = TextFieldConfig::default()
            .with_text_color([1.0, 0.0, 0.0, 1.0])
            .with_background(Color::BLACK);
        let f = TextField::with_config(MonoFace::new(), config);
        f.set_rect(Rect::new(0, 0, 50, 20)).unwrap();
        f.update(&typed("x")).unwrap();
        let px = f
            .with_render_target(|c| (c.pixel(0, 0), c.pixel(40, 0)))
            .unwrap();
        assert_eq!(px, (Some(Color::rgba(255, 0, 0, 255)), Some(Color::BLACK)));
    }

    #[test]
    fn test_render_error_propagates_but_content_updates() {
        let f = TextField::new(BrokenFace);
        // Hidden fields never rasterize.
        f.update(&typed("x")).unwrap();

        let err = f.set_rect(Rect::new(0, 0, 100, 40)).unwrap_err();
        assert!(format!("{err:#}").contains("face is not usable"));
        assert!(f.is_visible());

        let err = f.update(&typed("y")).unwrap_err();
        assert!(err.to_string().contains("failed to redraw input field"));
        assert_eq!(f.content(), "xy");
    }

    #[test]
    fn test_update_from_input_manager() {
        let f = shown_field();
        let mut input = InputManager::new();
        input.handle_text("ok");
        input.press(Key::Enter);
        f.update_from(&mut input).unwrap();
        input.end_frame();
        assert_eq!(f.content(), "\nok");

        // Held key yields no second line break.
        input.press(Key::Enter);
        f.update_from(&mut input).unwrap();
        assert_eq!(f.content(), "\nok");
    }

    #[test]
    fn test_renders_with_real_font() {
        let face = dejavu(32.0);
        let probe_height = face.measure(LINE_HEIGHT_PROBE).height;
        let f = TextField::new(face.clone());
        assert!(f.line_height() > 0);
        assert_eq!(f.line_height(), probe_height);

        f.set_rect(Rect::new(0, 0, 200, 120)).unwrap();
        f.update(&typed("hello world foo bar")).unwrap();

        let lines = f.wrapped_lines();
        assert!(lines.len() >= 2, "{lines:?}");
        assert_eq!(lines.join(" "), "hello world foo bar");
        assert!(lines.iter().all(|l| face.measure(l).width < 196));

        assert!(f.with_render_target(dark_pixels).unwrap() > 0);
    }

    #[test]
    fn test_shared_across_threads() {
        let f = std::sync::Arc::new(shown_field());
        let worker = {
            let f = f.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    f.update(&typed("a")).unwrap();
                }
            })
        };
        for i in 0..50 {
            f.set_rect(Rect::new(0, 0, 60 + i, 40)).unwrap();
            let _ = snapshot(&f);
        }
        worker.join().unwrap();
        assert_eq!(f.content().len(), 50);
        assert!(f.wrapped_lines().iter().all(|l| l.chars().count() <= 10));
    }
}
