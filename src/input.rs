#[cfg(feature = "winit")]
use winit::event::{ElementState, Ime, WindowEvent};
#[cfg(feature = "winit")]
use winit::keyboard::PhysicalKey;

use crate::Key;

/// Input gathered for one tick.
///
/// `backspace` and `confirm` are edge-triggered: true only on the tick the key
/// went down. `typed` holds the characters produced since the previous tick,
/// in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub backspace: bool,
    pub confirm: bool,
    pub typed: Vec<char>,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backspace(mut self) -> Self {
        self.backspace = true;
        self
    }

    pub fn with_confirm(mut self) -> Self {
        self.confirm = true;
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.typed.extend(text.chars());
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.backspace && !self.confirm && self.typed.is_empty()
    }
}

/// Tracks key edges and typed text between frames.
///
/// Feed it events as they arrive, drain it with [`InputManager::take_frame`]
/// once per tick, then call [`InputManager::end_frame`].
#[derive(Debug, Clone)]
pub struct InputManager {
    keys_down: [u64; Key::WORDS],
    keys_pressed: [u64; Key::WORDS],
    keys_released: [u64; Key::WORDS],

    focused: bool,
    text_input: String,
}

impl Default for InputManager {
    fn default() -> Self {
        Self {
            keys_down: [0u64; Key::WORDS],
            keys_pressed: [0u64; Key::WORDS],
            keys_released: [0u64; Key::WORDS],

            focused: true,
            text_input: String::new(),
        }
    }
}

fn key_word_bit(key: Key) -> (usize, u64) {
    let idx = key.as_index();
    (idx / 64, 1u64 << (idx % 64))
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn text_input(&self) -> &str {
        &self.text_input
    }

    pub fn key_down(&self, key: Key) -> bool {
        let (w, m) = key_word_bit(key);
        (self.keys_down[w] & m) != 0
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        let (w, m) = key_word_bit(key);
        (self.keys_pressed[w] & m) != 0
    }

    pub fn key_released(&self, key: Key) -> bool {
        let (w, m) = key_word_bit(key);
        (self.keys_released[w] & m) != 0
    }

    /// Records a key going down. Repeats while held do not count as new presses.
    pub fn press(&mut self, key: Key) {
        let (w, mask) = key_word_bit(key);
        if (self.keys_down[w] & mask) == 0 {
            self.keys_down[w] |= mask;
            self.keys_pressed[w] |= mask;
        }
    }

    pub fn release(&mut self, key: Key) {
        let (w, mask) = key_word_bit(key);
        self.keys_down[w] &= !mask;
        self.keys_released[w] |= mask;
    }

    pub fn handle_received_character(&mut self, ch: char) {
        // Backspace and enter arrive as control chars; their keys handle them.
        if ch.is_control() {
            return;
        }
        self.text_input.push(ch);
    }

    pub fn handle_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.handle_received_character(ch);
        }
    }

    pub fn handle_focus(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.keys_down = [0u64; Key::WORDS];
            self.keys_pressed = [0u64; Key::WORDS];
            self.keys_released = [0u64; Key::WORDS];
            self.text_input.clear();
        }
    }

    /// Drains this tick's edges and typed text.
    ///
    /// Each press and each character is handed out once; a second call in the
    /// same tick returns an empty batch.
    pub fn take_frame(&mut self) -> FrameInput {
        let backspace = self.key_pressed(Key::Backspace);
        let confirm = Key::ALL
            .into_iter()
            .any(|key| key.is_confirm() && self.key_pressed(key));
        self.keys_pressed = [0u64; Key::WORDS];

        FrameInput {
            backspace,
            confirm,
            typed: std::mem::take(&mut self.text_input).chars().collect(),
        }
    }

    pub fn end_frame(&mut self) {
        self.keys_pressed = [0u64; Key::WORDS];
        self.keys_released = [0u64; Key::WORDS];
        self.text_input.clear();
    }

    #[cfg(feature = "winit")]
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(key) = Key::from_winit_key_code(code) {
                        match event.state {
                            ElementState::Pressed => self.press(key),
                            ElementState::Released => self.release(key),
                        }
                    }
                }
                if event.state == ElementState::Pressed {
                    if let Some(text) = event.text.as_ref() {
                        self.handle_text(text.as_str());
                    }
                }
            }
            WindowEvent::Ime(Ime::Commit(value)) => self.handle_text(value),
            WindowEvent::Focused(focused) => self.handle_focus(*focused),
            _ => {}
        }
    }
}
