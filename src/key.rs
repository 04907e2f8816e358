/// Keys the input field reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Backspace,
    Enter,
    NumpadEnter,
}

impl Key {
    pub const ALL: [Key; 3] = [Key::Backspace, Key::Enter, Key::NumpadEnter];
    pub const COUNT: usize = Self::ALL.len();
    pub(crate) const WORDS: usize = Self::COUNT.div_ceil(64);

    pub(crate) fn as_index(self) -> usize {
        match self {
            Key::Backspace => 0,
            Key::Enter => 1,
            Key::NumpadEnter => 2,
        }
    }

    /// True for the keys that insert a line break.
    pub fn is_confirm(self) -> bool {
        matches!(self, Key::Enter | Key::NumpadEnter)
    }

    #[cfg(feature = "winit")]
    pub fn from_winit_key_code(code: winit::keyboard::KeyCode) -> Option<Self> {
        use winit::keyboard::KeyCode as W;
        match code {
            W::Backspace => Some(Key::Backspace),
            W::Enter => Some(Key::Enter),
            W::NumpadEnter => Some(Key::NumpadEnter),
            _ => None,
        }
    }
}
