mod keyboard;
mod serial;

pub use keyboard::{InputConfig, KeyboardInput};
pub use serial::{decode_frame, SerialFrame, SerialInput};

/// Keys the game reacts to. Window-system key codes are translated into these
/// by the loop runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    D,
    T,
    Enter,
    Escape,
}

pub(crate) const KEY_COUNT: usize = 6;

impl Key {
    pub const ALL: [Key; KEY_COUNT] = [Key::W, Key::A, Key::D, Key::T, Key::Enter, Key::Escape];

    pub(crate) const fn index(self) -> usize {
        match self {
            Key::W => 0,
            Key::A => 1,
            Key::D => 2,
            Key::T => 3,
            Key::Enter => 4,
            Key::Escape => 5,
        }
    }
}

/// Normalized window/keyboard event stream consumed by [`KeyboardInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    QuitRequested,
}
