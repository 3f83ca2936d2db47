//! Window events and input state types.

use bitflags::bitflags;

/// An event reported by the canvas during [`poll_events`](crate::window::Canvas::poll_events).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    /// The user requested that the window be closed.
    Close,
    /// The framebuffer was resized to the given size, in pixels.
    FramebufferSize(u32, u32),
    /// The cursor moved to the given position, in pixels from the top-left corner.
    CursorPos(f64, f64, Modifiers),
    /// A mouse button was pressed or released.
    MouseButton(MouseButton, Action, Modifiers),
    /// The mouse wheel (or trackpad) scrolled by the given amount.
    Scroll(f64, f64, Modifiers),
    /// A keyboard key was pressed or released.
    Key(Key, Action, Modifiers),
}

/// Whether a key or button is pressed or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// The key or button is released.
    Release,
    /// The key or button is pressed.
    Press,
}

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(usize)]
pub enum MouseButton {
    /// The left mouse button.
    Left = 0,
    /// The right mouse button.
    Right = 1,
    /// The middle mouse button (wheel click).
    Middle = 2,
}

impl MouseButton {
    pub(crate) const COUNT: usize = MouseButton::Middle as usize + 1;
}

/// The keyboard keys the canvas tracks.
///
/// This is deliberately a small set: the keys the built-in controls and
/// typical demos bind. Everything else maps to [`Key::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(usize)]
pub enum Key {
    Escape = 0,
    Return,
    Space,
    Tab,
    Back,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    LShift,
    RShift,
    LControl,
    RControl,
    LAlt,
    RAlt,
    /// Any key not part of the tracked set.
    Unknown,
}

impl Key {
    pub(crate) const COUNT: usize = Key::Unknown as usize + 1;
}

bitflags! {
    /// Keyboard modifiers held while an event was emitted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0001;
        const CONTROL = 0b0010;
        const ALT     = 0b0100;
        const SUPER   = 0b1000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_discriminants_stay_in_state_table_bounds() {
        for key in [Key::Escape, Key::Return, Key::RAlt, Key::Unknown] {
            assert!((key as usize) < Key::COUNT);
        }
        assert!((MouseButton::Middle as usize) < MouseButton::COUNT);
    }

    #[test]
    fn modifiers_combine_as_flags() {
        let m = Modifiers::SHIFT | Modifiers::CONTROL;
        assert!(m.contains(Modifiers::SHIFT));
        assert!(!m.contains(Modifiers::ALT));
        assert_eq!(m.bits(), 0b0011);
    }
}
