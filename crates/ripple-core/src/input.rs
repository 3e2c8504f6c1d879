use smallvec::SmallVec;

use crate::Vec2;

/// Logical keys delivered to widgets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Backspace,
    Tab,
    /// Shift+Tab.
    BackTab,
    Enter,
    Space,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Delete,
    Escape,
    PageUp,
    PageDown,
    /// Platform back gesture or button.
    Back,
    Character(char),
}

/// Everything the host sampled for one frame.
///
/// Touch is level-triggered: the pointer position and whether it is held are
/// reported every frame, and widgets derive press and release edges from the
/// previous frame's state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub pointer: Vec2,
    pub pointer_down: bool,
    /// Wheel travel in notches; positive scrolls content down the screen.
    pub scroll: Vec2,
    pub keys: SmallVec<[Key; 4]>,
}

impl InputSnapshot {
    pub fn pointer(pointer: Vec2, down: bool) -> Self {
        Self {
            pointer,
            pointer_down: down,
            ..Self::default()
        }
    }

    pub fn with_scroll(mut self, delta: Vec2) -> Self {
        self.scroll = delta;
        self
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }
}
