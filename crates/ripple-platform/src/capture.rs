use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use ripple_core::{InputSnapshot, Key, Vec2};

#[derive(Default)]
struct Pending {
    pointer: Vec2,
    down: bool,
    scroll: Vec2,
    keys: SmallVec<[Key; 4]>,
}

/// Writer handle for raw input. Clones share one buffer, so the event loop
/// (or any other thread) can record while the frame driver reads.
#[derive(Clone, Default)]
pub struct InputCapture {
    inner: Arc<Mutex<Pending>>,
}

impl InputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_moved(&self, pos: Vec2) {
        self.inner.lock().pointer = pos;
    }

    pub fn pointer_down(&self, down: bool) {
        self.inner.lock().down = down;
    }

    /// Accumulates wheel travel in notches until the next snapshot.
    pub fn wheel(&self, delta: Vec2) {
        let mut p = self.inner.lock();
        p.scroll = p.scroll + delta;
    }

    pub fn key(&self, key: Key) {
        self.inner.lock().keys.push(key);
    }

    /// Copies the current state. Wheel travel and keys are consumed; pointer
    /// position and button state persist.
    pub fn snapshot(&self) -> InputSnapshot {
        let mut p = self.inner.lock();
        InputSnapshot {
            pointer: p.pointer,
            pointer_down: p.down,
            scroll: std::mem::take(&mut p.scroll),
            keys: std::mem::take(&mut p.keys),
        }
    }
}
