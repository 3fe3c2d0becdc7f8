//! Input namespace
//!
//! Double-buffered event state. The backend is sampled once per frame into
//! `this_frame` after the previous sample rotates into `last_frame`; the
//! three queries compare the two buffers:
//!
//! - `down`: held on both frames
//! - `pressed`: held last frame, released this frame
//! - `up`: held on neither frame
//!
//! Event codes outside the slot range answer `false` to every query.

use crate::backend::{InputSnapshot, EVENT_SLOTS};
use crate::context::EngineContext;

#[derive(Debug, Default)]
pub(crate) struct InputState {
    this_frame: [bool; EVENT_SLOTS],
    last_frame: [bool; EVENT_SLOTS],
    cursor: (f32, f32),
}

impl InputState {
    pub(crate) fn rotate(&mut self, snapshot: InputSnapshot) {
        self.last_frame = self.this_frame;
        self.this_frame = snapshot.down;
        self.cursor = (snapshot.cursor_x, snapshot.cursor_y);
    }

    /// (last, this) held pair for a code, `None` when out of range.
    fn frames(&self, code: i32) -> Option<(bool, bool)> {
        let index = usize::try_from(code).ok()?;
        if index >= EVENT_SLOTS {
            return None;
        }
        Some((self.last_frame[index], self.this_frame[index]))
    }
}

impl EngineContext {
    pub(crate) fn input_down(&self, code: i32) -> bool {
        self.input
            .frames(code)
            .is_some_and(|(last, this)| last && this)
    }

    pub(crate) fn input_pressed(&self, code: i32) -> bool {
        self.input
            .frames(code)
            .is_some_and(|(last, this)| last && !this)
    }

    pub(crate) fn input_up(&self, code: i32) -> bool {
        self.input
            .frames(code)
            .is_some_and(|(last, this)| !last && !this)
    }

    pub(crate) fn input_cursor_x(&self) -> f32 {
        self.input.cursor.0
    }

    pub(crate) fn input_cursor_y(&self) -> f32 {
        self.input.cursor.1
    }
}
