//! Host backend seam
//!
//! Everything platform-shaped (window, renderer, input device, image
//! decoder) sits behind [`HostBackend`]. The runtime itself never touches a
//! windowing or graphics library; an embedder supplies the backend.
//! [`HeadlessBackend`] records every call and is what the test suite runs
//! against.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::Color;

/// Opaque identifier for a decoded image owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub u64);

/// Number of addressable input event slots. Event codes outside
/// `0..EVENT_SLOTS` are never reported as anything.
pub const EVENT_SLOTS: usize = 32;

/// One frame's worth of raw input as sampled by the backend.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pub down: [bool; EVENT_SLOTS],
    pub cursor_x: f32,
    pub cursor_y: f32,
}

impl InputSnapshot {
    /// Snapshot with the given event codes held down.
    pub fn with_down(codes: &[usize]) -> Self {
        let mut snap = Self::default();
        for &code in codes {
            if code < EVENT_SLOTS {
                snap.down[code] = true;
            }
        }
        snap
    }
}

/// Platform services the runtime calls into. Implementations own the window,
/// the render target, and decoded images; the runtime only holds [`ImageId`]
/// handles.
pub trait HostBackend: Send {
    fn set_window_size(&mut self, width: i32, height: i32);
    fn set_title(&mut self, title: &str);
    fn fps(&self) -> f32;
    fn tps(&self) -> f32;

    /// Sample the input device state for the coming frame.
    fn poll_input(&mut self) -> InputSnapshot;

    fn set_target_size(&mut self, width: i32, height: i32);
    fn clear(&mut self, color: Color);
    fn rectangle(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, line: bool);
    fn circle(&mut self, x: f32, y: f32, radius: f32, color: Color, line: bool);
    fn texture(&mut self, image: ImageId, x: f32, y: f32);
    #[allow(clippy::too_many_arguments)]
    fn texture_ex(
        &mut self,
        image: ImageId,
        x: f32,
        y: f32,
        rotation: f32,
        scale_x: f32,
        scale_y: f32,
        tint: Color,
    );
    fn text(&mut self, msg: &str, x: f32, y: f32);

    /// Decode image bytes into a backend-owned image. `None` when the bytes
    /// are not a decodable image.
    fn decode_image(&mut self, bytes: &[u8]) -> Option<ImageId>;
}

/// One recorded backend invocation, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    SetWindowSize(i32, i32),
    SetTitle(String),
    SetTargetSize(i32, i32),
    Clear(Color),
    Rectangle {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
        line: bool,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: Color,
        line: bool,
    },
    Texture {
        image: ImageId,
        x: f32,
        y: f32,
    },
    TextureEx {
        image: ImageId,
        x: f32,
        y: f32,
    },
    Text {
        msg: String,
        x: f32,
        y: f32,
    },
}

/// Backend with no window and no renderer. Draw and window calls are
/// recorded; input is replayed from a queue the test feeds. Image decode
/// succeeds for any non-empty byte slice.
pub struct HeadlessBackend {
    calls: Arc<Mutex<Vec<BackendCall>>>,
    input: Arc<Mutex<VecDeque<InputSnapshot>>>,
    next_image: u64,
    fps: f32,
    tps: f32,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            input: Arc::new(Mutex::new(VecDeque::new())),
            next_image: 0,
            fps: 60.0,
            tps: 60.0,
        }
    }

    /// Shared handle to the call log. Clone before handing the backend to a
    /// session.
    pub fn recorder(&self) -> Arc<Mutex<Vec<BackendCall>>> {
        self.calls.clone()
    }

    /// Shared handle to the input replay queue. Each `poll_input` pops one
    /// snapshot; an empty queue reads as no input.
    pub fn input_queue(&self) -> Arc<Mutex<VecDeque<InputSnapshot>>> {
        self.input.clone()
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBackend for HeadlessBackend {
    fn set_window_size(&mut self, width: i32, height: i32) {
        self.calls.lock().push(BackendCall::SetWindowSize(width, height));
    }

    fn set_title(&mut self, title: &str) {
        self.calls.lock().push(BackendCall::SetTitle(title.to_string()));
    }

    fn fps(&self) -> f32 {
        self.fps
    }

    fn tps(&self) -> f32 {
        self.tps
    }

    fn poll_input(&mut self) -> InputSnapshot {
        self.input.lock().pop_front().unwrap_or_default()
    }

    fn set_target_size(&mut self, width: i32, height: i32) {
        self.calls.lock().push(BackendCall::SetTargetSize(width, height));
    }

    fn clear(&mut self, color: Color) {
        self.calls.lock().push(BackendCall::Clear(color));
    }

    fn rectangle(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, line: bool) {
        self.calls.lock().push(BackendCall::Rectangle {
            x,
            y,
            w,
            h,
            color,
            line,
        });
    }

    fn circle(&mut self, x: f32, y: f32, radius: f32, color: Color, line: bool) {
        self.calls.lock().push(BackendCall::Circle {
            x,
            y,
            radius,
            color,
            line,
        });
    }

    fn texture(&mut self, image: ImageId, x: f32, y: f32) {
        self.calls.lock().push(BackendCall::Texture { image, x, y });
    }

    fn texture_ex(
        &mut self,
        image: ImageId,
        x: f32,
        y: f32,
        _rotation: f32,
        _scale_x: f32,
        _scale_y: f32,
        _tint: Color,
    ) {
        self.calls.lock().push(BackendCall::TextureEx { image, x, y });
    }

    fn text(&mut self, msg: &str, x: f32, y: f32) {
        self.calls.lock().push(BackendCall::Text {
            msg: msg.to_string(),
            x,
            y,
        });
    }

    fn decode_image(&mut self, bytes: &[u8]) -> Option<ImageId> {
        if bytes.is_empty() {
            return None;
        }
        self.next_image += 1;
        Some(ImageId(self.next_image))
    }
}
