//! Platform namespace

use tracing::info;

use crate::context::EngineContext;

impl EngineContext {
    /// Guest log line, forwarded to the host's subscriber.
    pub(crate) fn platform_log(&mut self, msg: &str) {
        info!(target: "guest", "{msg}");
    }

    pub(crate) fn platform_set_window_size(&mut self, width: i32, height: i32) {
        self.backend.set_window_size(width, height);
    }

    pub(crate) fn platform_set_title(&mut self, title: &str) {
        self.backend.set_title(title);
    }

    /// Request session shutdown. Takes effect at the top of the next frame.
    pub(crate) fn platform_exit(&mut self) {
        self.exit_requested = true;
    }

    pub(crate) fn platform_fps(&self) -> f32 {
        self.backend.fps()
    }

    pub(crate) fn platform_tps(&self) -> f32 {
        self.backend.tps()
    }
}
