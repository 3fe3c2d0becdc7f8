//! Graphics namespace
//!
//! Thin dispatch onto the backend. Texture draws resolve the guest's handle
//! through the asset table first; an invalid handle skips the draw with a
//! log line instead of failing the call.

use tracing::warn;

use crate::api::Color;
use crate::context::EngineContext;

impl EngineContext {
    pub(crate) fn graphics_set_target_size(&mut self, width: i32, height: i32) {
        self.backend.set_target_size(width, height);
    }

    pub(crate) fn graphics_clear(&mut self, color: Color) {
        self.backend.clear(color);
    }

    pub(crate) fn graphics_texture(&mut self, handle: u32, x: f32, y: f32) {
        let Some(image) = self.assets.image(handle) else {
            warn!(handle, "texture draw with invalid handle skipped");
            return;
        };
        self.backend.texture(image, x, y);
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn graphics_texture_ex(
        &mut self,
        handle: u32,
        x: f32,
        y: f32,
        rot: f32,
        sx: f32,
        sy: f32,
        color: Color,
    ) {
        let Some(image) = self.assets.image(handle) else {
            warn!(handle, "texture draw with invalid handle skipped");
            return;
        };
        self.backend.texture_ex(image, x, y, rot, sx, sy, color);
    }

    pub(crate) fn graphics_rectangle(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
        line: bool,
    ) {
        self.backend.rectangle(x, y, w, h, color, line);
    }

    pub(crate) fn graphics_circle(&mut self, x: f32, y: f32, rad: f32, color: Color, line: bool) {
        self.backend.circle(x, y, rad, color, line);
    }

    pub(crate) fn graphics_text(&mut self, msg: &str, x: f32, y: f32) {
        self.backend.text(msg, x, y);
    }
}
