//! Asset namespace
//!
//! Loads images from the host filesystem into a backend-owned table.
//! Handles are table indices plus one; zero is the invalid handle. The
//! table is append-only and lives in the shared context, so loaded textures
//! survive module reloads.

use std::fs;

use tracing::{error, info};

use crate::backend::ImageId;
use crate::context::EngineContext;

#[derive(Debug, Default)]
pub(crate) struct AssetStore {
    textures: Vec<TextureEntry>,
}

#[derive(Debug)]
struct TextureEntry {
    path: String,
    image: ImageId,
}

impl AssetStore {
    fn handle_for(&self, path: &str) -> Option<u32> {
        self.textures
            .iter()
            .position(|t| t.path == path)
            .map(|i| i as u32 + 1)
    }

    fn insert(&mut self, path: &str, image: ImageId) -> u32 {
        self.textures.push(TextureEntry {
            path: path.to_string(),
            image,
        });
        self.textures.len() as u32
    }

    pub(crate) fn image(&self, handle: u32) -> Option<ImageId> {
        if handle == 0 {
            return None;
        }
        self.textures.get(handle as usize - 1).map(|t| t.image)
    }
}

impl EngineContext {
    /// Load an image from disk into the texture table. A path loaded before
    /// answers its existing handle; an unreadable or undecodable file
    /// answers the invalid handle.
    pub(crate) fn asset_load_image(&mut self, path: &str) -> u32 {
        if let Some(handle) = self.assets.handle_for(path) {
            return handle;
        }

        info!(path, "loading texture");

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(path, %err, "unable to read texture");
                return 0;
            }
        };

        let Some(image) = self.backend.decode_image(&bytes) else {
            error!(path, "unable to decode texture");
            return 0;
        };

        self.assets.insert(path, image)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::backend::{HeadlessBackend, ImageId};
    use crate::context::EngineContext;

    #[test]
    fn handles_ascend_from_one_and_dedup_by_path() {
        let ctx = EngineContext::new(Box::new(HeadlessBackend::new()));

        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        std::fs::write(&a, [1u8, 2, 3]).unwrap();
        std::fs::write(&b, [4u8, 5, 6]).unwrap();

        let ha = ctx.lock().asset_load_image(a.to_str().unwrap());
        let hb = ctx.lock().asset_load_image(b.to_str().unwrap());
        assert_eq!(ha, 1);
        assert_eq!(hb, 2);

        // Same path again answers the original handle without growing.
        assert_eq!(ctx.lock().asset_load_image(a.to_str().unwrap()), ha);
        assert_eq!(ctx.lock().assets.image(ha), Some(ImageId(1)));
        assert_eq!(ctx.lock().assets.image(hb), Some(ImageId(2)));
    }

    #[test]
    fn unreadable_or_undecodable_files_answer_zero() {
        let ctx = EngineContext::new(Box::new(HeadlessBackend::new()));

        assert_eq!(ctx.lock().asset_load_image("/no/such/file.png"), 0);

        // Empty file reads fine but the backend cannot decode it.
        let mut empty = tempfile::NamedTempFile::new().unwrap();
        empty.flush().unwrap();
        assert_eq!(
            ctx.lock().asset_load_image(empty.path().to_str().unwrap()),
            0
        );
    }

    #[test]
    fn zero_and_unknown_handles_resolve_to_nothing() {
        let ctx = EngineContext::new(Box::new(HeadlessBackend::new()));
        assert_eq!(ctx.lock().assets.image(0), None);
        assert_eq!(ctx.lock().assets.image(99), None);
    }
}
