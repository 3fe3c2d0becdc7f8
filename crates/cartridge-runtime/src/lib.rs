//! Cartridge runtime
//!
//! Hosts a single WASM game module and drives it through a fixed lifecycle
//! (`config`, `setup`, per-frame `update`/`render`, `teardown`). The guest
//! reaches back into the host through a generated wrapper table: every call
//! marshals its arguments as 64-bit lanes in a shared flat-stack buffer.
//! When the module file changes on disk the session swaps in a fresh
//! instance, optionally carrying the old instance's linear memory across.
//!
//! Platform concerns (window, renderer, input, image decoding) live behind
//! the [`backend::HostBackend`] trait; the crate ships a recording
//! [`backend::HeadlessBackend`] for tests and embedders supply the real one.

pub mod api;
pub mod backend;
pub mod context;
pub mod error;
pub mod module;
pub mod reload;
pub mod session;

pub use api::{
    register, Color, DEFAULT_FLAGS, ENGINE_HOT_RELOAD, ENGINE_LOGGING, ENGINE_SETUP_AFTER_RELOAD,
};
pub use backend::{BackendCall, HeadlessBackend, HostBackend, ImageId, InputSnapshot, EVENT_SLOTS};
pub use context::{EngineContext, SharedContext, StoreData};
pub use error::{EngineError, EngineResult};
pub use module::{CallbackTable, GuestModule, ModuleLoader};
pub use reload::{HotReloadManager, ReloadState};
pub use session::Session;
