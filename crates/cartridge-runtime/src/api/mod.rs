//! Host API surface
//!
//! Five namespaces (Config, Platform, Input, Graphics, Asset) exposed to the
//! guest under the `env` import module. The wrapper table and record types
//! in `gen.rs` are produced by `cartridge-gen` from `api/schema.json`; the
//! hand-written modules here hold the semantics the wrappers call into.

pub(crate) mod asset;
pub(crate) mod config;
mod gen;
pub(crate) mod graphics;
pub(crate) mod input;
pub(crate) mod platform;
pub(crate) mod support;

pub use config::{DEFAULT_FLAGS, ENGINE_HOT_RELOAD, ENGINE_LOGGING, ENGINE_SETUP_AFTER_RELOAD};
pub use gen::{register, Color};
