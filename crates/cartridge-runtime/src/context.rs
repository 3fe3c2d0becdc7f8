//! Shared engine context
//!
//! One [`EngineContext`] lives behind an `Arc<Mutex<..>>` for the lifetime
//! of a session. Every instantiation of the guest module (including each
//! hot reload) gets a store pointing at the same context, so configuration
//! flags, the texture table, and input state survive module swaps.

use std::sync::Arc;

use parking_lot::Mutex;

use cartridge_abi::StackBuffer;

use crate::api::asset::AssetStore;
use crate::api::config::DEFAULT_FLAGS;
use crate::api::input::InputState;
use crate::backend::HostBackend;

pub type SharedContext = Arc<Mutex<EngineContext>>;

/// Store-local data handed to wasmtime. The context is shared across
/// instantiations; the call-stack buffer belongs to this store alone.
pub struct StoreData {
    pub ctx: SharedContext,
    pub stack: StackBuffer,
}

impl StoreData {
    pub fn new(ctx: SharedContext) -> Self {
        Self {
            ctx,
            stack: StackBuffer::new(),
        }
    }
}

/// Engine state reachable from host API calls. The lock around it is taken
/// per call and never held across a guest invocation.
pub struct EngineContext {
    pub(crate) flags: u32,
    pub(crate) exit_requested: bool,
    pub(crate) input: InputState,
    pub(crate) assets: AssetStore,
    pub(crate) backend: Box<dyn HostBackend>,
}

impl EngineContext {
    pub fn new(backend: Box<dyn HostBackend>) -> SharedContext {
        Arc::new(Mutex::new(Self {
            flags: DEFAULT_FLAGS,
            exit_requested: false,
            input: InputState::default(),
            assets: AssetStore::default(),
            backend,
        }))
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Currently declared engine flags.
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Shift this frame's input into last-frame position and sample the
    /// backend for the new frame.
    pub(crate) fn rotate_input(&mut self) {
        let snapshot = self.backend.poll_input();
        self.input.rotate(snapshot);
    }
}
