//! Runtime session
//!
//! Ties the pieces together: load the module, run `config`, act on the
//! declared flags, run `setup`, then drive frames until the guest asks to
//! exit. Only construction can fail; a running session absorbs guest traps
//! and reload failures.

use std::path::PathBuf;

use tracing::warn;

use crate::api::{ENGINE_HOT_RELOAD, ENGINE_SETUP_AFTER_RELOAD};
use crate::backend::HostBackend;
use crate::context::{EngineContext, SharedContext};
use crate::error::EngineResult;
use crate::module::{GuestModule, ModuleLoader};
use crate::reload::{HotReloadManager, ReloadState};

pub struct Session {
    ctx: SharedContext,
    loader: ModuleLoader,
    module: GuestModule,
    reload: HotReloadManager,
    needs_setup: bool,
    shut_down: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("needs_setup", &self.needs_setup)
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(path: impl Into<PathBuf>, backend: Box<dyn HostBackend>) -> EngineResult<Self> {
        let ctx = EngineContext::new(backend);
        let loader = ModuleLoader::new(path, ctx.clone())?;
        let mut module = loader.load()?;

        // Config runs exactly once per session, never again on reload.
        module.invoke_config();

        let mut reload = HotReloadManager::new();
        let flags = ctx.lock().config_flags();
        if flags & ENGINE_HOT_RELOAD != 0 {
            if let Err(err) = reload.watch(loader.path()) {
                warn!("unable to watch module, hot reload disabled: {err}");
            }
        }

        module.invoke_setup();

        Ok(Self {
            ctx,
            loader,
            module,
            reload,
            needs_setup: false,
            shut_down: false,
        })
    }

    /// Drive one frame: exit check, reload poll, deferred setup, input
    /// rotation, then the guest's update and render callbacks. Returns
    /// `false` once the guest has requested exit.
    pub fn frame(&mut self) -> bool {
        if self.ctx.lock().exit_requested() {
            return false;
        }

        let setup_after_reload = self.ctx.lock().config_flags() & ENGINE_SETUP_AFTER_RELOAD != 0;
        if self
            .reload
            .poll(&self.loader, &mut self.module, !setup_after_reload)
        {
            self.needs_setup = setup_after_reload;
        }

        if self.needs_setup {
            self.module.invoke_setup();
            self.needs_setup = false;
        }

        self.ctx.lock().rotate_input();
        self.module.invoke_update();
        self.module.invoke_render();
        true
    }

    /// Trigger a reload as if the module file had changed on disk.
    pub fn request_reload(&mut self) {
        self.reload.request_reload();
    }

    pub fn reload_state(&self) -> &ReloadState {
        self.reload.state()
    }

    pub fn context(&self) -> &SharedContext {
        &self.ctx
    }

    /// Run the guest's teardown when the session ends. Latched: repeated
    /// calls are no-ops.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.module.invoke_teardown();
    }
}
