//! Hot reload
//!
//! A notify watcher thread forwards write/create events for the module file
//! over a channel; the frame-loop thread polls the channel and performs the
//! swap itself, so no instance is ever mutated off-thread. A failed reload
//! leaves the previous instance authoritative and is never fatal.

use std::path::Path;

use crossbeam_channel::{unbounded, Receiver};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::module::{GuestModule, ModuleLoader};

const WASM_PAGE: u64 = 65536;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadState {
    Idle,
    ReloadPending,
    Reloading,
    Failed(String),
}

pub struct HotReloadManager {
    rx: Option<Receiver<()>>,
    _watcher: Option<RecommendedWatcher>,
    pending: bool,
    state: ReloadState,
}

impl HotReloadManager {
    pub fn new() -> Self {
        Self {
            rx: None,
            _watcher: None,
            pending: false,
            state: ReloadState::Idle,
        }
    }

    /// Start watching the module file. Events only mark a reload as
    /// pending; the swap happens inside [`poll`](Self::poll).
    pub fn watch(&mut self, path: &Path) -> EngineResult<()> {
        let (tx, rx) = unbounded();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
                Ok(event) if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
                    let _ = tx.send(());
                }
                Ok(_) => {}
                Err(err) => warn!("watch error: {err}"),
            })
            .map_err(|source| EngineError::Watch {
                path: path.to_path_buf(),
                source,
            })?;
        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|source| EngineError::Watch {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "watching module for changes");
        self._watcher = Some(watcher);
        self.rx = Some(rx);
        Ok(())
    }

    /// Mark a reload as pending without a filesystem event.
    pub fn request_reload(&mut self) {
        self.pending = true;
    }

    pub fn state(&self) -> &ReloadState {
        &self.state
    }

    /// Perform a pending reload, if any. With `migrate` the old instance's
    /// linear memory is carried into the new one and the old teardown is
    /// skipped; without it the old instance tears down and the new one
    /// starts cold. Returns whether a swap happened.
    pub fn poll(&mut self, loader: &ModuleLoader, current: &mut GuestModule, migrate: bool) -> bool {
        if !self.take_pending() {
            return false;
        }
        self.state = ReloadState::Reloading;
        info!(path = %loader.path().display(), migrate, "reloading module");

        match self.perform(loader, current, migrate) {
            Ok(fresh) => {
                *current = fresh;
                self.state = ReloadState::Idle;
                info!("module reloaded");
                true
            }
            Err(err) => {
                warn!("reload failed, keeping previous instance: {err}");
                self.state = ReloadState::Failed(err.to_string());
                false
            }
        }
    }

    /// Coalesce any number of queued watcher events plus manual requests
    /// into one pending reload.
    fn take_pending(&mut self) -> bool {
        let mut pending = std::mem::take(&mut self.pending);
        if let Some(rx) = &self.rx {
            while rx.try_recv().is_ok() {
                pending = true;
            }
        }
        if pending {
            self.state = ReloadState::ReloadPending;
        }
        pending
    }

    fn perform(
        &mut self,
        loader: &ModuleLoader,
        current: &mut GuestModule,
        migrate: bool,
    ) -> EngineResult<GuestModule> {
        // Instantiate first: if the new file is broken, the old instance
        // stays untouched.
        let mut fresh = loader.load()?;
        if migrate {
            migrate_memory(current, &mut fresh)?;
        } else {
            current.invoke_teardown();
        }
        Ok(fresh)
    }
}

impl Default for HotReloadManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy the whole of the old instance's linear memory into the new one,
/// growing it in whole pages first when it starts smaller.
fn migrate_memory(old: &mut GuestModule, fresh: &mut GuestModule) -> EngineResult<()> {
    let Some(old_mem) = old.memory() else {
        return Err(EngineError::MemoryMigration(
            "previous instance exports no memory".to_string(),
        ));
    };
    let Some(new_mem) = fresh.memory() else {
        return Err(EngineError::MemoryMigration(
            "new instance exports no memory".to_string(),
        ));
    };

    let bytes = old_mem.data(old.store()).to_vec();
    let have = new_mem.data_size(fresh.store());
    if have < bytes.len() {
        let missing = (bytes.len() - have) as u64;
        new_mem
            .grow(fresh.store_mut(), missing.div_ceil(WASM_PAGE))
            .map_err(|err| {
                EngineError::MemoryMigration(format!("unable to grow new memory: {err}"))
            })?;
    }
    new_mem.data_mut(fresh.store_mut())[..bytes.len()].copy_from_slice(&bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_with_nothing_pending() {
        let mut manager = HotReloadManager::new();
        assert_eq!(*manager.state(), ReloadState::Idle);
        assert!(!manager.take_pending());
    }

    #[test]
    fn manual_request_marks_one_pending_reload() {
        let mut manager = HotReloadManager::new();
        manager.request_reload();
        manager.request_reload();

        assert!(manager.take_pending());
        assert_eq!(*manager.state(), ReloadState::ReloadPending);
        // Coalesced: a second take finds nothing.
        assert!(!manager.take_pending());
    }
}
