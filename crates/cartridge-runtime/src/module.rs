//! Module loading and guest dispatch
//!
//! The loader owns a wasmtime engine plus a linker pre-populated with the
//! host API and a minimal WASI preview1 shim. Each load clones the linker,
//! instantiates the module file into a fresh store pointing at the shared
//! context, and resolves the lifecycle callback table.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, error};
use wasmtime::{Caller, Engine, Extern, Func, Instance, Linker, Memory, Module, Store};

use crate::api;
use crate::context::{SharedContext, StoreData};
use crate::error::{EngineError, EngineResult};

/// Guest lifecycle callbacks. All are optional; a missing callback is a
/// no-op. Both lowercase and capitalized spellings resolve.
pub struct CallbackTable {
    config: Option<Func>,
    setup: Option<Func>,
    update: Option<Func>,
    render: Option<Func>,
    teardown: Option<Func>,
}

impl CallbackTable {
    fn resolve(store: &mut Store<StoreData>, instance: &Instance) -> Self {
        let mut find = |name: &str, alt: &str| {
            instance
                .get_func(&mut *store, name)
                .or_else(|| instance.get_func(&mut *store, alt))
        };
        Self {
            config: find("config", "Config"),
            setup: find("setup", "Setup"),
            update: find("update", "Update"),
            render: find("render", "Render"),
            teardown: find("teardown", "Teardown"),
        }
    }
}

/// Builds instances of the module file on demand. The linker is assembled
/// once and cloned per instantiation, so reloads never re-register the API.
pub struct ModuleLoader {
    engine: Engine,
    linker: Linker<StoreData>,
    ctx: SharedContext,
    path: PathBuf,
}

impl ModuleLoader {
    pub fn new(path: impl Into<PathBuf>, ctx: SharedContext) -> EngineResult<Self> {
        let engine = Engine::default();
        let mut linker = Linker::new(&engine);
        api::register(&engine, &mut linker).map_err(EngineError::Linker)?;
        register_wasi(&mut linker).map_err(EngineError::Linker)?;
        Ok(Self {
            engine,
            linker,
            ctx,
            path: path.into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, compile, and instantiate the module file.
    pub fn load(&self) -> EngineResult<GuestModule> {
        let bytes = fs::read(&self.path).map_err(|source| EngineError::ModuleRead {
            path: self.path.clone(),
            source,
        })?;
        let module = Module::new(&self.engine, &bytes).map_err(EngineError::Compile)?;

        let mut store = Store::new(&self.engine, StoreData::new(self.ctx.clone()));
        let mut linker = self.linker.clone();
        linker
            .define_unknown_imports_as_traps(&module)
            .map_err(EngineError::Linker)?;
        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(EngineError::Instantiate)?;
        let callbacks = CallbackTable::resolve(&mut store, &instance);

        debug!(path = %self.path.display(), "module instantiated");
        Ok(GuestModule {
            store,
            instance,
            callbacks,
        })
    }
}

/// A loaded, instantiated guest module together with its store.
pub struct GuestModule {
    store: Store<StoreData>,
    instance: Instance,
    callbacks: CallbackTable,
}

impl GuestModule {
    pub fn invoke_config(&mut self) {
        self.invoke("config", self.callbacks.config)
    }

    pub fn invoke_setup(&mut self) {
        self.invoke("setup", self.callbacks.setup)
    }

    pub fn invoke_update(&mut self) {
        self.invoke("update", self.callbacks.update)
    }

    pub fn invoke_render(&mut self) {
        self.invoke("render", self.callbacks.render)
    }

    pub fn invoke_teardown(&mut self) {
        self.invoke("teardown", self.callbacks.teardown)
    }

    /// Run one lifecycle callback with a cleared stack buffer. A trap is
    /// logged and absorbed; the host keeps running.
    fn invoke(&mut self, name: &'static str, func: Option<Func>) {
        let Some(func) = func else {
            return;
        };
        self.store.data_mut().stack.clear();
        if let Err(err) = func.call(&mut self.store, &[], &mut []) {
            error!(callback = name, "guest callback failed: {err:#}");
        }
    }

    pub(crate) fn memory(&mut self) -> Option<Memory> {
        self.instance.get_memory(&mut self.store, "memory")
    }

    pub(crate) fn store(&self) -> &Store<StoreData> {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut Store<StoreData> {
        &mut self.store
    }
}

/// Minimal WASI preview1 surface, enough for common guest toolchains to
/// start up and print. Anything not stubbed here is defined as a trap at
/// instantiation.
const WASI: &str = "wasi_snapshot_preview1";
// errno values from the preview1 ABI
const ERRNO_SUCCESS: i32 = 0;
const ERRNO_BADF: i32 = 8;
const ERRNO_FAULT: i32 = 21;

fn register_wasi(linker: &mut Linker<StoreData>) -> wasmtime::Result<()> {
    linker.func_wrap(
        WASI,
        "fd_write",
        move |mut caller: Caller<'_, StoreData>,
              fd: i32,
              iovs: i32,
              iovs_len: i32,
              nwritten: i32|
              -> i32 {
            let Some(Extern::Memory(memory)) = caller.get_export("memory") else {
                return ERRNO_BADF;
            };
            let mut text = Vec::new();
            {
                let data = memory.data(&caller);
                for i in 0..iovs_len as usize {
                    let base = iovs as u32 as usize + i * 8;
                    let Some(entry) = data.get(base..base + 8) else {
                        return ERRNO_FAULT;
                    };
                    let mut word = [0u8; 4];
                    word.copy_from_slice(&entry[0..4]);
                    let ptr = u32::from_le_bytes(word) as usize;
                    word.copy_from_slice(&entry[4..8]);
                    let len = u32::from_le_bytes(word) as usize;
                    let Some(bytes) = data.get(ptr..ptr + len) else {
                        return ERRNO_FAULT;
                    };
                    text.extend_from_slice(bytes);
                }
            }
            let total = text.len() as u32;
            if memory
                .write(&mut caller, nwritten as u32 as usize, &total.to_le_bytes())
                .is_err()
            {
                return ERRNO_FAULT;
            }
            let text = String::from_utf8_lossy(&text);
            debug!(target: "guest", fd, "{}", text.trim_end());
            ERRNO_SUCCESS
        },
    )?;

    linker.func_wrap(
        WASI,
        "clock_time_get",
        move |mut caller: Caller<'_, StoreData>, _id: i32, _precision: i64, out: i32| -> i32 {
            let Some(Extern::Memory(memory)) = caller.get_export("memory") else {
                return ERRNO_BADF;
            };
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default();
            if memory
                .write(&mut caller, out as u32 as usize, &nanos.to_le_bytes())
                .is_err()
            {
                return ERRNO_FAULT;
            }
            ERRNO_SUCCESS
        },
    )?;

    linker.func_wrap(
        WASI,
        "random_get",
        move |mut caller: Caller<'_, StoreData>, buf: i32, len: i32| -> i32 {
            use std::collections::hash_map::RandomState;
            use std::hash::{BuildHasher, Hasher};

            let Some(Extern::Memory(memory)) = caller.get_export("memory") else {
                return ERRNO_BADF;
            };
            let state = RandomState::new();
            let mut offset = buf as u32 as usize;
            let mut remaining = len as usize;
            let mut counter = 0u64;
            while remaining > 0 {
                let mut hasher = state.build_hasher();
                hasher.write_u64(counter);
                counter += 1;
                let chunk = hasher.finish().to_le_bytes();
                let take = remaining.min(chunk.len());
                if memory.write(&mut caller, offset, &chunk[..take]).is_err() {
                    return ERRNO_FAULT;
                }
                offset += take;
                remaining -= take;
            }
            ERRNO_SUCCESS
        },
    )?;

    // No environment and no args: both counts are zero.
    linker.func_wrap(
        WASI,
        "environ_sizes_get",
        move |mut caller: Caller<'_, StoreData>, count: i32, size: i32| -> i32 {
            write_zero_counts(&mut caller, count, size)
        },
    )?;
    linker.func_wrap(
        WASI,
        "environ_get",
        move |_caller: Caller<'_, StoreData>, _environ: i32, _buf: i32| -> i32 { ERRNO_SUCCESS },
    )?;
    linker.func_wrap(
        WASI,
        "args_sizes_get",
        move |mut caller: Caller<'_, StoreData>, count: i32, size: i32| -> i32 {
            write_zero_counts(&mut caller, count, size)
        },
    )?;
    linker.func_wrap(
        WASI,
        "args_get",
        move |_caller: Caller<'_, StoreData>, _args: i32, _buf: i32| -> i32 { ERRNO_SUCCESS },
    )?;

    // Exit requests shut the session down at the next frame boundary; the
    // trap unwinds the current guest call.
    linker.func_wrap(
        WASI,
        "proc_exit",
        move |caller: Caller<'_, StoreData>, code: i32| -> wasmtime::Result<()> {
            caller.data().ctx.lock().platform_exit();
            Err(wasmtime::Error::msg(format!(
                "guest called proc_exit({code})"
            )))
        },
    )?;

    Ok(())
}

fn write_zero_counts(caller: &mut Caller<'_, StoreData>, count: i32, size: i32) -> i32 {
    let Some(Extern::Memory(memory)) = caller.get_export("memory") else {
        return ERRNO_BADF;
    };
    let zero = 0u32.to_le_bytes();
    if memory.write(&mut *caller, count as u32 as usize, &zero).is_err()
        || memory.write(&mut *caller, size as u32 as usize, &zero).is_err()
    {
        return ERRNO_FAULT;
    }
    ERRNO_SUCCESS
}
