//! Runtime error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the host runtime. Only initial load errors are fatal
/// to a session; reload and guest-call failures are logged and absorbed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unable to read module {path}: {source}")]
    ModuleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to compile module: {0}")]
    Compile(#[source] wasmtime::Error),

    #[error("unable to install host API: {0}")]
    Linker(#[source] wasmtime::Error),

    #[error("unable to instantiate module: {0}")]
    Instantiate(#[source] wasmtime::Error),

    #[error("unable to migrate linear memory: {0}")]
    MemoryMigration(String),

    #[error("unable to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Convenience alias used across the runtime crate.
pub type EngineResult<T> = Result<T, EngineError>;
