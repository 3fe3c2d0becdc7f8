//! Config namespace
//!
//! The guest declares engine behavior once, from its `config` callback,
//! before `setup` runs. Flags set after that point still land in the
//! context but the session has already acted on them.

use tracing::debug;

use crate::context::EngineContext;

/// Reload the module when its file changes on disk.
pub const ENGINE_HOT_RELOAD: u32 = 1 << 0;
/// Run the guest's `setup` again after a reload instead of migrating the
/// old instance's linear memory.
pub const ENGINE_SETUP_AFTER_RELOAD: u32 = 1 << 1;
/// Emit engine-internal log messages.
pub const ENGINE_LOGGING: u32 = 1 << 2;

/// Flags in effect when the guest never calls `ConfigSetFlags`.
pub const DEFAULT_FLAGS: u32 = ENGINE_HOT_RELOAD | ENGINE_LOGGING;

impl EngineContext {
    pub(crate) fn config_set_flags(&mut self, flags: u32) {
        debug!(flags, "config flags set");
        self.flags = flags;
    }

    pub(crate) fn config_flags(&self) -> u32 {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    #[test]
    fn flags_default_until_set() {
        let ctx = EngineContext::new(Box::new(HeadlessBackend::new()));
        assert_eq!(ctx.lock().config_flags(), DEFAULT_FLAGS);

        ctx.lock().config_set_flags(ENGINE_SETUP_AFTER_RELOAD);
        assert_eq!(ctx.lock().config_flags(), ENGINE_SETUP_AFTER_RELOAD);
    }
}
