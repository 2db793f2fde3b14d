use std::sync::OnceLock;

use anyhow::Context;
use parking_lot::Mutex;

use crate::config::DebugConfig;
use crate::debug::archive::DebugHandle;
use crate::debug::error::ArchiveError;

fn handle_cell() -> &'static Mutex<DebugHandle> {
    static CELL: OnceLock<Mutex<DebugHandle>> = OnceLock::new();
    CELL.get_or_init(|| Mutex::new(DebugHandle::disabled()))
}

/// The process-wide debug session; disabled until [`init`] enables it.
pub fn handle() -> DebugHandle {
    handle_cell().lock().clone()
}

/// Replace the process-wide handle, returning the previous one.
pub fn set_handle(handle: DebugHandle) -> DebugHandle {
    std::mem::replace(&mut *handle_cell().lock(), handle)
}

pub fn is_enabled() -> bool {
    handle_cell().lock().is_enabled()
}

/// Start a session from `config` and install it process-wide.
///
/// When debugging is disabled nothing is created and the installed handle is
/// left as it was.
pub fn init(config: &DebugConfig) -> Result<DebugHandle, ArchiveError> {
    if !config.enabled {
        return Ok(DebugHandle::disabled());
    }

    let handle = DebugHandle::create(&config.resolved_dir())?;
    let previous = set_handle(handle.clone());
    if let Err(e) = previous.close() {
        tracing::warn!(error = %e, "Failed to close previous debug archive");
    }
    Ok(handle)
}

/// [`init`] with configuration read from the environment.
pub fn init_from_env() -> anyhow::Result<DebugHandle> {
    let config = DebugConfig::from_env();
    init(&config).with_context(|| {
        format!(
            "failed to create debug archive in {}",
            config.resolved_dir().display()
        )
    })
}

/// Close the process-wide session and disable it.
pub fn shutdown() -> Result<(), ArchiveError> {
    set_handle(DebugHandle::disabled()).close()
}
