//! Debug archive: a crash-resilient record of one process run.
//!
//! A session is a single zip file that graph snapshots, raw blobs, step logs
//! and lifecycle snapshots are appended to while the process runs:
//! - every entry is named `debug/<step>-<label>[.<ext>]`, with steps handed
//!   out in lock order and never reused
//! - every append is flushed and synced, so a crash loses only the zip
//!   central directory, not entry bytes
//! - a disabled [`DebugHandle`] accepts every call and does nothing
//!
//! Step logs are numbered when created, not when committed. A log opened
//! early and closed late keeps its early step, so entry order in the archive
//! is not write order.

pub mod archive;
pub mod error;
pub mod hook;
pub mod instance;
pub mod naming;
pub mod runtime;
pub mod step_log;

pub use archive::{DebugArchive, DebugHandle};
pub use error::{ArchiveError, HookError};
pub use hook::{DebugHook, Hook, HookAction};
pub use instance::{AttrDiff, InstanceDiff, InstanceInfo, InstanceState};
pub use naming::entry_path;
pub use step_log::StepLog;
