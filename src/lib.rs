pub mod config;
pub mod debug;
pub mod util;

pub use config::DebugConfig;
pub use debug::{
    entry_path, ArchiveError, AttrDiff, DebugArchive, DebugHandle, DebugHook, Hook, HookAction,
    HookError, InstanceDiff, InstanceInfo, InstanceState, StepLog,
};
