//! Entry and session naming for the debug archive

use chrono::{DateTime, TimeZone};

/// Directory inside the archive that holds every entry.
pub const ENTRY_NAMESPACE: &str = "debug";
/// Extension for rendered graph snapshots.
pub const GRAPH_EXTENSION: &str = "dot";
/// Extension for committed step logs.
pub const STEP_LOG_EXTENSION: &str = "log";

const SESSION_PREFIX: &str = "debug";

/// Path of an entry inside the archive: `debug/<step>-<label>[.<ext>]`.
pub fn entry_path(step: u64, label: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{ENTRY_NAMESPACE}/{step}-{label}.{ext}"),
        None => format!("{ENTRY_NAMESPACE}/{step}-{label}"),
    }
}

/// File name of a session archive, e.g. `debug-2024-03-01-14-05-09.123456789`.
///
/// Sortable and unique at sub-second resolution only. Two sessions started
/// within the same clock tick collide; the archive open then fails.
pub fn session_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{SESSION_PREFIX}-{}", at.format("%Y-%m-%d-%H-%M-%S%.f"))
}
