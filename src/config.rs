//! Debug archive configuration
//!
//! Debugging is off unless enabled through the environment or a `[debug]`
//! table in a TOML config file:
//!
//! ```toml
//! [debug]
//! enabled = true
//! dir = "/tmp/walk-debug"
//! ```

use std::path::PathBuf;

use serde::Deserialize;

/// Enables debugging when set to anything but empty, `0`, `false` or `off`.
pub const ENV_DEBUG: &str = "DEBUG_ARCHIVE";
/// Overrides the directory archives are written to.
pub const ENV_DEBUG_DIR: &str = "DEBUG_ARCHIVE_DIR";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DebugConfig {
    /// Whether a debug archive is written at all
    pub enabled: bool,
    /// Directory for archives (None = `~/.debug-archive/debug`)
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    debug: DebugConfig,
}

impl DebugConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup(ENV_DEBUG).is_some_and(|raw| is_enabled_value(&raw));
        let dir = lookup(ENV_DEBUG_DIR)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);
        Self { enabled, dir }
    }

    /// Read the `[debug]` table of a TOML document; a missing table means defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let parsed: TomlConfig = toml::from_str(contents)?;
        Ok(parsed.debug)
    }

    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(crate::util::paths::debug_dir)
    }
}

fn is_enabled_value(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "off"
    )
}
