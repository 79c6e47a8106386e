//! Settings file paths and the write-side primitives: atomic writes,
//! timestamped backups, and the 4-space pretty serializer.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

/// Filename of the user's settings file.
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Filename of the built-in defaults document shipped beside the
/// executable.
pub const DEFAULTS_FILENAME: &str = "defaults.json";

/// Filename of the sidecar state file.
pub const STATE_FILENAME: &str = "state.json";

/// The per-user settings directory.
pub fn settings_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("oxterm")
        } else {
            PathBuf::from(".")
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".config").join("oxterm")
        } else {
            PathBuf::from(".")
        }
    }
}

/// Full path of the user's settings file.
pub fn settings_path() -> PathBuf {
    settings_dir().join(SETTINGS_FILENAME)
}

/// Full path of the sidecar state file, under the per-user data directory.
pub fn state_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(data_dir) = dirs::data_local_dir() {
            data_dir.join("oxterm").join(STATE_FILENAME)
        } else {
            PathBuf::from(STATE_FILENAME)
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Some(home_dir) = dirs::home_dir() {
            home_dir
                .join(".local")
                .join("share")
                .join("oxterm")
                .join(STATE_FILENAME)
        } else {
            PathBuf::from(STATE_FILENAME)
        }
    }
}

/// Path of the `defaults.json` shipped beside the executable, when the
/// executable location is known.
pub fn default_settings_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.with_file_name(DEFAULTS_FILENAME))
}

/// Expands a leading `~/` to the user's home directory.
pub(crate) fn expand_home_dir(path: &str) -> String {
    if let Some(suffix) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(suffix).to_string_lossy().to_string();
    }
    path.to_string()
}

/// Atomic write: the content lands in a temp file that is renamed over the
/// target, so concurrent readers always observe a complete file. Creates
/// the parent directory on demand.
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, contents)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// Copies the current settings file to a timestamped `.backup` sibling
/// before it is overwritten. A backup failure is logged, never fatal.
pub fn backup_settings_file(path: &Path) {
    if !path.exists() {
        return;
    }
    let timestamp = chrono::Local::now().format("%Y-%m-%dT%H-%M-%S");
    let backup_path = PathBuf::from(format!("{}.{timestamp}.backup", path.display()));
    if let Err(e) = std::fs::copy(path, &backup_path) {
        log::warn!("failed to back up settings file to {backup_path:?}: {e}");
    }
}

/// Serializes a value with stable key ordering and 4-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .context("failed to serialize settings")?;
    String::from_utf8(buffer).context("serialized settings were not valid UTF-8")
}
