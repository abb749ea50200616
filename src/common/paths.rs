//! Configuration and workspace paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/autotest/` and `~/.local/share/autotest/`
//! - macOS: `~/Library/Application Support/autotest/`
//! - Windows: `%APPDATA%\autotest\`

use std::path::PathBuf;

/// Name used for the project directories
const APP_NAME: &str = "autotest";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Default workspace directory for the file store
pub fn default_workspace_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join("workspace"))
        .unwrap_or_else(|| PathBuf::from(".autotest"))
}

/// Encode an identifier as a file stem
///
/// ASCII letters, digits and `-` are kept. Every other byte, `_` included,
/// becomes `_XX` with its hex value, so distinct ids never share a stem.
pub fn file_stem_for(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("_{byte:02X}"));
        }
    }
    stem
}
