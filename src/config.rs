//! Config file persistence.
//!
//! Loading never fails: a missing file yields defaults, an unreadable or
//! malformed one is logged and also yields defaults. Saving is atomic
//! (write to a sibling temp file, then rename).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::platform;
use crate::types::AppConfig;

/// Default config file location (`~/.claude-notifier/config.json`).
pub fn default_config_path() -> PathBuf {
    platform::home_dir()
        .map(|home| platform::config_path(&home))
        .unwrap_or_else(|_| PathBuf::from(platform::CONFIG_FILE_NAME))
}

/// Load config from `path`, falling back to defaults.
pub fn load_config(path: &Path) -> AppConfig {
    match read_config(path) {
        Ok(Some(config)) => config,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            AppConfig::default()
        }
    }
}

/// Read config from `path`. `Ok(None)` if the file does not exist.
pub fn read_config(path: &Path) -> io::Result<Option<AppConfig>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let config = serde_json::from_str(&contents)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(config))
}

/// Write config to `path` as pretty JSON, creating parent directories.
pub fn save_config(config: &AppConfig, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_string_pretty(config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    json.push('\n');

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    tracing::info!(path = %path.display(), "saved config");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
