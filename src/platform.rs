//! Platform-specific locations and helpers.
//!
//! Encodes assumptions about where files live as named constants.
//!
//! Structure:
//! - Constants: known path components (documented invariants)
//! - Types: location resolution errors
//! - Pure functions: path construction
//! - Effect functions: home lookup, sound playback
//! - SoundPlayer: preview playback that reaps finished players

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

// ============================================================================
// CONSTANTS (Documented Invariants)
// ============================================================================

/// Application directory, relative to home. Holds the config file.
pub const APP_DIR_REL: &str = ".claude-notifier";

/// Config file name within [`APP_DIR_REL`].
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Log directory, relative to home (macOS user log location).
pub const LOG_DIR_REL: &str = "Library/Logs/ClaudeNotifier";

/// Log file name within [`LOG_DIR_REL`].
pub const LOG_FILE_NAME: &str = "claude-notifier.log";

/// Claude's own configuration directory, relative to home.
pub const CLAUDE_DIR_REL: &str = ".claude";

/// Claude settings file within the Claude directory. Holds the hooks.
pub const CLAUDE_SETTINGS_FILE_NAME: &str = "settings.json";

/// Hook script the notification hooks run, within the Claude directory.
pub const NOTIFY_SCRIPT_NAME: &str = "notify.sh";

/// Directory the CLI is linked into, relative to home. Expected on `PATH`.
pub const LOCAL_BIN_REL: &str = ".local/bin";

/// Directory holding the named macOS system sounds.
pub const SYSTEM_SOUNDS_DIR: &str = "/System/Library/Sounds";

/// Extension of the files in [`SYSTEM_SOUNDS_DIR`].
pub const SYSTEM_SOUND_EXT: &str = "aiff";

/// Command-line audio player shipped with macOS.
pub const SOUND_PLAYER: &str = "afplay";

// ============================================================================
// TYPES
// ============================================================================

/// Error resolving a per-user location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// Could not determine home directory.
    HomeNotFound,
}

impl std::fmt::Display for LocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationError::HomeNotFound => write!(f, "Could not determine home directory"),
        }
    }
}

impl std::error::Error for LocationError {}

// ============================================================================
// PURE FUNCTIONS (Path Construction)
// ============================================================================

/// Application directory for a given home.
pub fn app_dir(home: &Path) -> PathBuf {
    home.join(APP_DIR_REL)
}

/// Config file path for a given home.
pub fn config_path(home: &Path) -> PathBuf {
    app_dir(home).join(CONFIG_FILE_NAME)
}

/// Default Claude directory for a given home.
pub fn claude_dir(home: &Path) -> PathBuf {
    home.join(CLAUDE_DIR_REL)
}

/// Claude settings file inside `claude_dir`.
pub fn claude_settings_path(claude_dir: &Path) -> PathBuf {
    claude_dir.join(CLAUDE_SETTINGS_FILE_NAME)
}

/// Hook script inside `claude_dir`.
pub fn notify_script_path(claude_dir: &Path) -> PathBuf {
    claude_dir.join(NOTIFY_SCRIPT_NAME)
}

/// `~/.local/bin` for a given home.
pub fn local_bin_dir(home: &Path) -> PathBuf {
    home.join(LOCAL_BIN_REL)
}

/// Expand a leading `~` in user input against `home`.
pub fn expand_tilde(input: &str, home: &Path) -> PathBuf {
    match input.strip_prefix('~') {
        Some("") => home.to_path_buf(),
        Some(rest) if rest.starts_with('/') => home.join(rest.trim_start_matches('/')),
        _ => PathBuf::from(input),
    }
}

/// Log file path for a given home.
pub fn log_path(home: &Path) -> PathBuf {
    home.join(LOG_DIR_REL).join(LOG_FILE_NAME)
}

/// Path of the rotated log backup next to `log`.
pub fn log_backup_path(log: &Path) -> PathBuf {
    let mut name = log.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".1");
    log.with_file_name(name)
}

/// Sound file for a named system sound.
///
/// `None` for the special settings that have no file of their own.
pub fn system_sound_path(sound: &str) -> Option<PathBuf> {
    match sound {
        crate::types::SOUND_DEFAULT | crate::types::SOUND_NONE | "" => None,
        name => Some(Path::new(SYSTEM_SOUNDS_DIR).join(format!("{}.{}", name, SYSTEM_SOUND_EXT))),
    }
}

// ============================================================================
// EFFECT FUNCTIONS
// ============================================================================

/// Current user's home directory.
pub fn home_dir() -> Result<PathBuf, LocationError> {
    dirs::home_dir().ok_or(LocationError::HomeNotFound)
}

/// Start playing a system sound without waiting for it to finish.
///
/// Returns `None` when there is nothing to play or the file is missing
/// (e.g. not on macOS).
pub fn play_system_sound(sound: &str) -> Option<Child> {
    let path = system_sound_path(sound)?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "sound file not found");
        return None;
    }

    match Command::new(SOUND_PLAYER)
        .arg(&path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => Some(child),
        Err(e) => {
            tracing::warn!(error = %e, sound, "could not start sound player");
            None
        }
    }
}

// ============================================================================
// SOUND PLAYER
// ============================================================================

/// Plays sound previews and reaps the player processes once they finish.
///
/// Previews are fire-and-forget; a player still running when this value is
/// dropped is left to finish on its own.
#[derive(Debug, Default)]
pub struct SoundPlayer {
    playing: Vec<Child>,
}

impl SoundPlayer {
    pub fn new() -> Self {
        SoundPlayer::default()
    }

    /// Start playing `sound`, first collecting any finished previews.
    pub fn play(&mut self, sound: &str) {
        self.reap();
        if let Some(child) = play_system_sound(sound) {
            self.track(child);
        }
    }

    pub(crate) fn track(&mut self, child: Child) {
        self.playing.push(child);
    }

    /// Collect exited players. Returns how many are still running.
    pub fn reap(&mut self) -> usize {
        self.playing.retain_mut(|child| match child.try_wait() {
            Ok(Some(_)) => false,
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(error = %e, pid = child.id(), "could not check sound player");
                false
            }
        });
        self.playing.len()
    }
}

impl Drop for SoundPlayer {
    fn drop(&mut self) {
        let running = self.reap();
        if running > 0 {
            tracing::debug!(running, "sound previews still playing");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
