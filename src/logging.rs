//! File logging and the `logs` command's file operations.
//!
//! All diagnostics go through `tracing`. The subscriber writes plain text to
//! a single log file, which is rotated to `<name>.1` once it grows past
//! [`MAX_LOG_SIZE`]. The terminal is never used for log output: it belongs
//! to the menu.
//!
//! The `logs` command only inspects the file; it never installs the
//! subscriber, so a missing log file stays missing.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use humansize::{BINARY, format_size};

use crate::platform;

/// Rotate the log file once it exceeds this many bytes.
pub const MAX_LOG_SIZE: u64 = 500 * 1024;

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Default log file location.
pub fn default_log_path() -> PathBuf {
    platform::home_dir()
        .map(|home| platform::log_path(&home))
        .unwrap_or_else(|_| PathBuf::from(platform::LOG_FILE_NAME))
}

// ============================================================================
// ROTATION & INIT
// ============================================================================

/// Move `path` to its `.1` backup if it is larger than `max_bytes`.
///
/// Any previous backup is replaced. Returns whether a rotation happened.
pub fn rotate_if_needed(path: &Path, max_bytes: u64) -> io::Result<bool> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if size <= max_bytes {
        return Ok(false);
    }

    let backup = platform::log_backup_path(path);
    match fs::remove_file(&backup) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::rename(path, &backup)?;
    Ok(true)
}

/// Install the global `tracing` subscriber, appending to `path`.
pub fn init(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let rotated = rotate_if_needed(path, MAX_LOG_SIZE)?;

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(io::Error::other)?;

    if rotated {
        tracing::info!(path = %path.display(), "rotated log file");
    }
    Ok(())
}

// ============================================================================
// LOGS COMMAND
// ============================================================================

/// What the log file currently holds.
#[derive(Debug, PartialEq, Eq)]
pub enum LogContents {
    Missing,
    Empty,
    Text(String),
}

/// Read the whole log file.
pub fn read_log(path: &Path) -> io::Result<LogContents> {
    match fs::read_to_string(path) {
        Ok(text) if text.is_empty() => Ok(LogContents::Empty),
        Ok(text) => Ok(LogContents::Text(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LogContents::Missing),
        Err(e) => Err(e),
    }
}

/// Truncate the log file. Returns `false` if there was no file.
pub fn clear_log(path: &Path) -> io::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    OpenOptions::new().write(true).truncate(true).open(path)?;
    Ok(true)
}

/// Size of the log file in bytes, if it exists.
pub fn log_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|m| m.len())
}

/// What the `logs` command was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogsAction {
    Show,
    Clear,
    Path,
}

/// Run one `logs` action against `path` and return the text to print.
pub fn logs_command(path: &Path, action: LogsAction) -> io::Result<String> {
    let text = match action {
        LogsAction::Path => match log_size(path) {
            Some(size) => format!("{} ({})\n", path.display(), format_size(size, BINARY)),
            None => format!("{} (not created yet)\n", path.display()),
        },
        LogsAction::Clear => {
            if clear_log(path)? {
                "Log file cleared.\n".to_string()
            } else {
                "No log file to clear.\n".to_string()
            }
        }
        LogsAction::Show => match read_log(path)? {
            LogContents::Missing => format!("No log file found at {}\n", path.display()),
            LogContents::Empty => "Log file is empty.\n".to_string(),
            LogContents::Text(text) => text,
        },
    };
    Ok(text)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_bytes(path: &Path, n: usize) {
        fs::write(path, vec![b'x'; n]).unwrap();
    }

    #[test]
    fn test_rotate_missing_file_is_noop() {
        let temp = TempDir::new().unwrap();
        assert!(!rotate_if_needed(&temp.path().join("a.log"), 10).unwrap());
    }

    #[test]
    fn test_rotate_small_file_is_noop() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("a.log");
        write_bytes(&log, 10);
        assert!(!rotate_if_needed(&log, 10).unwrap());
        assert!(log.exists());
    }

    #[test]
    fn test_rotate_large_file_moves_to_backup() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("a.log");
        let backup = temp.path().join("a.log.1");
        write_bytes(&backup, 3);
        write_bytes(&log, 11);

        assert!(rotate_if_needed(&log, 10).unwrap());
        assert!(!log.exists());
        assert_eq!(fs::metadata(&backup).unwrap().len(), 11);
    }

    #[test]
    fn test_read_log_states() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("a.log");
        assert_eq!(read_log(&log).unwrap(), LogContents::Missing);

        fs::write(&log, "").unwrap();
        assert_eq!(read_log(&log).unwrap(), LogContents::Empty);

        fs::write(&log, "line\n").unwrap();
        assert_eq!(read_log(&log).unwrap(), LogContents::Text("line\n".into()));
    }

    #[test]
    fn test_clear_log() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("a.log");
        assert!(!clear_log(&log).unwrap());

        fs::write(&log, "old entries\n").unwrap();
        assert!(clear_log(&log).unwrap());
        assert_eq!(log_size(&log), Some(0));
    }

    #[test]
    fn test_logs_command_on_fresh_home() {
        let home = TempDir::new().unwrap();
        let log = platform::log_path(home.path());

        let shown = logs_command(&log, LogsAction::Show).unwrap();
        assert_eq!(shown, format!("No log file found at {}\n", log.display()));
        assert!(logs_command(&log, LogsAction::Path).unwrap().ends_with("(not created yet)\n"));
        assert_eq!(logs_command(&log, LogsAction::Clear).unwrap(), "No log file to clear.\n");
        assert!(!log.exists());
    }

    #[test]
    fn test_logs_command_with_entries() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("a.log");
        fs::write(&log, "first\nsecond\n").unwrap();

        assert_eq!(logs_command(&log, LogsAction::Show).unwrap(), "first\nsecond\n");
        assert!(logs_command(&log, LogsAction::Path).unwrap().ends_with("(13 B)\n"));
        assert_eq!(logs_command(&log, LogsAction::Clear).unwrap(), "Log file cleared.\n");
        assert_eq!(logs_command(&log, LogsAction::Show).unwrap(), "Log file is empty.\n");
    }

    #[test]
    fn test_log_size_missing() {
        let temp = TempDir::new().unwrap();
        assert_eq!(log_size(&temp.path().join("nope.log")), None);
    }
}
