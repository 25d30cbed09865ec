//! Claude settings hooks: the `setup` command's file work.
//!
//! `settings.json` belongs to Claude, so it is handled as an untyped JSON
//! object: every key other than the two hook events is kept as found.
//! Keys come out sorted (serde_json's default map).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::platform;

/// Hook event fired when Claude waits for input, and the script argument.
pub const NOTIFICATION_EVENT: (&str, &str) = ("Notification", "input_needed");

/// Hook event fired when Claude finishes a task, and the script argument.
pub const STOP_EVENT: (&str, &str) = ("Stop", "task_complete");

// ============================================================================
// LOADING
// ============================================================================

/// Result of reading an existing settings file.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedSettings {
    Missing,
    Parsed(Map<String, Value>),
    /// Present but not a JSON object; it will be replaced.
    Invalid(String),
}

impl LoadedSettings {
    /// The settings to build on: empty unless the file parsed.
    pub fn into_settings(self) -> Map<String, Value> {
        match self {
            LoadedSettings::Parsed(map) => map,
            LoadedSettings::Missing | LoadedSettings::Invalid(_) => Map::new(),
        }
    }
}

/// Read `path`. I/O errors other than a missing file are returned.
pub fn load_settings(path: &Path) -> io::Result<LoadedSettings> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LoadedSettings::Missing),
        Err(e) => return Err(e),
    };
    Ok(match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => LoadedSettings::Parsed(map),
        Ok(_) => LoadedSettings::Invalid("top level is not an object".to_string()),
        Err(e) => LoadedSettings::Invalid(e.to_string()),
    })
}

// ============================================================================
// MERGING (pure)
// ============================================================================

/// Command a hook runs: the script in `claude_dir` plus the event argument.
pub fn hook_command(claude_dir: &Path, argument: &str) -> String {
    format!("{} {}", platform::notify_script_path(claude_dir).display(), argument)
}

fn hook_entry(claude_dir: &Path, argument: &str) -> Value {
    json!([{
        "matcher": "",
        "hooks": [{ "type": "command", "command": hook_command(claude_dir, argument) }]
    }])
}

/// Set the Notification and Stop hooks to run the notify script.
///
/// Both events are replaced outright; other events under `hooks` are kept.
/// A `hooks` value that is not an object is replaced.
pub fn add_notification_hooks(settings: &mut Map<String, Value>, claude_dir: &Path) {
    let hooks = settings
        .entry("hooks")
        .or_insert_with(|| Value::Object(Map::new()));
    if !hooks.is_object() {
        *hooks = Value::Object(Map::new());
    }
    if let Value::Object(hooks) = hooks {
        for (event, argument) in [NOTIFICATION_EVENT, STOP_EVENT] {
            hooks.insert(event.to_string(), hook_entry(claude_dir, argument));
        }
    }
}

/// What a settings file says about the notifier's hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookStatus {
    /// No `hooks` object at all.
    NoHooks,
    /// Some required events are absent.
    Missing(Vec<&'static str>),
    Configured,
}

pub fn hook_status(settings: &Map<String, Value>) -> HookStatus {
    let Some(Value::Object(hooks)) = settings.get("hooks") else {
        return HookStatus::NoHooks;
    };
    let missing: Vec<&'static str> = [NOTIFICATION_EVENT.0, STOP_EVENT.0]
        .into_iter()
        .filter(|event| !hooks.contains_key(*event))
        .collect();
    if missing.is_empty() {
        HookStatus::Configured
    } else {
        HookStatus::Missing(missing)
    }
}

// ============================================================================
// WRITING
// ============================================================================

/// Write settings as pretty JSON (temp file + rename).
pub fn write_settings(settings: &Map<String, Value>, path: &Path) -> io::Result<()> {
    let mut json = serde_json::to_string_pretty(settings)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    json.push('\n');

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Outcome of [`install_hooks`], for the command's output.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupReport {
    pub created_dir: bool,
    pub settings_path: PathBuf,
    /// Parse error of a settings file that had to be replaced.
    pub replaced_invalid: Option<String>,
}

/// Create `claude_dir` if needed and merge the hooks into its settings file.
pub fn install_hooks(claude_dir: &Path) -> io::Result<SetupReport> {
    let created_dir = !claude_dir.exists();
    if created_dir {
        fs::create_dir_all(claude_dir)?;
    }

    let settings_path = platform::claude_settings_path(claude_dir);
    let loaded = load_settings(&settings_path)?;
    let replaced_invalid = match &loaded {
        LoadedSettings::Invalid(reason) => {
            tracing::warn!(path = %settings_path.display(), reason = %reason, "replacing unparseable settings");
            Some(reason.clone())
        }
        _ => None,
    };

    let mut settings = loaded.into_settings();
    add_notification_hooks(&mut settings, claude_dir);
    write_settings(&settings, &settings_path)?;
    tracing::info!(path = %settings_path.display(), "installed notification hooks");

    Ok(SetupReport {
        created_dir,
        settings_path,
        replaced_invalid,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_json(path: &Path) -> Map<String, Value> {
        match serde_json::from_str::<Value>(&fs::read_to_string(path).unwrap()).unwrap() {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    fn test_hook_command_points_at_script() {
        assert_eq!(
            hook_command(Path::new("/Users/test/.claude"), "input_needed"),
            "/Users/test/.claude/notify.sh input_needed"
        );
    }

    #[test]
    fn test_add_hooks_to_empty_settings() {
        let mut settings = Map::new();
        add_notification_hooks(&mut settings, Path::new("/c"));

        assert_eq!(
            settings["hooks"]["Notification"],
            json!([{ "matcher": "", "hooks": [{ "type": "command", "command": "/c/notify.sh input_needed" }] }])
        );
        assert_eq!(
            settings["hooks"]["Stop"][0]["hooks"][0]["command"],
            "/c/notify.sh task_complete"
        );
        assert_eq!(hook_status(&settings), HookStatus::Configured);
    }

    #[test]
    fn test_add_hooks_keeps_other_keys_and_events() {
        let mut settings = match json!({
            "model": "opus",
            "hooks": {
                "PreToolUse": [{ "matcher": "Bash", "hooks": [] }],
                "Stop": [{ "matcher": "", "hooks": [{ "type": "command", "command": "old" }] }]
            }
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        add_notification_hooks(&mut settings, Path::new("/c"));

        assert_eq!(settings["model"], "opus");
        assert_eq!(settings["hooks"]["PreToolUse"][0]["matcher"], "Bash");
        assert_eq!(settings["hooks"]["Stop"].as_array().unwrap().len(), 1);
        assert_eq!(
            settings["hooks"]["Stop"][0]["hooks"][0]["command"],
            "/c/notify.sh task_complete"
        );
    }

    #[test]
    fn test_non_object_hooks_is_replaced() {
        let mut settings = Map::new();
        settings.insert("hooks".into(), json!("broken"));
        add_notification_hooks(&mut settings, Path::new("/c"));
        assert_eq!(hook_status(&settings), HookStatus::Configured);
    }

    #[test]
    fn test_hook_status() {
        let mut settings = Map::new();
        assert_eq!(hook_status(&settings), HookStatus::NoHooks);

        settings.insert("hooks".into(), json!({ "Stop": [] }));
        assert_eq!(hook_status(&settings), HookStatus::Missing(vec!["Notification"]));

        settings.insert("hooks".into(), json!({}));
        assert_eq!(
            hook_status(&settings),
            HookStatus::Missing(vec!["Notification", "Stop"])
        );
    }

    #[test]
    fn test_load_settings_states() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        assert_eq!(load_settings(&path).unwrap(), LoadedSettings::Missing);

        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(load_settings(&path).unwrap(), LoadedSettings::Invalid(_)));

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_settings(&path).unwrap(), LoadedSettings::Invalid(_)));

        fs::write(&path, r#"{"model": "opus"}"#).unwrap();
        let LoadedSettings::Parsed(map) = load_settings(&path).unwrap() else {
            panic!("expected parsed settings");
        };
        assert_eq!(map["model"], "opus");
    }

    #[test]
    fn test_install_hooks_creates_dir_and_file() {
        let temp = TempDir::new().unwrap();
        let claude = temp.path().join(".claude");

        let report = install_hooks(&claude).unwrap();

        assert!(report.created_dir);
        assert_eq!(report.replaced_invalid, None);
        assert_eq!(report.settings_path, claude.join("settings.json"));
        assert_eq!(hook_status(&read_json(&report.settings_path)), HookStatus::Configured);
        assert!(!claude.join("settings.json.tmp").exists());
    }

    #[test]
    fn test_install_hooks_merges_existing_settings() {
        let temp = TempDir::new().unwrap();
        let settings_path = temp.path().join("settings.json");
        fs::write(&settings_path, r#"{"theme": "dark", "hooks": {"PreToolUse": []}}"#).unwrap();

        let report = install_hooks(temp.path()).unwrap();
        let settings = read_json(&settings_path);

        assert!(!report.created_dir);
        assert_eq!(settings["theme"], "dark");
        assert!(settings["hooks"]["PreToolUse"].is_array());
        assert_eq!(hook_status(&settings), HookStatus::Configured);
    }

    #[test]
    fn test_install_hooks_replaces_invalid_settings() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("settings.json"), "{ oops").unwrap();

        let report = install_hooks(temp.path()).unwrap();

        assert!(report.replaced_invalid.is_some());
        assert_eq!(hook_status(&read_json(&report.settings_path)), HookStatus::Configured);
    }

    #[test]
    fn test_install_hooks_is_idempotent() {
        let temp = TempDir::new().unwrap();
        install_hooks(temp.path()).unwrap();
        let first = fs::read_to_string(temp.path().join("settings.json")).unwrap();
        install_hooks(temp.path()).unwrap();
        let second = fs::read_to_string(temp.path().join("settings.json")).unwrap();
        assert_eq!(first, second);
    }
}
