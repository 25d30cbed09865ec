//! `doctor` diagnostics: file and environment checks.
//!
//! Every check is a pure function of paths and values handed in, so the
//! report can be built against a temp home in tests. Notification and
//! automation permission checks need the notifier app and stay outside.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::config;
use crate::hooks::{self, HookStatus, LoadedSettings};
use crate::platform;
use crate::types::{AppConfig, IconVariant, sound_display_name};

const SETUP_HINT: &str = "Run 'claude-notifier setup'";

/// One diagnostic line, with remediation steps when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub passed: bool,
    pub message: String,
    pub remediation: Vec<String>,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        CheckResult {
            passed: true,
            message: message.into(),
            remediation: Vec::new(),
        }
    }

    fn fail(message: impl Into<String>, remediation: &[&str]) -> Self {
        CheckResult {
            passed: false,
            message: message.into(),
            remediation: remediation.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Where the checks look.
#[derive(Debug, Clone)]
pub struct DoctorContext {
    pub home: PathBuf,
    pub claude_dir: PathBuf,
    pub config_path: PathBuf,
    /// Value of `PATH`, if set.
    pub path_env: Option<String>,
}

impl DoctorContext {
    /// Default locations under `home`.
    pub fn for_home(home: &Path, path_env: Option<String>) -> Self {
        DoctorContext {
            home: home.to_path_buf(),
            claude_dir: platform::claude_dir(home),
            config_path: platform::config_path(home),
            path_env,
        }
    }
}

// ============================================================================
// CHECKS
// ============================================================================

/// The hook script exists and is executable.
pub fn check_notify_script(claude_dir: &Path) -> CheckResult {
    let script = platform::notify_script_path(claude_dir);
    let Ok(meta) = std::fs::metadata(&script) else {
        return CheckResult::fail(
            format!("{} not found", platform::NOTIFY_SCRIPT_NAME),
            &["Install the notifier app, which ships the hook script"],
        );
    };
    if !meta.is_file() || meta.permissions().mode() & 0o111 == 0 {
        return CheckResult::fail(
            format!("{} is not executable", platform::NOTIFY_SCRIPT_NAME),
            &[&format!("Run 'chmod +x {}'", script.display())],
        );
    }
    CheckResult::pass(format!("{}: installed and executable", platform::NOTIFY_SCRIPT_NAME))
}

/// Claude's settings file has both notification hooks.
pub fn check_settings_hooks(claude_dir: &Path) -> CheckResult {
    let path = platform::claude_settings_path(claude_dir);
    let settings = match hooks::load_settings(&path) {
        Ok(LoadedSettings::Parsed(settings)) => settings,
        Ok(LoadedSettings::Missing) => {
            return CheckResult::fail(
                format!("{} not found", platform::CLAUDE_SETTINGS_FILE_NAME),
                &[&format!("{} to create configuration", SETUP_HINT)],
            );
        }
        Ok(LoadedSettings::Invalid(_)) | Err(_) => {
            return CheckResult::fail(
                format!("Failed to parse {}", platform::CLAUDE_SETTINGS_FILE_NAME),
                &[&format!("{} to recreate configuration", SETUP_HINT)],
            );
        }
    };

    match hooks::hook_status(&settings) {
        HookStatus::Configured => CheckResult::pass("Hooks: configured"),
        HookStatus::NoHooks => CheckResult::fail(
            format!("No hooks configured in {}", platform::CLAUDE_SETTINGS_FILE_NAME),
            &[&format!("{} to add hooks", SETUP_HINT)],
        ),
        HookStatus::Missing(events) => CheckResult::fail(
            format!("Missing hooks: {}", events.join(", ")),
            &[&format!("{} to add missing hooks", SETUP_HINT)],
        ),
    }
}

/// The notifier's own config file is absent (defaults) or valid.
pub fn check_config(config_path: &Path) -> CheckResult {
    match config::read_config(config_path) {
        Ok(Some(_)) => CheckResult::pass(format!("Config: {}", config_path.display())),
        Ok(None) => CheckResult::pass("Config: defaults (no config file)"),
        Err(e) => CheckResult::fail(
            format!("Config file unreadable ({})", e),
            &["Run 'claude-notifier config' to write a fresh one"],
        ),
    }
}

/// `~/.local/bin` is on `PATH`.
pub fn check_path(path_env: Option<&str>, home: &Path) -> CheckResult {
    let Some(path) = path_env else {
        return CheckResult::pass("PATH: could not determine");
    };
    let bin = platform::local_bin_dir(home);
    if std::env::split_paths(path).any(|dir| dir == bin) {
        CheckResult::pass(format!("PATH: ~/{} included", platform::LOCAL_BIN_REL))
    } else {
        CheckResult::fail(
            format!("~/{} not in PATH", platform::LOCAL_BIN_REL),
            &[
                "Add to your shell config (~/.zshrc or ~/.bashrc):",
                "export PATH=\"$HOME/.local/bin:$PATH\"",
            ],
        )
    }
}

/// All checks, in report order.
pub fn run_checks(ctx: &DoctorContext) -> Vec<CheckResult> {
    vec![
        check_notify_script(&ctx.claude_dir),
        check_settings_hooks(&ctx.claude_dir),
        check_config(&ctx.config_path),
        check_path(ctx.path_env.as_deref(), &ctx.home),
    ]
}

// ============================================================================
// REPORT (pure)
// ============================================================================

/// Number of failed checks.
pub fn issue_count(checks: &[CheckResult]) -> usize {
    checks.iter().filter(|c| !c.passed).count()
}

/// Status header, check lines and summary.
pub fn format_report(config: &AppConfig, checks: &[CheckResult], log_path: &Path) -> String {
    let mut out = String::new();

    let icon = if config.icon == IconVariant::default() {
        format!("{} (default)", config.icon)
    } else {
        config.icon.to_string()
    };
    out.push_str(&format!("ClaudeNotifier v{}\n", env!("CARGO_PKG_VERSION")));
    out.push_str(&format!("  Icon:  {}\n", icon));
    out.push_str(&format!("  Sound: {}\n", sound_display_name(&config.sound)));
    out.push_str(&format!(
        "  Headless: {}\n\n",
        if config.notify_in_headless_mode { "enabled" } else { "disabled" }
    ));

    out.push_str("Diagnostics\n\n");
    for check in checks {
        if check.passed {
            out.push_str(&format!("  ✓ {}\n", check.message));
        } else {
            out.push_str(&format!("  ✗ {}\n", check.message));
            for line in &check.remediation {
                out.push_str(&format!("    → {}\n", line));
            }
        }
    }

    out.push('\n');
    match issue_count(checks) {
        0 => out.push_str("All checks passed! ClaudeNotifier is properly configured.\n"),
        n => {
            out.push_str(&format!("{} issue{} found.\n", n, if n == 1 { "" } else { "s" }));
            out.push_str("Run 'claude-notifier setup' to fix configuration issues.\n");
            out.push_str(&format!("Logs: {}\n", log_path.display()));
        }
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_script(dir: &Path, mode: u32) {
        fs::create_dir_all(dir).unwrap();
        let script = platform::notify_script_path(dir);
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_notify_script_states() {
        let temp = TempDir::new().unwrap();
        let check = check_notify_script(temp.path());
        assert!(!check.passed);
        assert_eq!(check.message, "notify.sh not found");

        write_script(temp.path(), 0o644);
        let check = check_notify_script(temp.path());
        assert!(!check.passed);
        assert_eq!(check.message, "notify.sh is not executable");
        assert!(check.remediation[0].starts_with("Run 'chmod +x "));

        write_script(temp.path(), 0o755);
        assert!(check_notify_script(temp.path()).passed);
    }

    #[test]
    fn test_settings_hooks_states() {
        let temp = TempDir::new().unwrap();
        let settings = temp.path().join("settings.json");

        assert_eq!(check_settings_hooks(temp.path()).message, "settings.json not found");

        fs::write(&settings, "{ nope").unwrap();
        assert_eq!(check_settings_hooks(temp.path()).message, "Failed to parse settings.json");

        fs::write(&settings, "{}").unwrap();
        assert_eq!(
            check_settings_hooks(temp.path()).message,
            "No hooks configured in settings.json"
        );

        fs::write(&settings, r#"{"hooks": {"Notification": []}}"#).unwrap();
        let check = check_settings_hooks(temp.path());
        assert!(!check.passed);
        assert_eq!(check.message, "Missing hooks: Stop");
    }

    #[test]
    fn test_settings_hooks_pass_after_setup() {
        let temp = TempDir::new().unwrap();
        hooks::install_hooks(temp.path()).unwrap();
        let check = check_settings_hooks(temp.path());
        assert!(check.passed);
        assert_eq!(check.message, "Hooks: configured");
    }

    #[test]
    fn test_config_check() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        assert!(check_config(&path).passed);

        fs::write(&path, "not json").unwrap();
        assert!(!check_config(&path).passed);

        config::save_config(&AppConfig::default(), &path).unwrap();
        assert!(check_config(&path).passed);
    }

    #[test]
    fn test_path_check() {
        let home = Path::new("/Users/test");
        assert!(check_path(Some("/usr/bin:/Users/test/.local/bin"), home).passed);
        assert!(check_path(None, home).passed);

        let check = check_path(Some("/usr/bin:/bin"), home);
        assert!(!check.passed);
        assert_eq!(check.remediation.len(), 2);
    }

    #[test]
    fn test_fresh_home_reports_issues() {
        let home = TempDir::new().unwrap();
        let ctx = DoctorContext::for_home(home.path(), Some("/usr/bin".into()));
        let checks = run_checks(&ctx);

        assert_eq!(checks.len(), 4);
        assert_eq!(issue_count(&checks), 3);

        let report = format_report(&AppConfig::default(), &checks, Path::new("/tmp/n.log"));
        assert!(report.contains("  Icon:  brown (default)\n"));
        assert!(report.contains("  ✗ notify.sh not found\n"));
        assert!(report.contains("    → Run 'claude-notifier setup' to create configuration\n"));
        assert!(report.contains("  ✓ Config: defaults (no config file)\n"));
        assert!(report.ends_with("3 issues found.\nRun 'claude-notifier setup' to fix configuration issues.\nLogs: /tmp/n.log\n"));
    }

    #[test]
    fn test_configured_home_passes() {
        let home = TempDir::new().unwrap();
        let ctx = DoctorContext::for_home(
            home.path(),
            Some(format!("/usr/bin:{}", home.path().join(".local/bin").display())),
        );
        write_script(&ctx.claude_dir, 0o755);
        hooks::install_hooks(&ctx.claude_dir).unwrap();

        let checks = run_checks(&ctx);
        assert_eq!(issue_count(&checks), 0);

        let config = AppConfig {
            icon: IconVariant::Green,
            sound: "Glass".into(),
            ..AppConfig::default()
        };
        let report = format_report(&config, &checks, Path::new("/tmp/n.log"));
        assert!(report.contains("  Icon:  green\n  Sound: Glass\n"));
        assert!(report.ends_with("All checks passed! ClaudeNotifier is properly configured.\n"));
    }
}
