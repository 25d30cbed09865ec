//! Domain types for claude-notifier.

use serde::{Deserialize, Serialize};

// ============================================================================
// ENUMS
// ============================================================================

/// Color variants of the notification icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconVariant {
    #[default]
    Brown,
    Blue,
    Green,
}

impl IconVariant {
    pub const ALL: [IconVariant; 3] = [IconVariant::Brown, IconVariant::Blue, IconVariant::Green];

    /// Stable identifier, as stored in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            IconVariant::Brown => "brown",
            IconVariant::Blue => "blue",
            IconVariant::Green => "green",
        }
    }

    /// Label shown in menus.
    pub fn display_name(&self) -> &'static str {
        match self {
            IconVariant::Brown => "Brown (default)",
            IconVariant::Blue => "Blue",
            IconVariant::Green => "Green",
        }
    }

    pub fn parse(s: &str) -> Option<IconVariant> {
        IconVariant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for IconVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SOUNDS
// ============================================================================

/// Sound setting that uses the system's default notification sound.
pub const SOUND_DEFAULT: &str = "default";

/// Sound setting that disables notification sounds.
pub const SOUND_NONE: &str = "none";

/// Selectable notification sounds: the two special values, then the named
/// macOS system sounds.
pub const SYSTEM_SOUNDS: [&str; 16] = [
    SOUND_DEFAULT,
    SOUND_NONE,
    "Basso",
    "Blow",
    "Bottle",
    "Frog",
    "Funk",
    "Glass",
    "Hero",
    "Morse",
    "Ping",
    "Pop",
    "Purr",
    "Sosumi",
    "Submarine",
    "Tink",
];

/// Label shown in menus for a sound setting.
pub fn sound_display_name(sound: &str) -> &str {
    match sound {
        SOUND_DEFAULT => "Default (system sound)",
        SOUND_NONE => "None (silent)",
        other => other,
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// Default escape-sequence timeout in milliseconds.
pub const DEFAULT_ESCAPE_TIMEOUT_MS: u64 = 50;

/// Persistent user preferences.
///
/// Unknown fields are ignored and missing ones take defaults, so older and
/// newer config files both load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub icon: IconVariant,

    #[serde(default = "default_sound")]
    pub sound: String,

    /// Notify for non-interactive (`-p`) sessions too.
    #[serde(default)]
    pub notify_in_headless_mode: bool,

    /// Wait for arrow-key continuation bytes in menus.
    #[serde(default = "default_escape_timeout_ms")]
    pub escape_timeout_ms: u64,
}

fn default_sound() -> String {
    SOUND_DEFAULT.to_string()
}

fn default_escape_timeout_ms() -> u64 {
    DEFAULT_ESCAPE_TIMEOUT_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            icon: IconVariant::default(),
            sound: default_sound(),
            notify_in_headless_mode: false,
            escape_timeout_ms: default_escape_timeout_ms(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_factory_settings() {
        let config = AppConfig::default();
        assert_eq!(config.icon, IconVariant::Brown);
        assert_eq!(config.sound, "default");
        assert!(!config.notify_in_headless_mode);
        assert_eq!(config.escape_timeout_ms, 50);
    }

    #[test]
    fn config_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(AppConfig::default()).unwrap();
        assert_eq!(json["icon"], "brown");
        assert_eq!(json["sound"], "default");
        assert_eq!(json["notifyInHeadlessMode"], false);
        assert_eq!(json["escapeTimeoutMs"], 50);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"icon":"blue"}"#).unwrap();
        assert_eq!(config.icon, IconVariant::Blue);
        assert_eq!(config.sound, "default");
        assert_eq!(config.escape_timeout_ms, 50);
    }

    #[test]
    fn unknown_icon_is_rejected() {
        let result: Result<AppConfig, _> = serde_json::from_str(r#"{"icon":"purple"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn icon_parse_is_case_insensitive() {
        assert_eq!(IconVariant::parse("GREEN"), Some(IconVariant::Green));
        assert_eq!(IconVariant::parse("teal"), None);
    }

    #[test]
    fn sound_display_names() {
        assert_eq!(sound_display_name("default"), "Default (system sound)");
        assert_eq!(sound_display_name("none"), "None (silent)");
        assert_eq!(sound_display_name("Glass"), "Glass");
    }

    #[test]
    fn system_sounds_start_with_special_values() {
        assert_eq!(SYSTEM_SOUNDS[0], SOUND_DEFAULT);
        assert_eq!(SYSTEM_SOUNDS[1], SOUND_NONE);
        assert!(SYSTEM_SOUNDS.contains(&"Submarine"));
    }
}
