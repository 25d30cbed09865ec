//! Interactive configuration flow for the `config` command.
//!
//! A main menu leads to one submenu per setting. Menus run one after the
//! other, never nested: each one restores the terminal before the next one
//! opens. Which menu runner to use is injected, so the flow is testable
//! without a terminal.

use std::time::Duration;

use crate::tui::{Menu, MenuItem};
use crate::types::{AppConfig, IconVariant, SYSTEM_SOUNDS, sound_display_name};

pub const MAIN_TITLE: &str = "ClaudeNotifier Configuration";
pub const ICON_TITLE: &str = "Icon Color";
pub const SOUND_TITLE: &str = "Notification Sound";
pub const HEADLESS_TITLE: &str = "Headless Mode Notifications";

/// Entries of the main menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Icon,
    Sound,
    Headless,
    Done,
}

impl Setting {
    pub const ALL: [Setting; 4] = [Setting::Icon, Setting::Sound, Setting::Headless, Setting::Done];

    pub fn value(&self) -> &'static str {
        match self {
            Setting::Icon => "icon",
            Setting::Sound => "sound",
            Setting::Headless => "headless",
            Setting::Done => "done",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Setting::Icon => "Icon color",
            Setting::Sound => "Notification sound",
            Setting::Headless => "Headless mode notifications",
            Setting::Done => "Done",
        }
    }

    pub fn from_value(value: &str) -> Option<Setting> {
        Setting::ALL.into_iter().find(|s| s.value() == value)
    }

    fn position(&self) -> usize {
        Setting::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

// ============================================================================
// MENU CONSTRUCTION (pure)
// ============================================================================

pub fn main_menu(selected: usize, escape_timeout: Duration) -> Menu<'static> {
    let items = Setting::ALL
        .iter()
        .map(|s| MenuItem::new(s.label(), s.value()))
        .collect();
    Menu::new(MAIN_TITLE, items)
        .initial_index(selected)
        .escape_timeout(escape_timeout)
}

pub fn icon_menu(config: &AppConfig) -> Menu<'static> {
    let items = IconVariant::ALL
        .iter()
        .map(|v| MenuItem::new(v.display_name(), v.as_str()).current(*v == config.icon))
        .collect();
    let initial = IconVariant::ALL
        .iter()
        .position(|v| *v == config.icon)
        .unwrap_or(0);
    Menu::new(ICON_TITLE, items)
        .initial_index(initial)
        .escape_timeout(escape_timeout(config))
}

/// Sound submenu; Space plays the highlighted sound through `preview`.
pub fn sound_menu<'a>(config: &AppConfig, preview: impl FnMut(&str) + 'a) -> Menu<'a> {
    let items = SYSTEM_SOUNDS
        .iter()
        .map(|&s| MenuItem::new(sound_display_name(s), s).current(s == config.sound))
        .collect();
    let initial = SYSTEM_SOUNDS
        .iter()
        .position(|&s| s == config.sound)
        .unwrap_or(0);
    Menu::new(SOUND_TITLE, items)
        .initial_index(initial)
        .escape_timeout(escape_timeout(config))
        .on_preview(preview)
}

pub fn headless_menu(config: &AppConfig) -> Menu<'static> {
    let enabled = config.notify_in_headless_mode;
    let items = vec![
        MenuItem::new("Enabled", "true").current(enabled),
        MenuItem::new("Disabled", "false").current(!enabled),
    ];
    Menu::new(HEADLESS_TITLE, items)
        .initial_index(if enabled { 0 } else { 1 })
        .escape_timeout(escape_timeout(config))
}

fn escape_timeout(config: &AppConfig) -> Duration {
    Duration::from_millis(config.escape_timeout_ms)
}

// ============================================================================
// APPLYING SELECTIONS (pure)
// ============================================================================

/// Apply a submenu selection to the config. Unknown values are ignored.
pub fn apply_selection(config: &mut AppConfig, setting: Setting, value: &str) {
    match setting {
        Setting::Icon => {
            if let Some(variant) = IconVariant::parse(value) {
                config.icon = variant;
            }
        }
        Setting::Sound => {
            if SYSTEM_SOUNDS.contains(&value) {
                config.sound = value.to_string();
            }
        }
        Setting::Headless => config.notify_in_headless_mode = value == "true",
        Setting::Done => {}
    }
}

/// Human-readable lines describing what changed between two configs.
pub fn describe_changes(old: &AppConfig, new: &AppConfig) -> Vec<String> {
    let mut changes = Vec::new();
    if old.icon != new.icon {
        changes.push(format!("Icon color: {} → {}", old.icon, new.icon));
    }
    if old.sound != new.sound {
        changes.push(format!(
            "Notification sound: {} → {}",
            sound_display_name(&old.sound),
            sound_display_name(&new.sound)
        ));
    }
    if old.notify_in_headless_mode != new.notify_in_headless_mode {
        changes.push(format!(
            "Headless mode notifications: {}",
            if new.notify_in_headless_mode { "enabled" } else { "disabled" }
        ));
    }
    changes
}

/// Output of `icon --list`: every variant, marking the current one, and the
/// default one unless it is current.
pub fn icon_listing(current: IconVariant) -> Vec<String> {
    let mut lines = vec!["Available icon variants:".to_string()];
    for variant in IconVariant::ALL {
        let mark = if variant == current {
            " (current)"
        } else if variant == IconVariant::default() {
            " (default)"
        } else {
            ""
        };
        lines.push(format!("  {}{}", variant, mark));
    }
    lines.push(String::new());
    lines.push("Usage: claude-notifier icon <variant>".to_string());
    lines
}

// ============================================================================
// FLOW
// ============================================================================

/// Drive the main menu and submenus until the user is done.
///
/// `pick` runs one menu and returns its selection; `preview` plays a sound.
/// After a submenu closes, the main menu reopens on the same entry.
pub fn edit_config<P, S>(config: &mut AppConfig, mut pick: P, mut preview: S)
where
    P: FnMut(Menu<'_>) -> Option<String>,
    S: FnMut(&str),
{
    let mut selected = 0;

    loop {
        let Some(choice) = pick(main_menu(selected, escape_timeout(config))) else {
            return;
        };
        let setting = match Setting::from_value(&choice) {
            Some(Setting::Done) | None => return,
            Some(setting) => setting,
        };
        selected = setting.position();

        let submenu = match setting {
            Setting::Icon => icon_menu(config),
            Setting::Sound => sound_menu(config, &mut preview),
            Setting::Headless => headless_menu(config),
            Setting::Done => return,
        };
        if let Some(value) = pick(submenu) {
            tracing::debug!(setting = setting.value(), value = %value, "setting selected");
            apply_selection(config, setting, &value);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
