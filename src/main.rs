//! claude-notifier CLI
//!
//! Configure notification preferences interactively, install the Claude
//! hooks, check the installation, and inspect the log.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use claude_notifier::config::{default_config_path, load_config, save_config};
use claude_notifier::doctor::{self, DoctorContext};
use claude_notifier::hooks;
use claude_notifier::logging::{self, LogsAction, default_log_path};
use claude_notifier::platform::{self, SoundPlayer};
use claude_notifier::settings::{describe_changes, edit_config, icon_listing};
use claude_notifier::tui::run::install_panic_hook;
use claude_notifier::tui::signals::install_signal_handler;
use claude_notifier::tui::terminal::Tty;
use claude_notifier::types::IconVariant;

#[derive(Parser)]
#[command(name = "claude-notifier")]
#[command(about = "Notification helper for Claude sessions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open an interactive menu to configure preferences
    #[command(after_help = "Settings:\n  \
        Icon color                    Change the notification icon color (brown, blue, green)\n  \
        Notification sound            Choose the notification sound or disable it\n  \
        Headless mode notifications   Enable notifications for claude -p sessions (off by default)")]
    Config {
        /// Config file to edit (default: ~/.claude-notifier/config.json)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Install the notification hooks into Claude's settings.json
    Setup {
        /// Claude config directory (prompted for when omitted; default ~/.claude)
        #[arg(long)]
        claude_dir: Option<PathBuf>,
    },

    /// Check the installation and configuration
    Doctor,

    /// List icon variants or choose one
    Icon {
        /// Variant to use: brown, blue or green
        variant: Option<String>,

        /// Reset to the default variant
        #[arg(long, short = 'd', conflicts_with = "variant")]
        default: bool,

        /// List available variants
        #[arg(long, short = 'l', conflicts_with_all = ["variant", "default"])]
        list: bool,
    },

    /// View or manage the log file
    Logs {
        /// Clear the log file
        #[arg(long, short = 'c', conflicts_with = "path")]
        clear: bool,

        /// Print the log file location and size
        #[arg(long)]
        path: bool,
    },
}

impl Commands {
    /// Whether the command records its work in the log file. `logs` only
    /// inspects the file and must not create it.
    fn writes_log(&self) -> bool {
        !matches!(self, Commands::Logs { .. })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_path = default_log_path();
    if cli.command.writes_log()
        && let Err(e) = logging::init(&log_path)
    {
        // Logging is optional; the commands work without it.
        eprintln!("Note: logging disabled ({}: {})", log_path.display(), e);
    }

    let result = match cli.command {
        Commands::Config { file } => cmd_config(file).map(|()| ExitCode::SUCCESS),
        Commands::Setup { claude_dir } => cmd_setup(claude_dir).map(|()| ExitCode::SUCCESS),
        Commands::Doctor => cmd_doctor(&log_path),
        Commands::Icon { variant, default, list } => {
            cmd_icon(variant, default, list).map(|()| ExitCode::SUCCESS)
        }
        Commands::Logs { clear, path } => cmd_logs(&log_path, clear, path).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn cmd_config(file: Option<PathBuf>) -> Result<(), String> {
    if !Tty::stdin().is_terminal() {
        return Err("config command requires an interactive terminal".to_string());
    }

    let path = file.unwrap_or_else(default_config_path);
    let original = load_config(&path);
    let mut config = original.clone();

    install_panic_hook();
    install_signal_handler().map_err(|e| format!("installing signal handler: {}", e))?;
    tracing::info!(path = %path.display(), "opening config menu");
    let mut player = SoundPlayer::new();
    edit_config(&mut config, |menu| menu.run(), |sound| player.play(sound));
    drop(player);

    let changes = describe_changes(&original, &config);
    if changes.is_empty() {
        println!("No changes.");
        return Ok(());
    }

    save_config(&config, &path).map_err(|e| format!("saving {}: {}", path.display(), e))?;

    for change in &changes {
        println!("{}", change);
    }
    println!("Saved to {}", path.display());

    Ok(())
}

fn cmd_setup(claude_dir: Option<PathBuf>) -> Result<(), String> {
    let home = platform::home_dir().map_err(|e| e.to_string())?;
    let claude_dir = match claude_dir {
        Some(dir) => dir,
        None => prompt_claude_dir(&home).map_err(|e| format!("reading input: {}", e))?,
    };

    let report = hooks::install_hooks(&claude_dir)
        .map_err(|e| format!("installing hooks in {}: {}", claude_dir.display(), e))?;

    if report.created_dir {
        println!("Created {}", claude_dir.display());
    }
    if report.replaced_invalid.is_some() {
        eprintln!("Warning: Could not parse existing settings.json, created a new one");
    }
    println!("Updated {}", report.settings_path.display());
    println!();
    println!("Setup complete! Notification hooks run:");
    println!("  {}", hooks::hook_command(&claude_dir, hooks::NOTIFICATION_EVENT.1));
    println!("  {}", hooks::hook_command(&claude_dir, hooks::STOP_EVENT.1));
    Ok(())
}

/// Ask for the Claude directory; an empty answer takes the default.
fn prompt_claude_dir(home: &Path) -> io::Result<PathBuf> {
    print!("Claude config directory [~/{}]: ", platform::CLAUDE_DIR_REL);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        Ok(platform::claude_dir(home))
    } else {
        Ok(platform::expand_tilde(input, home))
    }
}

fn cmd_doctor(log_path: &Path) -> Result<ExitCode, String> {
    let home = platform::home_dir().map_err(|e| e.to_string())?;
    let ctx = DoctorContext::for_home(&home, std::env::var("PATH").ok());
    let config = load_config(&ctx.config_path);

    tracing::info!("running doctor diagnostics");
    let checks = doctor::run_checks(&ctx);
    print!("{}", doctor::format_report(&config, &checks, log_path));

    match doctor::issue_count(&checks) {
        0 => {
            tracing::info!("doctor: all checks passed");
            Ok(ExitCode::SUCCESS)
        }
        issues => {
            tracing::warn!(issues, "doctor found issues");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_icon(variant: Option<String>, reset: bool, list: bool) -> Result<(), String> {
    let path = default_config_path();
    let mut config = load_config(&path);

    let chosen = match (variant, reset) {
        (_, true) => IconVariant::default(),
        (Some(name), false) if !list => match IconVariant::parse(&name) {
            Some(v) => v,
            None => {
                println!("{}", icon_listing(config.icon).join("\n"));
                return Err(format!("unknown variant '{}'", name));
            }
        },
        _ => {
            println!("{}", icon_listing(config.icon).join("\n"));
            return Ok(());
        }
    };

    if config.icon != chosen {
        tracing::info!(from = %config.icon, to = %chosen, "icon changed");
        config.icon = chosen;
        save_config(&config, &path).map_err(|e| format!("saving {}: {}", path.display(), e))?;
    }
    println!("Icon changed to: {}", chosen);
    Ok(())
}

fn cmd_logs(log_path: &Path, clear: bool, show_path: bool) -> Result<(), String> {
    let action = match (clear, show_path) {
        (true, _) => LogsAction::Clear,
        (false, true) => LogsAction::Path,
        (false, false) => LogsAction::Show,
    };
    let text = logging::logs_command(log_path, action).map_err(|e| format!("log file: {}", e))?;
    print!("{}", text);
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
