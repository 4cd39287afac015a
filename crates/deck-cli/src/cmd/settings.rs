use crate::output::print_json;
use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use deck_core::FileStore;
use std::path::Path;

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show current settings
    Show,
    /// Set the bridge port used by `serve`
    SetPort { port: u16 },
    /// Enable or disable the WebSocket bridge
    Bridge {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Enable or disable keyboard-mode accelerators
    KeyboardMode {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Check the configuration for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(home: &Path, subcmd: SettingsSubcommand, json: bool) -> anyhow::Result<()> {
    let store = FileStore::open(home);
    match subcmd {
        SettingsSubcommand::Show => show(&store, json),
        SettingsSubcommand::SetPort { port } => {
            store
                .update(|data| {
                    data.settings.bridge_port = port;
                    Ok(())
                })
                .context("failed to save settings")?;
            show_or(&store, json, || println!("Bridge port set to {port}."))
        }
        SettingsSubcommand::Bridge { state } => {
            store
                .update(|data| {
                    data.settings.bridge_enabled = state.enabled();
                    Ok(())
                })
                .context("failed to save settings")?;
            show_or(&store, json, || {
                println!("Bridge {}.", if state.enabled() { "enabled" } else { "disabled" })
            })
        }
        SettingsSubcommand::KeyboardMode { state } => {
            store
                .update(|data| {
                    data.settings.keyboard_mode_enabled = state.enabled();
                    Ok(())
                })
                .context("failed to save settings")?;
            show_or(&store, json, || {
                println!(
                    "Keyboard mode {}.",
                    if state.enabled() { "enabled" } else { "disabled" }
                )
            })
        }
        SettingsSubcommand::Validate => validate(&store, json),
    }
}

fn show_or(store: &FileStore, json: bool, text: impl FnOnce()) -> anyhow::Result<()> {
    if json {
        show(store, true)
    } else {
        text();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(store: &FileStore, json: bool) -> anyhow::Result<()> {
    let data = store.load().context("failed to load configuration")?;
    let settings = &data.settings;

    if json {
        return print_json(settings);
    }

    let active = data
        .active_profile()
        .map(|p| p.name.as_str())
        .unwrap_or("(none)");
    println!("Config file:    {}", store.path().display());
    println!("Active profile: {active}");
    println!("Bridge:         {}", on_off(settings.bridge_enabled));
    println!("Bridge port:    {}", settings.bridge_port);
    println!("Keyboard mode:  {}", on_off(settings.keyboard_mode_enabled));
    println!("Auto start:     {}", on_off(settings.auto_start));
    println!("Tray:           {}", on_off(settings.minimize_to_tray));
    println!("Theme:          {:?}", settings.theme);
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(store: &FileStore, json: bool) -> anyhow::Result<()> {
    let data = store.load().context("failed to load configuration")?;
    let warnings = data.validate();

    if json {
        return print_json(&serde_json::json!({
            "ok": warnings.is_empty(),
            "warnings": warnings,
        }));
    }

    if warnings.is_empty() {
        println!("Configuration OK.");
        return Ok(());
    }
    for w in &warnings {
        println!("warning: {w}");
    }
    println!("{} warning(s).", warnings.len());
    Ok(())
}
