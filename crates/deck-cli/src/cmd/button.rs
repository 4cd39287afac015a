use crate::cmd::run::build_params;
use crate::output::{print_json, print_table};
use anyhow::{anyhow, Context};
use clap::{Args, Subcommand};
use deck_core::action::Action;
use deck_core::store::DeckData;
use deck_core::types::{ButtonConfig, Page};
use deck_core::{ActionDescriptor, FileStore};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

/// Which page a button lives on. Defaults to the active page of the active
/// profile.
#[derive(Args)]
pub struct PageSelector {
    /// Profile id or name
    #[arg(long)]
    profile: Option<String>,
    /// Page id or name
    #[arg(long)]
    page: Option<String>,
}

#[derive(Subcommand)]
pub enum ButtonSubcommand {
    /// Show one button, or every button on the page
    Show {
        id: Option<u32>,
        #[command(flatten)]
        at: PageSelector,
    },
    /// Set a button's label
    SetLabel {
        id: u32,
        label: String,
        #[command(flatten)]
        at: PageSelector,
    },
    /// Enable or disable a button
    SetEnabled {
        id: u32,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
        #[command(flatten)]
        at: PageSelector,
    },
    /// Append an action to a button
    AddAction {
        id: u32,
        /// Action kind, e.g. open-url
        kind: String,
        /// Parameter as key=value (repeatable)
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        #[arg(long, value_name = "JSON")]
        json_params: Option<String>,
        /// Display label for the action
        #[arg(long)]
        label: Option<String>,
        #[command(flatten)]
        at: PageSelector,
    },
    /// Remove the action at a 1-based position
    RemoveAction {
        id: u32,
        position: usize,
        #[command(flatten)]
        at: PageSelector,
    },
    /// Reset a button to its empty default
    Clear {
        id: u32,
        #[command(flatten)]
        at: PageSelector,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(home: &Path, subcmd: ButtonSubcommand, json: bool) -> anyhow::Result<()> {
    let store = FileStore::open(home);
    match subcmd {
        ButtonSubcommand::Show { id, at } => show(&store, id, &at, json),
        ButtonSubcommand::SetLabel { id, label, at } => {
            edit(&store, id, &at, json, |data| {
                data.button_mut(at.profile.as_deref(), at.page.as_deref(), id)?
                    .label = label.clone();
                Ok(())
            })?;
            if !json {
                println!("Button {id} labelled '{label}'.");
            }
            Ok(())
        }
        ButtonSubcommand::SetEnabled { id, enabled, at } => {
            edit(&store, id, &at, json, |data| {
                data.button_mut(at.profile.as_deref(), at.page.as_deref(), id)?
                    .enabled = enabled;
                Ok(())
            })?;
            if !json {
                let state = if enabled { "enabled" } else { "disabled" };
                println!("Button {id} {state}.");
            }
            Ok(())
        }
        ButtonSubcommand::AddAction {
            id,
            kind,
            params,
            json_params,
            label,
            at,
        } => {
            let mut descriptor =
                ActionDescriptor::new(kind.as_str(), build_params(&params, json_params.as_deref())?);
            let action_kind = descriptor.action_kind().with_context(|| format!("cannot add '{kind}'"))?;
            Action::parse(action_kind, &descriptor.params)
                .with_context(|| format!("invalid parameters for '{kind}'"))?;
            if let Some(label) = label {
                descriptor.label = label;
            }

            edit(&store, id, &at, json, |data| {
                data.button_mut(at.profile.as_deref(), at.page.as_deref(), id)?
                    .actions
                    .push(descriptor);
                Ok(())
            })?;
            if !json {
                println!("Added {kind} to button {id}.");
            }
            Ok(())
        }
        ButtonSubcommand::RemoveAction { id, position, at } => {
            let removed = store
                .update(|data| {
                    let button = data.button_mut(at.profile.as_deref(), at.page.as_deref(), id)?;
                    Ok((position >= 1 && position <= button.actions.len())
                        .then(|| button.actions.remove(position - 1)))
                })
                .context("failed to update button")?
                .ok_or_else(|| anyhow!("button {id} has no action at position {position}"))?;
            if json {
                print_json(&removed)?;
            } else {
                println!("Removed {} from button {id}.", removed.kind);
            }
            Ok(())
        }
        ButtonSubcommand::Clear { id, at } => {
            edit(&store, id, &at, json, |data| {
                data.set_button(
                    at.profile.as_deref(),
                    at.page.as_deref(),
                    id,
                    ButtonConfig::new(id),
                )
            })?;
            if !json {
                println!("Button {id} cleared.");
            }
            Ok(())
        }
    }
}

/// Apply `f` and save; with `--json` print the button as stored.
fn edit(
    store: &FileStore,
    id: u32,
    at: &PageSelector,
    json: bool,
    f: impl FnOnce(&mut DeckData) -> deck_core::Result<()>,
) -> anyhow::Result<()> {
    store
        .update(|data| {
            f(data)?;
            Ok(data
                .button_mut(at.profile.as_deref(), at.page.as_deref(), id)?
                .clone())
        })
        .with_context(|| format!("failed to update button {id}"))
        .and_then(|button| if json { print_json(&button) } else { Ok(()) })
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn select_page<'a>(data: &'a DeckData, at: &PageSelector) -> anyhow::Result<&'a Page> {
    let profile = match at.profile.as_deref() {
        Some(key) => data.profile(key)?,
        None => data
            .active_profile()
            .context("no active profile; run `deckforge profile use <profile>`")?,
    };
    let key = at.page.as_deref().unwrap_or(profile.active_page_id.as_str());
    profile
        .pages
        .iter()
        .find(|p| p.id == key)
        .or_else(|| profile.pages.iter().find(|p| p.name == key))
        .ok_or_else(|| anyhow!("page not found: {key}"))
}

fn show(store: &FileStore, id: Option<u32>, at: &PageSelector, json: bool) -> anyhow::Result<()> {
    let data = store.load().context("failed to load configuration")?;
    let page = select_page(&data, at)?;

    if let Some(id) = id {
        let button = page
            .button(id)
            .ok_or_else(|| anyhow!("no button {id} on page '{}'", page.name))?;
        if json {
            return print_json(button);
        }
        println!("Button {}  {}", button.id, button.label);
        println!("Enabled: {}", button.enabled);
        println!("Color:   {}", button.color);
        if let Some(icon) = &button.icon {
            println!("Icon:    {icon}");
        }
        if button.actions.is_empty() {
            println!("Actions: (none)");
        } else {
            println!("Actions:");
            for (i, action) in button.actions.iter().enumerate() {
                let params = serde_json::Value::Object(action.params.clone());
                println!("  {}. {} {params}", i + 1, action.kind);
            }
        }
        return Ok(());
    }

    if json {
        return print_json(&page.buttons);
    }
    println!("Page: {}", page.name);
    let rows = page
        .buttons
        .iter()
        .map(|b| {
            let kinds: Vec<&str> = b.actions.iter().map(|a| a.kind.as_str()).collect();
            vec![
                b.id.to_string(),
                b.label.clone(),
                if b.enabled { "yes" } else { "no" }.to_string(),
                kinds.join(", "),
            ]
        })
        .collect();
    print_table(&["ID", "LABEL", "ENABLED", "ACTIONS"], rows);
    Ok(())
}
