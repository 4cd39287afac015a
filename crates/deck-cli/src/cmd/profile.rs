use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use deck_core::FileStore;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

/// Profiles are addressed by id or by name.
#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// List profiles
    List,
    /// Create a profile with one empty page
    Add {
        name: String,
        /// Make it the active profile
        #[arg(long = "use")]
        activate: bool,
    },
    /// Delete a profile (the last one cannot be deleted)
    Delete { profile: String },
    /// Rename a profile
    Rename { profile: String, name: String },
    /// Make a profile active
    Use { profile: String },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(home: &Path, subcmd: ProfileSubcommand, json: bool) -> anyhow::Result<()> {
    let store = FileStore::open(home);
    match subcmd {
        ProfileSubcommand::List => list(&store, json),
        ProfileSubcommand::Add { name, activate } => add(&store, &name, activate, json),
        ProfileSubcommand::Delete { profile } => delete(&store, &profile, json),
        ProfileSubcommand::Rename { profile, name } => rename(&store, &profile, &name, json),
        ProfileSubcommand::Use { profile } => use_profile(&store, &profile, json),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(store: &FileStore, json: bool) -> anyhow::Result<()> {
    let data = store.load().context("failed to load configuration")?;
    let active = data.settings.active_profile_id.as_str();

    if json {
        let items: Vec<serde_json::Value> = data
            .profiles
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "pages": p.pages.len(),
                    "active": p.id == active,
                })
            })
            .collect();
        return print_json(&items);
    }

    let rows = data
        .profiles
        .iter()
        .map(|p| {
            vec![
                if p.id == active { "*" } else { "" }.to_string(),
                p.name.clone(),
                p.pages.len().to_string(),
                p.id.clone(),
            ]
        })
        .collect();
    print_table(&["", "NAME", "PAGES", "ID"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// mutations
// ---------------------------------------------------------------------------

fn add(store: &FileStore, name: &str, activate: bool, json: bool) -> anyhow::Result<()> {
    let id = store
        .update(|data| {
            let id = data.add_profile(name).id.clone();
            if activate {
                data.use_profile(&id)?;
            }
            Ok(id)
        })
        .with_context(|| format!("failed to add profile '{name}'"))?;

    if json {
        print_json(&serde_json::json!({ "id": id, "name": name, "active": activate }))?;
    } else {
        println!("Added profile '{name}' ({id}).");
    }
    Ok(())
}

fn delete(store: &FileStore, key: &str, json: bool) -> anyhow::Result<()> {
    let removed = store
        .update(|data| data.delete_profile(key))
        .with_context(|| format!("failed to delete profile '{key}'"))?;

    if json {
        print_json(&serde_json::json!({ "id": removed.id, "name": removed.name, "deleted": true }))?;
    } else {
        println!("Deleted profile '{}'.", removed.name);
    }
    Ok(())
}

fn rename(store: &FileStore, key: &str, name: &str, json: bool) -> anyhow::Result<()> {
    store
        .update(|data| data.rename_profile(key, name))
        .with_context(|| format!("failed to rename profile '{key}'"))?;

    if json {
        print_json(&serde_json::json!({ "profile": key, "name": name }))?;
    } else {
        println!("Renamed profile '{key}' to '{name}'.");
    }
    Ok(())
}

fn use_profile(store: &FileStore, key: &str, json: bool) -> anyhow::Result<()> {
    store
        .update(|data| data.use_profile(key))
        .with_context(|| format!("failed to activate profile '{key}'"))?;

    if json {
        print_json(&serde_json::json!({ "active": key }))?;
    } else {
        println!("Active profile: {key}");
    }
    Ok(())
}
