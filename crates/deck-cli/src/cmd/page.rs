use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use deck_core::FileStore;
use std::path::Path;

#[derive(Subcommand)]
pub enum PageSubcommand {
    /// List the pages of a profile
    List {
        /// Profile id or name (default: active profile)
        #[arg(long)]
        profile: Option<String>,
    },
    /// Add a page of 18 empty buttons
    Add {
        name: String,
        #[arg(long)]
        profile: Option<String>,
    },
    /// Delete a page (a profile keeps at least one)
    Delete {
        page: String,
        #[arg(long)]
        profile: Option<String>,
    },
    /// Rename a page
    Rename {
        page: String,
        name: String,
        #[arg(long)]
        profile: Option<String>,
    },
    /// Make a page the profile's active page
    Use {
        page: String,
        #[arg(long)]
        profile: Option<String>,
    },
}

pub fn run(home: &Path, subcmd: PageSubcommand, json: bool) -> anyhow::Result<()> {
    let store = FileStore::open(home);
    match subcmd {
        PageSubcommand::List { profile } => list(&store, profile.as_deref(), json),
        PageSubcommand::Add { name, profile } => {
            let id = store
                .update(|data| Ok(data.add_page(profile.as_deref(), &name)?.id.clone()))
                .with_context(|| format!("failed to add page '{name}'"))?;
            report(json, serde_json::json!({ "id": id, "name": name }), || {
                format!("Added page '{name}' ({id}).")
            })
        }
        PageSubcommand::Delete { page, profile } => {
            let removed = store
                .update(|data| data.delete_page(profile.as_deref(), &page))
                .with_context(|| format!("failed to delete page '{page}'"))?;
            report(
                json,
                serde_json::json!({ "id": removed.id, "name": removed.name, "deleted": true }),
                || format!("Deleted page '{}'.", removed.name),
            )
        }
        PageSubcommand::Rename {
            page,
            name,
            profile,
        } => {
            store
                .update(|data| data.rename_page(profile.as_deref(), &page, &name))
                .with_context(|| format!("failed to rename page '{page}'"))?;
            report(json, serde_json::json!({ "page": page, "name": name }), || {
                format!("Renamed page '{page}' to '{name}'.")
            })
        }
        PageSubcommand::Use { page, profile } => {
            store
                .update(|data| data.use_page(profile.as_deref(), &page))
                .with_context(|| format!("failed to activate page '{page}'"))?;
            report(json, serde_json::json!({ "active": page }), || {
                format!("Active page: {page}")
            })
        }
    }
}

fn report(
    json: bool,
    value: serde_json::Value,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        print_json(&value)
    } else {
        println!("{}", text());
        Ok(())
    }
}

fn list(store: &FileStore, profile: Option<&str>, json: bool) -> anyhow::Result<()> {
    let data = store.load().context("failed to load configuration")?;
    let profile = match profile {
        Some(key) => data.profile(key)?,
        None => data
            .active_profile()
            .context("no active profile; run `deckforge profile use <profile>`")?,
    };

    if json {
        let items: Vec<serde_json::Value> = profile
            .pages
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "bound": p.buttons.iter().filter(|b| !b.actions.is_empty()).count(),
                    "active": p.id == profile.active_page_id,
                })
            })
            .collect();
        return print_json(&items);
    }

    println!("Profile: {}", profile.name);
    let rows = profile
        .pages
        .iter()
        .map(|p| {
            let bound = p.buttons.iter().filter(|b| !b.actions.is_empty()).count();
            vec![
                if p.id == profile.active_page_id { "*" } else { "" }.to_string(),
                p.name.clone(),
                bound.to_string(),
                p.id.clone(),
            ]
        })
        .collect();
    print_table(&["", "NAME", "BOUND", "ID"], rows);
    Ok(())
}
