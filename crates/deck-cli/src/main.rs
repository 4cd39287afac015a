mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{
    button::ButtonSubcommand, page::PageSubcommand, profile::ProfileSubcommand,
    settings::SettingsSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "deckforge",
    about = "DeckForge macro-pad bridge: run button actions, host the WebSocket bridge, edit profiles",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data directory (default: ~/.deckforge)
    #[arg(long, global = true, env = "DECKFORGE_HOME")]
    home: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Host the WebSocket bridge until Ctrl-C
    Serve {
        /// Port to listen on (default: bridgePort from settings; 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Fire a button on the active page of the active profile
    Trigger {
        /// Button number, 1..18
        index: u32,
    },

    /// Dispatch a single action and print its outcome
    Run {
        /// Action kind, e.g. open-url or media-mute
        kind: String,
        /// Parameter as key=value (repeatable: --param x=10 --param y=20)
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Parameters as a JSON object; merged under any --param values
        #[arg(long, value_name = "JSON")]
        json_params: Option<String>,
        /// Print the composed command instead of running it
        #[arg(long)]
        dry_run: bool,
        /// Compose for another platform (linux, macos, windows); needs --dry-run
        #[arg(long, requires = "dry_run")]
        platform: Option<String>,
    },

    /// Manage profiles
    Profile {
        #[command(subcommand)]
        subcommand: ProfileSubcommand,
    },

    /// Manage pages of a profile
    Page {
        #[command(subcommand)]
        subcommand: PageSubcommand,
    },

    /// Inspect and edit buttons
    Button {
        #[command(subcommand)]
        subcommand: ButtonSubcommand,
    },

    /// Show and change application settings
    Settings {
        #[command(subcommand)]
        subcommand: SettingsSubcommand,
    },

    /// Print the keyboard-mode accelerator for every button
    Shortcuts,

    /// Check which automation utilities are installed
    Doctor,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = deck_core::paths::data_dir(cli.home.as_deref())
        .map_err(anyhow::Error::from)
        .and_then(|home| match cli.command {
            Commands::Serve { port } => cmd::serve::run(&home, port),
            Commands::Trigger { index } => cmd::trigger::run(&home, index, cli.json),
            Commands::Run {
                kind,
                params,
                json_params,
                dry_run,
                platform,
            } => cmd::run::run(
                &kind,
                &params,
                json_params.as_deref(),
                dry_run,
                platform.as_deref(),
                cli.json,
            ),
            Commands::Profile { subcommand } => cmd::profile::run(&home, subcommand, cli.json),
            Commands::Page { subcommand } => cmd::page::run(&home, subcommand, cli.json),
            Commands::Button { subcommand } => cmd::button::run(&home, subcommand, cli.json),
            Commands::Settings { subcommand } => cmd::settings::run(&home, subcommand, cli.json),
            Commands::Shortcuts => cmd::shortcuts::run(cli.json),
            Commands::Doctor => cmd::doctor::run(cli.json),
        });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
