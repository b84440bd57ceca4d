//! `sfxdeck`: browse the catalog, play sounds and manage session lists.

mod commands;
mod state;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sfxdeck_core::catalog::SoundQuery;
use sfxdeck_core::lists::ListId;

use crate::commands::parse_key;
use crate::state::{load_config, AppState};

#[derive(Parser)]
#[command(name = "sfxdeck", version, about = "Sound board for tabletop sessions")]
struct Cli {
    /// Config file (defaults to sfxdeck.yaml in ~/.config/sfxdeck or the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server origin, overriding the config file
    #[arg(long, global = true)]
    server: Option<String>,

    /// Keep lists in this process instead of the server
    #[arg(long, global = true)]
    guest: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List categories
    Categories,
    /// List or search sounds
    Sounds {
        #[arg(long)]
        category: Option<u64>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Play a sound (`5`, or `5:9` for variant 9) until it ends
    Play { key: String },
    /// Show session lists
    Lists,
    /// Manage one session list
    List {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Interactive session with playback and add-to-list
    Shell {
        /// Pin a list as the add destination
        #[arg(long = "add-to-list")]
        add_to_list: Option<String>,
    },
}

#[derive(Subcommand)]
enum ListAction {
    Show { id: String },
    Create { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
    Add { id: String, key: String },
    Remove { id: String, key: String },
    /// Reorder entries, e.g. `reorder 7 6 5:9`. Server lists take each sound once
    Reorder { id: String, keys: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config, cli.server)?;
    let mut state = AppState::connect(config, cli.guest).await?;

    match cli.command {
        Command::Categories => commands::categories(&state).await,
        Command::Sounds { category, search } => {
            let query = SoundQuery {
                category_id: category,
                search,
            };
            commands::sounds(&state, &query).await
        }
        Command::Play { key } => commands::play(&mut state, parse_key(&key)?).await,
        Command::Lists => commands::lists(&state).await,
        Command::List { action } => run_list(&state, action).await,
        Command::Shell { add_to_list } => {
            let pinned = add_to_list.map(|raw| ListId::parse(&raw));
            commands::shell(&mut state, pinned).await
        }
    }
}

async fn run_list(state: &AppState, action: ListAction) -> Result<()> {
    match action {
        ListAction::Show { id } => commands::show(state, &ListId::parse(&id)).await,
        ListAction::Create { name } => commands::create(state, &name).await,
        ListAction::Rename { id, name } => commands::rename(state, &ListId::parse(&id), &name).await,
        ListAction::Delete { id } => commands::delete(state, &ListId::parse(&id)).await,
        ListAction::Add { id, key } => commands::add(state, &ListId::parse(&id), parse_key(&key)?).await,
        ListAction::Remove { id, key } => {
            commands::remove(state, &ListId::parse(&id), parse_key(&key)?).await
        }
        ListAction::Reorder { id, keys } => {
            let order = keys.iter().map(|k| parse_key(k)).collect::<Result<Vec<_>>>()?;
            commands::reorder(state, &ListId::parse(&id), &order).await
        }
    }
}
