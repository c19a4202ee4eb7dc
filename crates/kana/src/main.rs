//! `kana` — the quiz service binary.
//!
//! `kana serve` runs the HTTP API; `kana seed` prepares a database file
//! without serving.

#![deny(unsafe_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use kana_server::{AppState, StaticTokenProvider, serve};
use kana_settings::loader::{load_settings, load_settings_from_path};
use kana_store::QuizStore;

#[derive(Debug, Parser)]
#[command(name = "kana", version, about = "Adaptive Japanese syllabary quiz service")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API server.
    Serve {
        /// Database file.
        #[arg(long, default_value = "kana.db")]
        db: PathBuf,

        /// Settings file (defaults to `~/.kana/settings.json`).
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Bind address override.
        #[arg(long)]
        bind: Option<String>,

        /// Port override.
        #[arg(long)]
        port: Option<u16>,

        /// Accepted identities, `TOKEN=USER`. Repeatable.
        #[arg(long, value_name = "TOKEN=USER", value_parser = parse_token)]
        token: Vec<(String, String)>,
    },

    /// Create the database, run migrations, and seed the curriculum.
    Seed {
        /// Database file.
        #[arg(long, default_value = "kana.db")]
        db: PathBuf,
    },
}

fn parse_token(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(token, user)| (token.to_string(), user.to_string()))
        .ok_or_else(|| format!("expected TOKEN=USER, got `{raw}`"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Serve {
            db,
            settings,
            bind,
            port,
            token,
        } => run_serve(db, settings, bind, port, token).await,
        Command::Seed { db } => run_seed(&db),
    }
}

async fn run_serve(
    db: PathBuf,
    settings_path: Option<PathBuf>,
    bind: Option<String>,
    port: Option<u16>,
    tokens: Vec<(String, String)>,
) -> Result<()> {
    let settings = match settings_path {
        Some(path) => load_settings_from_path(&path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => load_settings().context("failed to load settings")?,
    };
    kana_core::logging::init_tracing(settings.logging.json);

    let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
    let port = port.unwrap_or(settings.server.port);
    kana_settings::init_settings(settings);

    let store = QuizStore::open(&db)
        .with_context(|| format!("failed to open database at {}", db.display()))?;

    let mut identity = StaticTokenProvider::new();
    if tokens.is_empty() {
        // Single-learner default for local use.
        identity.insert("local", "local");
        info!("no tokens configured, accepting `Bearer local` as learner `local`");
    }
    for (token, user) in tokens {
        identity.insert(token, user);
    }

    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {bind}:{port}"))?;
    let state = AppState::new(Arc::new(store), Arc::new(identity));
    serve(addr, state).await.context("server error")?;
    Ok(())
}

fn run_seed(db: &PathBuf) -> Result<()> {
    kana_core::logging::init_tracing(false);
    let _store = QuizStore::open(db)
        .with_context(|| format!("failed to open database at {}", db.display()))?;
    info!(db = %db.display(), "database seeded");
    Ok(())
}
