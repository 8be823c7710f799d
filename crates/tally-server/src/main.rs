//! Tally server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite event store, and either serves the JSON API over HTTP or imports a
//! JSON fixture of events.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tally_server::{Fixture, ServerConfig, expand_tilde};
use tally_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tally group history server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API.
  Serve,
  /// Load acknowledgements, credit transfers and posts from a JSON file.
  Import {
    /// Path to the JSON fixture.
    file: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command {
    Command::Serve => {
      let app = tally_server::app(store);
      let address = server_cfg.address();

      info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }
    Command::Import { file } => {
      let raw = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("failed to read {file:?}"))?;
      let fixture: Fixture = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {file:?}"))?;

      let summary = tally_server::import(&store, fixture)
        .await
        .context("import failed")?;
      println!(
        "imported {} acknowledgements, {} credit transfers, {} posts ({} deleted)",
        summary.acknowledgements, summary.credit_transfers, summary.posts, summary.deleted_posts,
      );
    }
  }

  Ok(())
}
