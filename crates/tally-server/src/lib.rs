//! Application wiring for the Tally server binary.
//!
//! Kept out of `main.rs` so the router and the fixture import can be tested
//! without a listening socket.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tally_store_sqlite::{NewAcknowledgement, NewCreditTransfer, NewPost, SqliteStore};
use tower_http::trace::TraceLayer;
use tracing::info;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TALLY_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 7878 }

fn default_store_path() -> PathBuf { PathBuf::from("tally.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self { host: default_host(), port: default_port(), store_path: default_store_path() }
  }
}

impl ServerConfig {
  /// Load from an optional TOML file overlaid by `TALLY_*` variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("TALLY"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the JSON API under `/api`, with request tracing.
pub fn app(store: SqliteStore) -> Router {
  Router::new()
    .nest("/api", tally_api::api_router(Arc::new(store)))
    .layer(TraceLayer::new_for_http())
}

// ─── Import ───────────────────────────────────────────────────────────────────

/// A post as it appears in an import file; `deleted_at` is applied as a soft
/// delete right after the post is created.
#[derive(Debug, Deserialize)]
pub struct FixturePost {
  #[serde(flatten)]
  pub post:       NewPost,
  #[serde(default)]
  pub deleted_at: Option<DateTime<Utc>>,
}

/// The JSON document accepted by `server import`.
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
  #[serde(default)]
  pub acknowledgements: Vec<NewAcknowledgement>,
  #[serde(default)]
  pub credit_transfers: Vec<NewCreditTransfer>,
  #[serde(default)]
  pub posts:            Vec<FixturePost>,
}

/// How many records an import wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
  pub acknowledgements: usize,
  pub credit_transfers: usize,
  pub posts:            usize,
  pub deleted_posts:    usize,
}

/// Write every record of `fixture` into `store`, in file order.
pub async fn import(
  store: &SqliteStore,
  fixture: Fixture,
) -> tally_store_sqlite::Result<ImportSummary> {
  let mut summary = ImportSummary::default();

  for ack in fixture.acknowledgements {
    store.record_acknowledgement(ack).await?;
    summary.acknowledgements += 1;
  }
  for transfer in fixture.credit_transfers {
    store.record_credit_transfer(transfer).await?;
    summary.credit_transfers += 1;
  }
  for FixturePost { post, deleted_at } in fixture.posts {
    let post = store.create_post(post).await?;
    summary.posts += 1;
    if let Some(at) = deleted_at {
      store.delete_post(post.post_id, at).await?;
      summary.deleted_posts += 1;
    }
  }

  info!(
    acknowledgements = summary.acknowledgements,
    credit_transfers = summary.credit_transfers,
    posts = summary.posts,
    deleted_posts = summary.deleted_posts,
    "import complete"
  );
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tally_core::store::EventSource as _;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  fn fixture_json(group: Uuid, ann: Uuid) -> String {
    serde_json::json!({
      "acknowledgements": [{
        "group_id": group,
        "sent_by": { "kind": "group", "id": group, "link": "Garden" },
        "sent_to": { "kind": "user", "id": ann, "link": "Ann" },
        "type": "thanks-gift-service",
        "notes": "for the hedge",
        "created_at": "2024-03-01T10:00:00Z",
      }],
      "credit_transfers": [{
        "group_id": group,
        "sent_by": { "kind": "group", "id": group, "link": "Garden" },
        "sent_to": { "kind": "user", "id": ann, "link": "Ann" },
        "amount": 3600,
        "created_at": "2024-03-01T11:00:00Z",
      }],
      "posts": [{
        "group_id": group,
        "author_id": ann,
        "author_link": "Ann",
        "link": "Ladder",
        "post_type": "offer",
        "created_at": "2024-03-01T12:00:00Z",
        "deleted_at": "2024-03-02T12:00:00Z",
      }],
    })
    .to_string()
  }

  #[test]
  fn config_defaults_apply_to_an_empty_file() {
    let cfg: ServerConfig = config::Config::builder()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.address(), "127.0.0.1:7878");
  }

  #[test]
  fn config_reads_toml() {
    let cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from_str(
        "port = 9000\nstore_path = \"/tmp/t.db\"",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/t.db"));
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    let plain = Path::new("/var/tally.db");
    assert_eq!(expand_tilde(plain), plain);
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/t.db")), PathBuf::from(home).join("t.db"));
    }
  }

  #[tokio::test]
  async fn import_writes_every_record() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (group, ann) = (Uuid::new_v4(), Uuid::new_v4());
    let fixture: Fixture = serde_json::from_str(&fixture_json(group, ann)).unwrap();

    let summary = import(&store, fixture).await.unwrap();
    assert_eq!(summary, ImportSummary {
      acknowledgements: 1,
      credit_transfers: 1,
      posts:            1,
      deleted_posts:    1,
    });

    assert!(store.posts(group, false).await.unwrap().is_empty());
    let posts = store.posts(group, true).await.unwrap();
    assert!(posts[0].deleted_at.is_some());
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (group, ann) = (Uuid::new_v4(), Uuid::new_v4());
    let fixture: Fixture = serde_json::from_str(&fixture_json(group, ann)).unwrap();
    import(&store, fixture).await.unwrap();

    let req = Request::builder()
      .uri(format!("/api/groups/{group}/history?users={ann}"))
      .body(Body::empty())
      .unwrap();
    let resp = app(store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    // Thanks, transfer, offer added, offer removed.
    assert_eq!(body["rows"].as_array().unwrap().len(), 4);
    assert_eq!(body["rows"][0]["users"][0]["offer_count"], 0);

    let req = Request::builder().uri(format!("/groups/{group}/history")).body(Body::empty()).unwrap();
    let resp = app(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
