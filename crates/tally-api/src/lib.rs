//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::EventSource`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod etag;
pub mod history;

use std::sync::Arc;

use axum::{Router, routing::get};
use tally_core::store::EventSource;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: EventSource + 'static,
{
  Router::new()
    .route("/groups/{id}/history", get(history::handler::<S>))
    .with_state(store)
}
