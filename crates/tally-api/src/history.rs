//! Handler for the group history report.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/groups/{id}/history` | `?users=<uuid>,<uuid>&show_group=true` |
//!
//! Responds with a [`GroupHistory`] and an `ETag`. A matching
//! `If-None-Match` yields `304 Not Modified` without replaying.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::Deserialize;
use tally_core::{
  GroupHistory, GroupLedger, HistoryQuery, event::GroupEvents, store::EventSource,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
  error::ApiError,
  etag::{compute_etag, if_none_match},
};

// ─── Query parameters ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
  /// Comma-separated user ids, in column order.
  pub users:      Option<String>,
  #[serde(default)]
  pub show_group: bool,
}

impl HistoryParams {
  /// Parse into a [`HistoryQuery`]. Blank entries are ignored; a repeated id
  /// keeps its first position.
  pub fn into_query(self) -> Result<HistoryQuery, ApiError> {
    let mut users: Vec<Uuid> = Vec::new();
    for raw in self.users.as_deref().unwrap_or_default().split(',') {
      let raw = raw.trim();
      if raw.is_empty() {
        continue;
      }
      let id = Uuid::parse_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("invalid user id {raw:?}: {e}")))?;
      if !users.contains(&id) {
        users.push(id);
      }
    }
    Ok(HistoryQuery { users, show_group: self.show_group })
  }
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `GET /groups/{id}/history`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<Uuid>,
  Query(params): Query<HistoryParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: EventSource,
{
  let query = params.into_query()?;

  let events = GroupEvents::fetch(store.as_ref(), group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let etag = compute_etag(&events, &query);
  if let Some(value) = headers.get(header::IF_NONE_MATCH)
    && let Ok(value) = value.to_str()
    && if_none_match(value, &etag)
  {
    debug!(%group_id, "history unchanged");
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  let history: GroupHistory = GroupLedger::new(group_id, &events)?.view(&query);
  Ok(([(header::ETAG, etag)], Json(history)).into_response())
}
