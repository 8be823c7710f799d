//! Group history: replays a group's events and narrows them into a report.
//!
//! The pipeline runs in two stages connected by an immutable [`RowChain`]:
//!
//! 1. [`timeline::build_timeline`] + [`replay::replay`] turn the raw events
//!    into one snapshot [`Row`](row::Row) per entry.
//! 2. [`filter::filter_rows`] picks the rows a [`HistoryQuery`] cares about
//!    and collapses the rest.
//!
//! [`GroupLedger`] keeps the result of stage 1 so several queries can be
//! answered without replaying again. Nothing here is persisted; every report
//! is recomputed from the source events.

pub mod compare;
pub mod filter;
pub mod replay;
pub mod row;
pub mod timeline;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
  event::{GroupEvents, Participant},
  store::EventSource,
};

pub use filter::DisplayRow;
pub use row::{GroupRow, Row, RowChain, Tally, UserRow};

// ─── Query ───────────────────────────────────────────────────────────────────

/// Which parts of the history a caller wants to see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
  /// Users to show, in column order.
  #[serde(default)]
  pub users:      Vec<Uuid>,
  /// Whether to show the group aggregate.
  #[serde(default)]
  pub show_group: bool,
}

impl HistoryQuery {
  /// A row is relevant if it changed the group (and the group is shown) or
  /// touched any requested user.
  pub fn is_relevant(&self, row: &Row) -> bool {
    (self.show_group && row.concerns_group()) || row.touches_any(&self.users)
  }
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// A participant, flagged if the query asked for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOption {
  pub user_id:  Uuid,
  pub link:     String,
  pub selected: bool,
}

/// A rendered-ready group history report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupHistory {
  pub group_id:   Uuid,
  pub show_group: bool,
  /// Every user seen in the group's events, for building a user picker.
  pub users:      Vec<UserOption>,
  /// Most recent first.
  pub rows:       Vec<DisplayRow>,
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// A group's replayed history, ready to be viewed through any query.
#[derive(Debug, Clone)]
pub struct GroupLedger {
  group_id:     Uuid,
  participants: Vec<Participant>,
  chain:        RowChain,
}

impl GroupLedger {
  /// Replay `events` once.
  pub fn new(group_id: Uuid, events: &GroupEvents) -> crate::Result<Self> {
    let participants = events.participants();
    let user_ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
    let timeline = timeline::build_timeline(events);
    let chain = replay::replay(&timeline, &user_ids)?;

    debug!(
      %group_id,
      entries = timeline.len(),
      users = user_ids.len(),
      "replayed group history"
    );

    Ok(Self { group_id, participants, chain })
  }

  /// Narrow the replayed chain to `query`.
  pub fn view(&self, query: &HistoryQuery) -> GroupHistory {
    let rows = filter::filter_rows(&self.chain, query);

    debug!(
      group_id = %self.group_id,
      replayed = self.chain.len(),
      shown = rows.len(),
      "filtered group history"
    );

    GroupHistory {
      group_id: self.group_id,
      show_group: query.show_group,
      users: self
        .participants
        .iter()
        .map(|p| UserOption {
          user_id:  p.user_id,
          link:     p.link.clone(),
          selected: query.users.contains(&p.user_id),
        })
        .collect(),
      rows,
    }
  }
}

/// Why [`build_group_history`] failed.
#[derive(Debug, Error)]
pub enum HistoryError<E> {
  /// The event source failed; its error is passed through unchanged.
  #[error(transparent)]
  Source(E),

  #[error(transparent)]
  Replay(#[from] crate::Error),
}

/// Fetch a group's events from `source`, replay them and narrow the result
/// to `query`.
pub async fn build_group_history<S: EventSource>(
  source: &S,
  group_id: Uuid,
  query: &HistoryQuery,
) -> Result<GroupHistory, HistoryError<S::Error>> {
  let events = GroupEvents::fetch(source, group_id).await.map_err(HistoryError::Source)?;
  Ok(GroupLedger::new(group_id, &events)?.view(query))
}
