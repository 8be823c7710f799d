//! Relevance and compression: narrows a replayed chain into report rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
  HistoryQuery,
  compare::RowComparer,
  row::{GroupRow, Row, RowChain, UserRow},
};

/// One line of a group history report.
///
/// A combined row stands for a stretch of hidden entries and has neither a
/// time nor a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRow {
  pub time:        Option<DateTime<Utc>>,
  pub description: Option<String>,
  /// Present only when the group aggregate was requested.
  pub group:       Option<GroupRow>,
  /// One row per requested user, in request order.
  pub users:       Vec<UserRow>,
}

impl DisplayRow {
  /// `row` narrowed to what `query` shows.
  fn shown(row: &Row, query: &HistoryQuery) -> Self {
    Self {
      time:        Some(row.time()),
      description: Some(row.description().to_owned()),
      ..Self::combined(row, query)
    }
  }

  /// `row` narrowed to what `query` shows, with time and description blanked.
  fn combined(row: &Row, query: &HistoryQuery) -> Self {
    Self {
      time:        None,
      description: None,
      group:       query.show_group.then(|| row.group().clone()),
      users:       query.users.iter().map(|&id| row.user_or_zero(id)).collect(),
    }
  }

  pub fn is_combined(&self) -> bool { self.time.is_none() }
}

/// Narrow `chain` to the rows `query` cares about, most recent first.
///
/// Rows that are not relevant to the query are skipped. When a relevant row
/// follows a run of skipped rows, the last skipped row is emitted as a
/// combined row in front of it unless it compares equal to the relevant row.
/// Rows before the first relevant row and after the last one are dropped.
pub fn filter_rows(chain: &RowChain, query: &HistoryQuery) -> Vec<DisplayRow> {
  let comparer = RowComparer::for_query(query);
  let mut out = Vec::new();
  let mut last_skipped: Option<&Row> = None;
  let mut seen_relevant = false;

  for row in chain {
    if query.is_relevant(row) {
      if let Some(skipped) = last_skipped.take()
        && !comparer.equal(skipped, row)
      {
        out.push(DisplayRow::combined(skipped, query));
      }
      out.push(DisplayRow::shown(row, query));
      seen_relevant = true;
    } else if seen_relevant {
      last_skipped = Some(row);
    }
  }

  out.reverse();
  out
}

#[cfg(test)]
mod tests {
  use chrono::{TimeDelta, TimeZone};
  use uuid::Uuid;

  use super::*;
  use crate::{
    event::{CreditTransfer, GroupEvents, Post, PostType},
    history::{replay::replay, timeline::build_timeline},
    target::Target,
  };

  fn at(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(secs, 0).unwrap() }

  struct Group {
    id:     Uuid,
    events: GroupEvents,
  }

  impl Group {
    fn new() -> Self { Self { id: Uuid::new_v4(), events: GroupEvents::default() } }

    fn transfer(&mut self, by: Target, to: Target, hours: i64, secs: i64) {
      self.events.credit_transfers.push(CreditTransfer {
        transfer_id: Uuid::new_v4(),
        group_id:    self.id,
        sent_by:     by,
        sent_to:     to,
        amount:      TimeDelta::hours(hours),
        created_at:  at(secs),
      });
    }

    fn offer(&mut self, author: Uuid, secs: i64) {
      self.events.posts.push(Post {
        post_id:     Uuid::new_v4(),
        group_id:    self.id,
        author_id:   author,
        author_link: "author".into(),
        link:        "post".into(),
        post_type:   PostType::Offer,
        created_at:  at(secs),
        deleted_at:  None,
      });
    }

    fn chain(&self, users: &[Uuid]) -> RowChain {
      replay(&build_timeline(&self.events), users).unwrap()
    }
  }

  fn user(id: Uuid) -> Target { Target::user(id, "u") }

  #[test]
  fn nothing_requested_shows_nothing() {
    let mut g = Group::new();
    let u = Uuid::new_v4();
    g.offer(u, 1);
    assert!(filter_rows(&g.chain(&[u]), &HistoryQuery::default()).is_empty());
  }

  #[test]
  fn output_is_most_recent_first() {
    let mut g = Group::new();
    let u = Uuid::new_v4();
    g.offer(u, 1);
    g.offer(u, 2);
    let query = HistoryQuery { users: vec![u], show_group: false };
    let rows = filter_rows(&g.chain(&[u]), &query);
    let times: Vec<_> = rows.iter().map(|r| r.time).collect();
    assert_eq!(times, vec![Some(at(2)), Some(at(1))]);
    assert_eq!(rows[0].users[0].tally.offer_count, 2);
  }

  #[test]
  fn narrowing_follows_request_order_and_hides_group() {
    let mut g = Group::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    g.transfer(user(a), user(b), 1, 1);
    let query = HistoryQuery { users: vec![b, a], show_group: false };
    let rows = filter_rows(&g.chain(&[a, b]), &query);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].group.is_none());
    let ids: Vec<_> = rows[0].users.iter().map(|u| u.user_id).collect();
    assert_eq!(ids, vec![b, a]);
    assert_eq!(rows[0].users[0].tally.credits, TimeDelta::hours(1));
  }

  #[test]
  fn group_flag_selects_group_rows() {
    let mut g = Group::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    g.transfer(user(a), user(b), 1, 1);
    g.transfer(Target::group(g.id, "g"), user(a), 2, 2);
    let query = HistoryQuery { users: vec![], show_group: true };
    let rows = filter_rows(&g.chain(&[a, b]), &query);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].group.as_ref().unwrap().credits, -TimeDelta::hours(2));
    assert!(rows[0].users.is_empty());
  }

  #[test]
  fn skipped_run_before_first_relevant_row_is_dropped() {
    let mut g = Group::new();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    g.transfer(user(b), user(c), 1, 1);
    g.transfer(user(b), user(c), 1, 2);
    g.offer(a, 3);
    let query = HistoryQuery { users: vec![a], show_group: false };
    let rows = filter_rows(&g.chain(&[a, b, c]), &query);
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_combined());
  }

  #[test]
  fn differing_skipped_run_becomes_one_combined_row() {
    let mut g = Group::new();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    g.offer(a, 1);
    g.transfer(user(b), user(c), 1, 2);
    g.transfer(user(b), user(c), 1, 3);
    g.transfer(user(b), user(c), 1, 4);
    g.transfer(user(c), user(a), 1, 5);
    let query = HistoryQuery { users: vec![a], show_group: false };
    let rows = filter_rows(&g.chain(&[a, b, c]), &query);

    // Newest first: transfer to a, combined, offer.
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].time, Some(at(5)));
    assert!(rows[1].is_combined());
    assert!(rows[1].description.is_none());
    assert_eq!(rows[1].users[0].tally.offer_count, 1);
    assert_eq!(rows[1].users[0].tally.credits, TimeDelta::zero());
    assert_eq!(rows[2].time, Some(at(1)));
  }

  #[test]
  fn equal_skipped_run_is_dropped() {
    let mut g = Group::new();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    g.offer(a, 1);
    g.transfer(user(b), user(c), 1, 2);
    // A self-transfer touches `a` without changing anything it shows.
    g.transfer(user(a), user(a), 1, 3);
    let query = HistoryQuery { users: vec![a], show_group: false };
    let rows = filter_rows(&g.chain(&[a, b, c]), &query);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| !r.is_combined()));
  }

  #[test]
  fn trailing_skipped_run_is_dropped() {
    let mut g = Group::new();
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    g.offer(a, 1);
    g.transfer(user(b), user(c), 1, 2);
    let query = HistoryQuery { users: vec![a], show_group: false };
    let rows = filter_rows(&g.chain(&[a, b, c]), &query);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].time, Some(at(1)));
  }

  #[test]
  fn unknown_user_reads_as_zero_everywhere() {
    let mut g = Group::new();
    let a = Uuid::new_v4();
    g.offer(a, 1);
    let ghost = Uuid::new_v4();
    let query = HistoryQuery { users: vec![ghost], show_group: true };
    let rows = filter_rows(&g.chain(&[a]), &query);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].users, vec![UserRow::zero(ghost)]);
  }
}
