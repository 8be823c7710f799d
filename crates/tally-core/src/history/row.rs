//! Snapshot rows produced by replay.
//!
//! A [`Row`] is the state of the group and of every known user immediately
//! after one timeline entry. Rows are built only by [`super::replay`] and are
//! read-only afterwards.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timeline::CountedPost;

// ─── Counter bundle ──────────────────────────────────────────────────────────

/// The running counters and per-entry texts tracked for the group and for
/// each user.
///
/// Counts and credits carry over from row to row. The three text fields
/// describe only the entry that produced the row and start empty in the
/// next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
  /// Open requests.
  pub request_count:             i64,
  /// Open offers.
  pub offer_count:               i64,
  /// Credit balance; may go negative.
  #[serde(with = "crate::duration::seconds")]
  pub credits:                   TimeDelta,
  pub note:                      String,
  pub acknowledgements_received: String,
  pub acknowledgements_sent:     String,
}

impl Default for Tally {
  fn default() -> Self {
    Self {
      request_count:             0,
      offer_count:               0,
      credits:                   TimeDelta::zero(),
      note:                      String::new(),
      acknowledgements_received: String::new(),
      acknowledgements_sent:     String::new(),
    }
  }
}

impl Tally {
  /// The counters carried into the next row, with the texts cleared.
  fn carried(&self) -> Self {
    Self {
      request_count: self.request_count,
      offer_count: self.offer_count,
      credits: self.credits,
      ..Self::default()
    }
  }

  pub(super) fn add_post(&mut self, kind: CountedPost, delta: i64) {
    match kind {
      CountedPost::Offer => self.offer_count += delta,
      CountedPost::Request => self.request_count += delta,
    }
  }
}

/// Aggregate state for the whole group.
pub type GroupRow = Tally;

/// State scoped to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
  pub user_id: Uuid,
  #[serde(flatten)]
  pub tally:   Tally,
}

impl UserRow {
  pub fn zero(user_id: Uuid) -> Self { Self { user_id, tally: Tally::default() } }
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// An immutable snapshot of the group and all known users.
#[derive(Debug, Clone)]
pub struct Row {
  time:           DateTime<Utc>,
  description:    String,
  group:          GroupRow,
  users:          Vec<UserRow>,
  index:          HashMap<Uuid, usize>,
  touched:        Vec<Uuid>,
  concerns_group: bool,
}

impl Row {
  /// The all-zero row replay starts from: one zero [`UserRow`] per id.
  pub(super) fn seed(user_ids: &[Uuid]) -> Self {
    let mut row = Self {
      time:           DateTime::<Utc>::MIN_UTC,
      description:    String::new(),
      group:          GroupRow::default(),
      users:          Vec::with_capacity(user_ids.len()),
      index:          HashMap::with_capacity(user_ids.len()),
      touched:        Vec::new(),
      concerns_group: false,
    };
    for &id in user_ids {
      row.user_tally_mut(id);
    }
    row
  }

  /// A fresh row for the entry at `time`, carrying this row's counters.
  ///
  /// `self` is left untouched; the returned row owns independent copies.
  pub(super) fn successor(&self, time: DateTime<Utc>) -> Self {
    Self {
      time,
      description: String::new(),
      group: self.group.carried(),
      users: self
        .users
        .iter()
        .map(|u| UserRow { user_id: u.user_id, tally: u.tally.carried() })
        .collect(),
      index: self.index.clone(),
      touched: Vec::new(),
      concerns_group: false,
    }
  }

  // ── Accessors ────────────────────────────────────────────────────────────

  pub fn time(&self) -> DateTime<Utc> { self.time }

  /// Human-readable description of the entry that produced this row.
  pub fn description(&self) -> &str { &self.description }

  pub fn group(&self) -> &GroupRow { &self.group }

  /// Every known user's row, in seed order.
  pub fn users(&self) -> &[UserRow] { &self.users }

  /// O(1) lookup of a user's row.
  pub fn user(&self, user_id: Uuid) -> Option<&UserRow> {
    self.index.get(&user_id).map(|&i| &self.users[i])
  }

  /// Users whose state this row's entry changed, in the order touched.
  pub fn touched_user_ids(&self) -> &[Uuid] { &self.touched }

  /// Whether this row's entry changed the group aggregate.
  pub fn concerns_group(&self) -> bool { self.concerns_group }

  pub fn touches_user(&self, user_id: Uuid) -> bool { self.touched.contains(&user_id) }

  pub fn touches_any(&self, user_ids: &[Uuid]) -> bool {
    user_ids.iter().any(|&id| self.touches_user(id))
  }

  /// `user_id`'s row, or a zero row if the user was never seen.
  pub fn user_or_zero(&self, user_id: Uuid) -> UserRow {
    self.user(user_id).cloned().unwrap_or_else(|| UserRow::zero(user_id))
  }

  // ── Mutation during replay ───────────────────────────────────────────────

  pub(super) fn set_description(&mut self, description: String) {
    self.description = description;
  }

  /// The group's counters, marking the row as concerning the group.
  pub(super) fn group_mut(&mut self) -> &mut GroupRow {
    self.concerns_group = true;
    &mut self.group
  }

  /// A user's counters, marking the user as touched.
  pub(super) fn touch_user(&mut self, user_id: Uuid) -> &mut Tally {
    if !self.touched.contains(&user_id) {
      self.touched.push(user_id);
    }
    self.user_tally_mut(user_id)
  }

  fn user_tally_mut(&mut self, user_id: Uuid) -> &mut Tally {
    let idx = match self.index.get(&user_id) {
      Some(&idx) => idx,
      None => {
        self.users.push(UserRow::zero(user_id));
        self.index.insert(user_id, self.users.len() - 1);
        self.users.len() - 1
      }
    };
    &mut self.users[idx].tally
  }
}

// ─── Chain ───────────────────────────────────────────────────────────────────

/// The ordered output of replay: exactly one [`Row`] per timeline entry.
///
/// Only shared access is offered, so the chain can be filtered any number of
/// times without being replayed again.
#[derive(Debug, Clone, Default)]
pub struct RowChain {
  rows: Vec<Row>,
}

impl RowChain {
  pub(super) fn new(rows: Vec<Row>) -> Self { Self { rows } }

  pub fn rows(&self) -> &[Row] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

impl<'a> IntoIterator for &'a RowChain {
  type Item = &'a Row;
  type IntoIter = std::slice::Iter<'a, Row>;

  fn into_iter(self) -> Self::IntoIter { self.rows.iter() }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn seed_has_one_zero_row_per_user() {
    let ids = [Uuid::new_v4(), Uuid::new_v4()];
    let row = Row::seed(&ids);
    assert_eq!(row.users().len(), 2);
    for id in ids {
      assert_eq!(row.user(id), Some(&UserRow::zero(id)));
    }
    assert!(row.touched_user_ids().is_empty());
    assert!(!row.concerns_group());
  }

  #[test]
  fn successor_carries_counters_but_not_texts() {
    let id = Uuid::new_v4();
    let mut row = Row::seed(&[id]);
    {
      let tally = row.touch_user(id);
      tally.add_post(CountedPost::Offer, 1);
      tally.credits = TimeDelta::hours(3);
      tally.note = "hello".into();
    }
    row.group_mut().acknowledgements_sent = "sent".into();

    let next = row.successor(Utc.timestamp_opt(100, 0).unwrap());
    let user = next.user(id).unwrap();
    assert_eq!(user.tally.offer_count, 1);
    assert_eq!(user.tally.credits, TimeDelta::hours(3));
    assert!(user.tally.note.is_empty());
    assert!(next.group().acknowledgements_sent.is_empty());
    assert!(!next.concerns_group());
    assert!(next.touched_user_ids().is_empty());
  }

  #[test]
  fn successor_does_not_alias_predecessor() {
    let id = Uuid::new_v4();
    let row = Row::seed(&[id]);
    let mut next = row.successor(Utc.timestamp_opt(1, 0).unwrap());
    next.touch_user(id).add_post(CountedPost::Request, 1);
    next.group_mut().add_post(CountedPost::Request, 1);

    assert_eq!(row.user(id).unwrap().tally.request_count, 0);
    assert_eq!(row.group().request_count, 0);
  }

  #[test]
  fn touching_twice_records_user_once() {
    let id = Uuid::new_v4();
    let mut row = Row::seed(&[id]);
    row.touch_user(id);
    row.touch_user(id);
    assert_eq!(row.touched_user_ids(), &[id]);
  }

  #[test]
  fn unknown_user_reads_as_zero() {
    let row = Row::seed(&[]);
    let id = Uuid::new_v4();
    assert!(row.user(id).is_none());
    assert_eq!(row.user_or_zero(id), UserRow::zero(id));
  }
}
