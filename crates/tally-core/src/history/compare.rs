//! Equivalence predicates used to decide whether two rows look the same
//! in a narrowed report.

use uuid::Uuid;

use super::{
  HistoryQuery,
  row::{GroupRow, Row, Tally, UserRow},
};

/// Field-wise equality of two user rows, ignoring the user id.
pub fn user_rows_equal(a: &UserRow, b: &UserRow) -> bool { a.tally == b.tally }

/// Field-wise equality of two group rows.
pub fn group_rows_equal(a: &GroupRow, b: &GroupRow) -> bool { a == b }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
  User(Uuid),
  Group,
}

/// A conjunction of per-user and group equality checks.
///
/// With no checks it degenerates to "always equal".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowComparer {
  checks: Vec<Check>,
}

impl RowComparer {
  /// A comparer that treats every pair of rows as equal.
  pub fn always() -> Self { Self::default() }

  /// Also require `user_id`'s rows to be equal.
  pub fn with_user(mut self, user_id: Uuid) -> Self {
    self.checks.push(Check::User(user_id));
    self
  }

  /// Also require the group rows to be equal.
  pub fn with_group(mut self) -> Self {
    self.checks.push(Check::Group);
    self
  }

  /// The comparer matching what `query` displays.
  pub fn for_query(query: &HistoryQuery) -> Self {
    let comparer = query
      .users
      .iter()
      .fold(Self::always(), |c, &id| c.with_user(id));
    if query.show_group { comparer.with_group() } else { comparer }
  }

  pub fn equal(&self, a: &Row, b: &Row) -> bool {
    self.checks.iter().all(|check| match *check {
      Check::User(id) => user_equal_in(a, b, id),
      Check::Group => group_rows_equal(a.group(), b.group()),
    })
  }
}

/// Compare `user_id` across two rows; a missing row reads as zero.
fn user_equal_in(a: &Row, b: &Row, user_id: Uuid) -> bool {
  match (a.user(user_id), b.user(user_id)) {
    (Some(x), Some(y)) => user_rows_equal(x, y),
    (None, None) => true,
    (Some(x), None) | (None, Some(x)) => x.tally == Tally::default(),
  }
}
