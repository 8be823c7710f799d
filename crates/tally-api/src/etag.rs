//! ETag computation for group history reports.
//!
//! A report is a pure function of the group's events (in store order) and the
//! query, so the ETag is a SHA-256 over exactly those inputs. Store order is
//! hashed as-is because it breaks timestamp ties in the replay.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tally_core::{HistoryQuery, event::GroupEvents};
use uuid::Uuid;

/// Compute a quoted ETag for the report of `events` narrowed by `query`.
pub fn compute_etag(events: &GroupEvents, query: &HistoryQuery) -> String {
  let mut hasher = Sha256::new();

  hasher.update(b"acknowledgements");
  for ack in &events.acknowledgements {
    stamp(&mut hasher, ack.acknowledgement_id, ack.created_at);
  }
  hasher.update(b"credit_transfers");
  for transfer in &events.credit_transfers {
    stamp(&mut hasher, transfer.transfer_id, transfer.created_at);
  }
  hasher.update(b"posts");
  for post in &events.posts {
    stamp(&mut hasher, post.post_id, post.created_at);
    match post.deleted_at {
      Some(at) => hasher.update(at.timestamp_micros().to_le_bytes()),
      None => hasher.update([0u8]),
    }
  }

  hasher.update(b"query");
  for id in &query.users {
    hasher.update(id.as_bytes());
  }
  hasher.update([u8::from(query.show_group)]);

  format!("\"{}\"", hex::encode(hasher.finalize()))
}

fn stamp(hasher: &mut Sha256, id: Uuid, at: DateTime<Utc>) {
  hasher.update(id.as_bytes());
  hasher.update(at.timestamp_micros().to_le_bytes());
}

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Accepts `*`, comma-separated lists, weak validators and bare (unquoted)
/// tags.
pub fn if_none_match(header: &str, etag: &str) -> bool {
  let wanted = etag.trim_matches('"');
  header.split(',').map(str::trim).any(|candidate| {
    candidate == "*"
      || candidate.trim_start_matches("W/").trim_matches('"') == wanted
  })
}

#[cfg(test)]
mod tests {
  use chrono::{TimeDelta, TimeZone};
  use tally_core::{event::CreditTransfer, target::Target};

  use super::*;

  fn transfer(secs: i64) -> CreditTransfer {
    CreditTransfer {
      transfer_id: Uuid::new_v4(),
      group_id:    Uuid::nil(),
      sent_by:     Target::group(Uuid::nil(), "g"),
      sent_to:     Target::user(Uuid::new_v4(), "u"),
      amount:      TimeDelta::hours(1),
      created_at:  Utc.timestamp_opt(secs, 0).unwrap(),
    }
  }

  #[test]
  fn same_inputs_same_etag() {
    let events = GroupEvents { credit_transfers: vec![transfer(1)], ..Default::default() };
    let query = HistoryQuery::default();
    assert_eq!(compute_etag(&events, &query), compute_etag(&events.clone(), &query));
  }

  #[test]
  fn new_event_changes_etag() {
    let mut events = GroupEvents { credit_transfers: vec![transfer(1)], ..Default::default() };
    let query = HistoryQuery::default();
    let before = compute_etag(&events, &query);
    events.credit_transfers.push(transfer(2));
    assert_ne!(before, compute_etag(&events, &query));
  }

  #[test]
  fn query_is_part_of_the_etag() {
    let events = GroupEvents { credit_transfers: vec![transfer(1)], ..Default::default() };
    let plain = HistoryQuery::default();
    let grouped = HistoryQuery { show_group: true, ..Default::default() };
    assert_ne!(compute_etag(&events, &plain), compute_etag(&events, &grouped));
  }

  #[test]
  fn store_order_is_significant() {
    let (a, b) = (transfer(1), transfer(1));
    let ab = GroupEvents { credit_transfers: vec![a.clone(), b.clone()], ..Default::default() };
    let ba = GroupEvents { credit_transfers: vec![b, a], ..Default::default() };
    let query = HistoryQuery::default();
    assert_ne!(compute_etag(&ab, &query), compute_etag(&ba, &query));
  }

  #[test]
  fn if_none_match_forms() {
    let etag = "\"abc\"";
    assert!(if_none_match("\"abc\"", etag));
    assert!(if_none_match("abc", etag));
    assert!(if_none_match("W/\"abc\"", etag));
    assert!(if_none_match("\"x\", \"abc\"", etag));
    assert!(if_none_match("*", etag));
    assert!(!if_none_match("\"abd\"", etag));
  }
}
