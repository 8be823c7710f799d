//! Replay: folds the timeline into a chain of snapshot rows.

use uuid::Uuid;

use super::{
  row::{Row, RowChain, Tally},
  timeline::{CountedPost, Entry, EntryEvent, PostPhase},
};
use crate::{
  Error, Result,
  duration::format_credits,
  event::{Acknowledgement, CreditTransfer, Post},
  target::Target,
};

/// Replay `entries` in order, starting from a zero row seeded with one user
/// row per id in `user_ids`.
///
/// Row *i* is row *i - 1* with entry *i* applied. Earlier rows are never
/// modified, so the returned chain is a set of independent snapshots.
///
/// Fails only if a running credit balance leaves the range of
/// [`chrono::TimeDelta`].
pub fn replay(entries: &[Entry<'_>], user_ids: &[Uuid]) -> Result<RowChain> {
  let seed = Row::seed(user_ids);
  let mut rows: Vec<Row> = Vec::with_capacity(entries.len());

  for entry in entries {
    let previous = rows.last().unwrap_or(&seed);
    let mut row = previous.successor(entry.time);
    apply(&mut row, entry)?;
    rows.push(row);
  }

  Ok(RowChain::new(rows))
}

fn apply(row: &mut Row, entry: &Entry<'_>) -> Result<()> {
  match entry.event {
    EntryEvent::Acknowledgement(ack) => apply_acknowledgement(row, ack),
    EntryEvent::CreditTransfer(transfer) => apply_transfer(row, transfer)?,
    EntryEvent::Post { post, kind, phase } => apply_post(row, post, kind, phase),
  }
  Ok(())
}

/// The counters `target` refers to within `row`.
fn tally_for<'r>(row: &'r mut Row, target: &Target) -> &'r mut Tally {
  match target.user_id() {
    Some(user_id) => row.touch_user(user_id),
    None => row.group_mut(),
  }
}

fn apply_acknowledgement(row: &mut Row, ack: &Acknowledgement) {
  let object = if ack.kind.is_thanks() { "an acknowledgement" } else { "a note" };
  row.set_description(format!("{} sent {object} to {}", ack.sent_by, ack.sent_to));

  let wording = ack.kind.wording();
  let notes = ack.notes();

  let sender = tally_for(row, &ack.sent_by);
  if ack.kind.is_thanks() {
    sender.acknowledgements_sent = format!("Sent to {}: {wording}", ack.sent_to);
  }
  if let Some(notes) = notes {
    sender.note = format!("Sent to {}: {notes}", ack.sent_to);
  }

  let recipient = tally_for(row, &ack.sent_to);
  if ack.kind.is_thanks() {
    recipient.acknowledgements_received = format!("Received from {}: {wording}", ack.sent_by);
  }
  if let Some(notes) = notes {
    recipient.note = format!("Received from {}: {notes}", ack.sent_by);
  }
}

fn apply_transfer(row: &mut Row, transfer: &CreditTransfer) -> Result<()> {
  row.set_description(format!(
    "{} sent {} credits to {}",
    transfer.sent_by,
    format_credits(transfer.amount),
    transfer.sent_to,
  ));

  let overflow = || Error::CreditOverflow { transfer_id: transfer.transfer_id };

  let sender = tally_for(row, &transfer.sent_by);
  sender.credits = sender.credits.checked_sub(&transfer.amount).ok_or_else(overflow)?;
  let recipient = tally_for(row, &transfer.sent_to);
  recipient.credits = recipient.credits.checked_add(&transfer.amount).ok_or_else(overflow)?;
  Ok(())
}

fn apply_post(row: &mut Row, post: &Post, kind: CountedPost, phase: PostPhase) {
  let (verb, delta) = match phase {
    PostPhase::Created => ("added", 1),
    PostPhase::Deleted => ("removed", -1),
  };
  row.set_description(format!(
    "{} {verb} {} {}",
    post.author_link,
    kind.as_str(),
    post.link,
  ));

  row.group_mut().add_post(kind, delta);
  row.touch_user(post.author_id).add_post(kind, delta);
}
