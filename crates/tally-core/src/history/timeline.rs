//! Timeline: merges a group's three event sources into one ordered list.

use chrono::{DateTime, Utc};
use strum::IntoStaticStr;

use crate::event::{Acknowledgement, CreditTransfer, GroupEvents, Post, PostType};

/// Which side of a post's lifetime an entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostPhase {
  Created,
  Deleted,
}

/// A post type that moves an open-offer or open-request counter.
///
/// Comments never reach the timeline, so replay cannot see one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum CountedPost {
  Offer,
  Request,
}

impl CountedPost {
  pub fn of(post_type: PostType) -> Option<Self> {
    match post_type {
      PostType::Offer => Some(Self::Offer),
      PostType::Request => Some(Self::Request),
      PostType::Comment => None,
    }
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

/// The payload of an [`Entry`]. Borrows the source event.
#[derive(Debug, Clone, Copy)]
pub enum EntryEvent<'a> {
  Acknowledgement(&'a Acknowledgement),
  CreditTransfer(&'a CreditTransfer),
  Post {
    post:  &'a Post,
    kind:  CountedPost,
    phase: PostPhase,
  },
}

/// One timestamped step of the replay.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
  pub time:  DateTime<Utc>,
  pub event: EntryEvent<'a>,
}

/// Build the replay timeline for a group.
///
/// Entries are emitted acknowledgements first, then credit transfers, then
/// posts, each in store order, and then stably sorted by time. Equal
/// timestamps therefore keep that emission order.
///
/// Every offer or request yields a `Created` entry at its creation time; a
/// soft-deleted one also yields a single `Deleted` entry at its deletion
/// time, so its counters net to zero once the deletion is replayed.
pub fn build_timeline(events: &GroupEvents) -> Vec<Entry<'_>> {
  let mut entries = Vec::with_capacity(
    events.acknowledgements.len() + events.credit_transfers.len() + events.posts.len() * 2,
  );

  entries.extend(events.acknowledgements.iter().map(|a| Entry {
    time:  a.created_at,
    event: EntryEvent::Acknowledgement(a),
  }));

  entries.extend(events.credit_transfers.iter().map(|c| Entry {
    time:  c.created_at,
    event: EntryEvent::CreditTransfer(c),
  }));

  for post in &events.posts {
    let Some(kind) = CountedPost::of(post.post_type) else {
      continue;
    };
    entries.push(Entry {
      time:  post.created_at,
      event: EntryEvent::Post { post, kind, phase: PostPhase::Created },
    });
    if let Some(deleted_at) = post.deleted_at {
      entries.push(Entry {
        time:  deleted_at,
        event: EntryEvent::Post { post, kind, phase: PostPhase::Deleted },
      });
    }
  }

  // `sort_by_key` is stable.
  entries.sort_by_key(|e| e.time);
  entries
}
