//! Event types: the raw, already-recorded history of a group.
//!
//! Events are immutable once loaded. The engine never validates them; it
//! only replays what the store hands back.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::target::Target;

// ─── Acknowledgements ────────────────────────────────────────────────────────

/// What an acknowledgement expresses. Everything except [`Other`] is a
/// kind of thanks; `Other` is a plain note.
///
/// [`Other`]: AcknowledgementType::Other
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AcknowledgementType {
  ThanksLentObject,
  ThanksGiftObject,
  ThanksGiftService,
  Other,
}

impl AcknowledgementType {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn is_thanks(self) -> bool { self != Self::Other }

  /// Human-readable wording of the thanks; empty for [`Self::Other`].
  pub fn wording(self) -> &'static str {
    match self {
      Self::ThanksLentObject => "Thanks for lending me an object",
      Self::ThanksGiftObject => "Thanks for the gift (object)",
      Self::ThanksGiftService => "Thanks for the gift (service)",
      Self::Other => "",
    }
  }
}

/// A thank-you or note sent between users and/or the group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgement {
  pub acknowledgement_id: Uuid,
  pub group_id:           Uuid,
  pub sent_by:            Target,
  pub sent_to:            Target,
  #[serde(rename = "type")]
  pub kind:               AcknowledgementType,
  pub notes:              Option<String>,
  pub created_at:         DateTime<Utc>,
}

impl Acknowledgement {
  /// Free-text notes, treating an empty string as absent.
  pub fn notes(&self) -> Option<&str> {
    self.notes.as_deref().filter(|n| !n.is_empty())
  }
}

// ─── Credit transfers ────────────────────────────────────────────────────────

/// Time credits moved from one target to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransfer {
  pub transfer_id: Uuid,
  pub group_id:    Uuid,
  pub sent_by:     Target,
  pub sent_to:     Target,
  /// Signed; a negative amount moves credit the other way.
  #[serde(with = "crate::duration::seconds")]
  pub amount:      TimeDelta,
  pub created_at:  DateTime<Utc>,
}

// ─── Posts ───────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PostType {
  Offer,
  Request,
  Comment,
}

impl PostType {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// An offer, request or comment posted in a group. Deletion is soft:
/// `deleted_at` is set and the row stays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub post_id:     Uuid,
  pub group_id:    Uuid,
  pub author_id:   Uuid,
  pub author_link: String,
  pub link:        String,
  pub post_type:   PostType,
  pub created_at:  DateTime<Utc>,
  pub deleted_at:  Option<DateTime<Utc>>,
}

// ─── Per-group bundle ────────────────────────────────────────────────────────

/// A user who appears anywhere in a group's events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  pub user_id: Uuid,
  pub link:    String,
}

/// Everything recorded for one group, in store order.
#[derive(Debug, Clone, Default)]
pub struct GroupEvents {
  pub acknowledgements: Vec<Acknowledgement>,
  pub credit_transfers: Vec<CreditTransfer>,
  /// Including soft-deleted posts.
  pub posts:            Vec<Post>,
}

impl GroupEvents {
  /// Every user observed in the events, in first-seen order
  /// (acknowledgements, then transfers, then posts).
  ///
  /// Comment authors are included even though comments never reach the
  /// timeline.
  pub fn participants(&self) -> Vec<Participant> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut push = |user_id: Uuid, link: &str| {
      if seen.insert(user_id) {
        out.push(Participant { user_id, link: link.to_owned() });
      }
    };

    let targets = self
      .acknowledgements
      .iter()
      .flat_map(|a| [&a.sent_by, &a.sent_to])
      .chain(self.credit_transfers.iter().flat_map(|c| [&c.sent_by, &c.sent_to]));
    for target in targets {
      if let Some(id) = target.user_id() {
        push(id, &target.link);
      }
    }
    for post in &self.posts {
      push(post.author_id, &post.author_link);
    }
    out
  }
}
