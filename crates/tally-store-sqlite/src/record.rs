//! Inputs to the [`SqliteStore`](crate::SqliteStore) write path.
//!
//! Ids are always assigned by the store. `created_at` may be supplied (for
//! imports of historical data) and otherwise defaults to the time of the write.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tally_core::{
  event::{AcknowledgementType, PostType},
  target::Target,
};
use uuid::Uuid;

/// Input to [`SqliteStore::record_acknowledgement`](crate::SqliteStore::record_acknowledgement).
#[derive(Debug, Clone, Deserialize)]
pub struct NewAcknowledgement {
  pub group_id:   Uuid,
  pub sent_by:    Target,
  pub sent_to:    Target,
  #[serde(rename = "type")]
  pub kind:       AcknowledgementType,
  #[serde(default)]
  pub notes:      Option<String>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

impl NewAcknowledgement {
  pub fn new(group_id: Uuid, sent_by: Target, sent_to: Target, kind: AcknowledgementType) -> Self {
    Self { group_id, sent_by, sent_to, kind, notes: None, created_at: None }
  }

  pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
    self.notes = Some(notes.into());
    self
  }

  pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
    self.created_at = Some(created_at);
    self
  }
}

/// Input to [`SqliteStore::record_credit_transfer`](crate::SqliteStore::record_credit_transfer).
#[derive(Debug, Clone, Deserialize)]
pub struct NewCreditTransfer {
  pub group_id:   Uuid,
  pub sent_by:    Target,
  pub sent_to:    Target,
  #[serde(with = "tally_core::duration::seconds")]
  pub amount:     TimeDelta,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

impl NewCreditTransfer {
  pub fn new(group_id: Uuid, sent_by: Target, sent_to: Target, amount: TimeDelta) -> Self {
    Self { group_id, sent_by, sent_to, amount, created_at: None }
  }

  pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
    self.created_at = Some(created_at);
    self
  }
}

/// Input to [`SqliteStore::create_post`](crate::SqliteStore::create_post).
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
  pub group_id:    Uuid,
  pub author_id:   Uuid,
  pub author_link: String,
  pub link:        String,
  pub post_type:   PostType,
  #[serde(default)]
  pub created_at:  Option<DateTime<Utc>>,
}

impl NewPost {
  pub fn new(
    group_id: Uuid,
    author_id: Uuid,
    author_link: impl Into<String>,
    link: impl Into<String>,
    post_type: PostType,
  ) -> Self {
    Self {
      group_id,
      author_id,
      author_link: author_link.into(),
      link: link.into(),
      post_type,
      created_at: None,
    }
  }

  pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
    self.created_at = Some(created_at);
    self
  }
}
