//! Encoding and decoding helpers between the event types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings and credit amounts as signed whole seconds. Enums use their
//! `as_str` names; an unrecognised name is a decode error.

use chrono::{DateTime, TimeDelta, Utc};
use tally_core::{
  event::{Acknowledgement, AcknowledgementType, CreditTransfer, Post, PostType},
  target::{Target, TargetKind},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Credits ─────────────────────────────────────────────────────────────────

pub fn encode_amount(amount: TimeDelta) -> i64 { amount.num_seconds() }

pub fn decode_amount(secs: i64) -> Result<TimeDelta> {
  TimeDelta::try_seconds(secs).ok_or(Error::AmountOutOfRange(secs))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_target_kind(s: &str) -> Result<TargetKind> {
  s.parse().map_err(|_| Error::UnknownTargetKind(s.to_owned()))
}

pub fn decode_ack_type(s: &str) -> Result<AcknowledgementType> {
  s.parse().map_err(|_| Error::UnknownAcknowledgementType(s.to_owned()))
}

pub fn decode_post_type(s: &str) -> Result<PostType> {
  s.parse().map_err(|_| Error::UnknownPostType(s.to_owned()))
}

// ─── Target ──────────────────────────────────────────────────────────────────

/// A target split into its `(kind, id, link)` columns.
pub fn encode_target(t: &Target) -> (&'static str, String, String) {
  (t.kind.as_str(), encode_uuid(t.id), t.link.clone())
}

pub fn decode_target(kind: &str, id: &str, link: String) -> Result<Target> {
  Ok(Target { kind: decode_target_kind(kind)?, id: decode_uuid(id)?, link })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `acknowledgements` row.
pub struct RawAcknowledgement {
  pub acknowledgement_id: String,
  pub group_id:           String,
  pub sent_by_kind:       String,
  pub sent_by_id:         String,
  pub sent_by_link:       String,
  pub sent_to_kind:       String,
  pub sent_to_id:         String,
  pub sent_to_link:       String,
  pub kind:               String,
  pub notes:              Option<String>,
  pub created_at:         String,
}

impl RawAcknowledgement {
  pub fn into_acknowledgement(self) -> Result<Acknowledgement> {
    Ok(Acknowledgement {
      acknowledgement_id: decode_uuid(&self.acknowledgement_id)?,
      group_id:           decode_uuid(&self.group_id)?,
      sent_by:            decode_target(&self.sent_by_kind, &self.sent_by_id, self.sent_by_link)?,
      sent_to:            decode_target(&self.sent_to_kind, &self.sent_to_id, self.sent_to_link)?,
      kind:               decode_ack_type(&self.kind)?,
      notes:              self.notes,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `credit_transfers` row.
pub struct RawCreditTransfer {
  pub transfer_id:    String,
  pub group_id:       String,
  pub sent_by_kind:   String,
  pub sent_by_id:     String,
  pub sent_by_link:   String,
  pub sent_to_kind:   String,
  pub sent_to_id:     String,
  pub sent_to_link:   String,
  pub amount_seconds: i64,
  pub created_at:     String,
}

impl RawCreditTransfer {
  pub fn into_credit_transfer(self) -> Result<CreditTransfer> {
    Ok(CreditTransfer {
      transfer_id: decode_uuid(&self.transfer_id)?,
      group_id:    decode_uuid(&self.group_id)?,
      sent_by:     decode_target(&self.sent_by_kind, &self.sent_by_id, self.sent_by_link)?,
      sent_to:     decode_target(&self.sent_to_kind, &self.sent_to_id, self.sent_to_link)?,
      amount:      decode_amount(self.amount_seconds)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `posts` row.
pub struct RawPost {
  pub post_id:     String,
  pub group_id:    String,
  pub author_id:   String,
  pub author_link: String,
  pub link:        String,
  pub post_type:   String,
  pub created_at:  String,
  pub deleted_at:  Option<String>,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      post_id:     decode_uuid(&self.post_id)?,
      group_id:    decode_uuid(&self.group_id)?,
      author_id:   decode_uuid(&self.author_id)?,
      author_link: self.author_link,
      link:        self.link,
      post_type:   decode_post_type(&self.post_type)?,
      created_at:  decode_dt(&self.created_at)?,
      deleted_at:  self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn target_columns_round_trip() {
    let target = Target::group(Uuid::new_v4(), "Garden");
    let (kind, id, link) = encode_target(&target);
    assert_eq!(kind, "group");
    assert_eq!(decode_target(kind, &id, link).unwrap(), target);
  }

  #[test]
  fn unknown_target_kind_is_rejected() {
    let err = decode_target("planet", &encode_uuid(Uuid::new_v4()), "x".into()).unwrap_err();
    assert!(matches!(err, Error::UnknownTargetKind(s) if s == "planet"));
  }

  #[test]
  fn enum_names_match_the_stored_columns() {
    assert_eq!(decode_ack_type("thanks-gift-service").unwrap(), AcknowledgementType::ThanksGiftService);
    assert_eq!(decode_post_type("request").unwrap(), PostType::Request);
    assert!(matches!(decode_post_type("Request"), Err(Error::UnknownPostType(_))));
    assert!(matches!(decode_ack_type("thanks"), Err(Error::UnknownAcknowledgementType(_))));
  }

  #[test]
  fn bad_timestamp_is_a_date_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
