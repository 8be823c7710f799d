//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown target kind: {0:?}")]
  UnknownTargetKind(String),

  #[error("unknown acknowledgement type: {0:?}")]
  UnknownAcknowledgementType(String),

  #[error("unknown post type: {0:?}")]
  UnknownPostType(String),

  #[error("credit amount out of range: {0}s")]
  AmountOutOfRange(i64),

  /// Attempted to delete a post that was never created.
  #[error("post not found: {0}")]
  PostNotFound(uuid::Uuid),

  #[error("post {0} is already deleted")]
  AlreadyDeleted(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
