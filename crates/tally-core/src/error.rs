//! Error types for `tally-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A running credit balance left the range a `TimeDelta` can hold.
  #[error("credit balance overflow at transfer {transfer_id}")]
  CreditOverflow { transfer_id: Uuid },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
