//! The `EventSource` trait: read access to a group's recorded events.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! The history engine depends on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::event::{Acknowledgement, CreditTransfer, GroupEvents, Post};

/// Read-only access to the three event collections of a group.
///
/// Each method returns events in the order they were recorded; the history
/// timeline uses that order to break timestamp ties.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EventSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All acknowledgements exchanged within `group_id`.
  fn acknowledgements(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Acknowledgement>, Self::Error>> + Send + '_;

  /// All credit transfers within `group_id`.
  fn credit_transfers(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CreditTransfer>, Self::Error>> + Send + '_;

  /// Posts in `group_id`; soft-deleted posts only if `include_deleted`.
  fn posts(
    &self,
    group_id: Uuid,
    include_deleted: bool,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;
}

impl GroupEvents {
  /// Fetch everything the history engine needs for `group_id`.
  ///
  /// Errors from the source are returned unchanged; there is no retry.
  pub async fn fetch<S: EventSource>(
    source: &S,
    group_id: Uuid,
  ) -> Result<Self, S::Error> {
    let acknowledgements = source.acknowledgements(group_id).await?;
    let credit_transfers = source.credit_transfers(group_id).await?;
    let posts = source.posts(group_id, true).await?;
    Ok(Self { acknowledgements, credit_transfers, posts })
  }
}
