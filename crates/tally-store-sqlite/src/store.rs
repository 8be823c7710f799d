//! [`SqliteStore`]: the SQLite implementation of [`EventSource`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use tally_core::{
  event::{Acknowledgement, CreditTransfer, Post},
  store::EventSource,
};

use crate::{
  Error, Result,
  encode::{
    RawAcknowledgement, RawCreditTransfer, RawPost, encode_amount, encode_dt, encode_target,
    encode_uuid,
  },
  record::{NewAcknowledgement, NewCreditTransfer, NewPost},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally event store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  pub async fn record_acknowledgement(&self, input: NewAcknowledgement) -> Result<Acknowledgement> {
    let ack = Acknowledgement {
      acknowledgement_id: Uuid::new_v4(),
      group_id:           input.group_id,
      sent_by:            input.sent_by,
      sent_to:            input.sent_to,
      kind:               input.kind,
      notes:              input.notes,
      created_at:         input.created_at.unwrap_or_else(Utc::now),
    };

    let id_str                    = encode_uuid(ack.acknowledgement_id);
    let group_str                 = encode_uuid(ack.group_id);
    let (by_kind, by_id, by_link) = encode_target(&ack.sent_by);
    let (to_kind, to_id, to_link) = encode_target(&ack.sent_to);
    let kind_str                  = ack.kind.as_str();
    let notes                     = ack.notes.clone();
    let at_str                    = encode_dt(ack.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO acknowledgements (
             acknowledgement_id, group_id,
             sent_by_kind, sent_by_id, sent_by_link,
             sent_to_kind, sent_to_id, sent_to_link,
             type, notes, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str, group_str, by_kind, by_id, by_link, to_kind, to_id, to_link, kind_str, notes,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    debug!(
      acknowledgement_id = %ack.acknowledgement_id,
      group_id = %ack.group_id,
      "recorded acknowledgement"
    );
    Ok(ack)
  }

  pub async fn record_credit_transfer(&self, input: NewCreditTransfer) -> Result<CreditTransfer> {
    let transfer = CreditTransfer {
      transfer_id: Uuid::new_v4(),
      group_id:    input.group_id,
      sent_by:     input.sent_by,
      sent_to:     input.sent_to,
      amount:      input.amount,
      created_at:  input.created_at.unwrap_or_else(Utc::now),
    };

    let id_str                    = encode_uuid(transfer.transfer_id);
    let group_str                 = encode_uuid(transfer.group_id);
    let (by_kind, by_id, by_link) = encode_target(&transfer.sent_by);
    let (to_kind, to_id, to_link) = encode_target(&transfer.sent_to);
    let amount                    = encode_amount(transfer.amount);
    let at_str                    = encode_dt(transfer.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO credit_transfers (
             transfer_id, group_id,
             sent_by_kind, sent_by_id, sent_by_link,
             sent_to_kind, sent_to_id, sent_to_link,
             amount_seconds, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str, group_str, by_kind, by_id, by_link, to_kind, to_id, to_link, amount, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    debug!(
      transfer_id = %transfer.transfer_id,
      group_id = %transfer.group_id,
      "recorded credit transfer"
    );
    Ok(transfer)
  }

  pub async fn create_post(&self, input: NewPost) -> Result<Post> {
    let post = Post {
      post_id:     Uuid::new_v4(),
      group_id:    input.group_id,
      author_id:   input.author_id,
      author_link: input.author_link,
      link:        input.link,
      post_type:   input.post_type,
      created_at:  input.created_at.unwrap_or_else(Utc::now),
      deleted_at:  None,
    };

    let id_str      = encode_uuid(post.post_id);
    let group_str   = encode_uuid(post.group_id);
    let author_str  = encode_uuid(post.author_id);
    let author_link = post.author_link.clone();
    let link        = post.link.clone();
    let type_str    = post.post_type.as_str();
    let at_str      = encode_dt(post.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (
             post_id, group_id, author_id, author_link, link, post_type, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, group_str, author_str, author_link, link, type_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(post_id = %post.post_id, group_id = %post.group_id, "created post");
    Ok(post)
  }

  /// Soft-delete a post. The row stays so the history can still show when
  /// the post was added and removed.
  ///
  /// The update is guarded on `deleted_at IS NULL`, so of two concurrent
  /// deletes exactly one succeeds.
  pub async fn delete_post(&self, post_id: Uuid, at: DateTime<Utc>) -> Result<()> {
    let id_str = encode_uuid(post_id);
    let at_str = encode_dt(at);

    // `(updated, exists)`, read in the same call as the update.
    let (updated, exists) = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE posts SET deleted_at = ?2 WHERE post_id = ?1 AND deleted_at IS NULL",
          rusqlite::params![id_str, at_str],
        )?;
        let exists = updated > 0
          || conn
            .query_row("SELECT 1 FROM posts WHERE post_id = ?1", rusqlite::params![id_str], |_| {
              Ok(())
            })
            .optional()?
            .is_some();
        Ok((updated, exists))
      })
      .await?;

    match (updated, exists) {
      (_, false) => Err(Error::PostNotFound(post_id)),
      (0, true) => Err(Error::AlreadyDeleted(post_id)),
      _ => {
        debug!(%post_id, "deleted post");
        Ok(())
      }
    }
  }
}

// ─── EventSource impl ────────────────────────────────────────────────────────

impl EventSource for SqliteStore {
  type Error = Error;

  async fn acknowledgements(&self, group_id: Uuid) -> Result<Vec<Acknowledgement>> {
    let group_str = encode_uuid(group_id);

    let raws: Vec<RawAcknowledgement> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             acknowledgement_id, group_id,
             sent_by_kind, sent_by_id, sent_by_link,
             sent_to_kind, sent_to_id, sent_to_link,
             type, notes, created_at
           FROM acknowledgements
           WHERE group_id = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![group_str], |row| {
            Ok(RawAcknowledgement {
              acknowledgement_id: row.get(0)?,
              group_id:           row.get(1)?,
              sent_by_kind:       row.get(2)?,
              sent_by_id:         row.get(3)?,
              sent_by_link:       row.get(4)?,
              sent_to_kind:       row.get(5)?,
              sent_to_id:         row.get(6)?,
              sent_to_link:       row.get(7)?,
              kind:               row.get(8)?,
              notes:              row.get(9)?,
              created_at:         row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAcknowledgement::into_acknowledgement).collect()
  }

  async fn credit_transfers(&self, group_id: Uuid) -> Result<Vec<CreditTransfer>> {
    let group_str = encode_uuid(group_id);

    let raws: Vec<RawCreditTransfer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             transfer_id, group_id,
             sent_by_kind, sent_by_id, sent_by_link,
             sent_to_kind, sent_to_id, sent_to_link,
             amount_seconds, created_at
           FROM credit_transfers
           WHERE group_id = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![group_str], |row| {
            Ok(RawCreditTransfer {
              transfer_id:    row.get(0)?,
              group_id:       row.get(1)?,
              sent_by_kind:   row.get(2)?,
              sent_by_id:     row.get(3)?,
              sent_by_link:   row.get(4)?,
              sent_to_kind:   row.get(5)?,
              sent_to_id:     row.get(6)?,
              sent_to_link:   row.get(7)?,
              amount_seconds: row.get(8)?,
              created_at:     row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCreditTransfer::into_credit_transfer).collect()
  }

  async fn posts(&self, group_id: Uuid, include_deleted: bool) -> Result<Vec<Post>> {
    let group_str = encode_uuid(group_id);

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             post_id, group_id, author_id, author_link, link,
             post_type, created_at, deleted_at
           FROM posts
           WHERE group_id = ?1
             AND (?2 OR deleted_at IS NULL)
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![group_str, include_deleted], |row| {
            Ok(RawPost {
              post_id:     row.get(0)?,
              group_id:    row.get(1)?,
              author_id:   row.get(2)?,
              author_link: row.get(3)?,
              link:        row.get(4)?,
              post_type:   row.get(5)?,
              created_at:  row.get(6)?,
              deleted_at:  row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }
}
