//! SQLite backend for Tally's group events.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Reads implement
//! [`tally_core::store::EventSource`]; writes are append-only apart from the
//! soft delete of posts.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod record;

pub use error::{Error, Result};
pub use record::{NewAcknowledgement, NewCreditTransfer, NewPost};
pub use store::SqliteStore;
