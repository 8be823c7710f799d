//! Core types and the group-history engine for Tally.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! replays a group's acknowledgements, credit transfers and posts into a
//! chain of snapshots and narrows that chain into a compact report.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod duration;
pub mod error;
pub mod event;
pub mod history;
pub mod store;
pub mod target;

pub use error::{Error, Result};
pub use history::{GroupHistory, GroupLedger, HistoryError, HistoryQuery, build_group_history};
