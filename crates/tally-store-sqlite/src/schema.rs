//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Targets are stored as three columns (`*_kind`, `*_id`, `*_link`). Reads
/// order by `rowid`, which is the insertion order the history timeline uses
/// to break timestamp ties.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS acknowledgements (
    acknowledgement_id TEXT PRIMARY KEY,
    group_id           TEXT NOT NULL,
    sent_by_kind       TEXT NOT NULL,   -- 'user' | 'group'
    sent_by_id         TEXT NOT NULL,
    sent_by_link       TEXT NOT NULL,
    sent_to_kind       TEXT NOT NULL,
    sent_to_id         TEXT NOT NULL,
    sent_to_link       TEXT NOT NULL,
    type               TEXT NOT NULL,   -- kebab-case AcknowledgementType
    notes              TEXT,
    created_at         TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS credit_transfers (
    transfer_id    TEXT PRIMARY KEY,
    group_id       TEXT NOT NULL,
    sent_by_kind   TEXT NOT NULL,
    sent_by_id     TEXT NOT NULL,
    sent_by_link   TEXT NOT NULL,
    sent_to_kind   TEXT NOT NULL,
    sent_to_id     TEXT NOT NULL,
    sent_to_link   TEXT NOT NULL,
    amount_seconds INTEGER NOT NULL,    -- signed
    created_at     TEXT NOT NULL
);

-- Posts are never removed; deletion only sets deleted_at.
CREATE TABLE IF NOT EXISTS posts (
    post_id     TEXT PRIMARY KEY,
    group_id    TEXT NOT NULL,
    author_id   TEXT NOT NULL,
    author_link TEXT NOT NULL,
    link        TEXT NOT NULL,
    post_type   TEXT NOT NULL,          -- 'offer' | 'request' | 'comment'
    created_at  TEXT NOT NULL,
    deleted_at  TEXT
);

CREATE INDEX IF NOT EXISTS acknowledgements_group_idx ON acknowledgements(group_id);
CREATE INDEX IF NOT EXISTS credit_transfers_group_idx ON credit_transfers(group_id);
CREATE INDEX IF NOT EXISTS posts_group_idx            ON posts(group_id);

PRAGMA user_version = 1;
";
