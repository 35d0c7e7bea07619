//! SQL schema for the bequest SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per answer ever created. Rows are never deleted; a delete flips
-- status to 'Deleted'. values_json only ever grows.
CREATE TABLE IF NOT EXISTS answers (
    id          TEXT PRIMARY KEY,
    uid         TEXT NOT NULL UNIQUE,
    answer_key  TEXT NOT NULL,
    values_json TEXT NOT NULL,   -- JSON array of strings, oldest first
    status      TEXT NOT NULL,   -- 'Active' | 'Deleted'
    created_at  TEXT NOT NULL,   -- RFC 3339, fixed-width nanoseconds, UTC
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

-- Uniqueness only binds active answers, so a deleted key can be reused any
-- number of times.
CREATE UNIQUE INDEX IF NOT EXISTS answers_active_key_idx
    ON answers(answer_key) WHERE status = 'Active';

-- Audit events are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS events (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,   -- tie-break for equal created_at
    id          TEXT NOT NULL UNIQUE,
    uid         TEXT NOT NULL UNIQUE,
    event_type  TEXT NOT NULL,   -- 'create' | 'update' | 'delete'
    data_key    TEXT NOT NULL,
    data_value  TEXT NOT NULL,
    status      TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

CREATE INDEX IF NOT EXISTS events_key_created_idx
    ON events(data_key, status, created_at);

PRAGMA user_version = 1;
";
