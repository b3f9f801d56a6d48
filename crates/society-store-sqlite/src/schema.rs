//! SQL schema for the society SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS society (
    id                 TEXT PRIMARY KEY,
    name               TEXT NOT NULL,
    description        TEXT,
    owner_uuid         TEXT NOT NULL,
    photo_url          TEXT NOT NULL,
    format_id          INTEGER NOT NULL,
    post_permission_id INTEGER NOT NULL,
    is_search          INTEGER NOT NULL,
    created_at         TEXT NOT NULL     -- RFC 3339 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS society_members (
    society_id     TEXT NOT NULL REFERENCES society(id),
    user_uuid      TEXT NOT NULL,
    role           INTEGER NOT NULL,    -- 1 owner | 2 admin | 3 moderator | other member
    payment_status INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (society_id, user_uuid)
);

CREATE TABLE IF NOT EXISTS members_requests (
    user_uuid  TEXT NOT NULL,
    society_id TEXT NOT NULL REFERENCES society(id),
    status_id  INTEGER NOT NULL,        -- 1 pending
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_uuid, society_id)
);

-- Tag links are only ever deactivated, never deleted, so this table has no
-- foreign key: its rows outlive the society they point at.
CREATE TABLE IF NOT EXISTS society_has_tags (
    society_id TEXT NOT NULL,
    tag_id     INTEGER NOT NULL,
    is_active  INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (society_id, tag_id)
);

CREATE INDEX IF NOT EXISTS society_members_user_idx ON society_members(user_uuid);

PRAGMA user_version = 1;
";
