//! SQL schema for the Dayflow SQLite store.
//!
//! Executed once at connection startup. Later changes ship as numbered
//! `.sql` files applied by [`crate::migrate`].

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per snapshot key; the value is always the full serialised state.
CREATE TABLE IF NOT EXISTS snapshots (
    key         TEXT PRIMARY KEY,
    value_json  TEXT NOT NULL,
    saved_at    TEXT NOT NULL     -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS tasks (
    task_id      TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    assignee_id  TEXT NOT NULL,
    created_by   TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'TODO'
                 CHECK (status IN ('TODO', 'IN_PROGRESS', 'DONE')),
    due_date     TEXT,             -- YYYY-MM-DD or NULL
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS task_comments (
    comment_id  TEXT PRIMARY KEY,
    task_id     TEXT NOT NULL REFERENCES tasks(task_id) ON DELETE CASCADE,
    author_id   TEXT NOT NULL,
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tasks_assignee_idx  ON tasks(assignee_id);
CREATE INDEX IF NOT EXISTS tasks_created_idx   ON tasks(created_at);
CREATE INDEX IF NOT EXISTS comments_task_idx   ON task_comments(task_id);

PRAGMA user_version = 1;
";
