//! SQL DDL for all roost tables.
//!
//! Defines the `users`, `posts`, `relations`, `follows`, `messages`, and
//! `schema_meta` tables. All DDL uses `IF NOT EXISTS` for idempotent
//! initialization.

use rusqlite::Connection;

/// All schema DDL statements for roost's core tables.
///
/// The `relations` table carries the three reaction kinds behind one
/// kind-tagged shape; `UNIQUE(kind, actor_id, subject_id)` makes each
/// relation a set-membership fact. The `posts` stat columns are caches of
/// `COUNT(*)` over `relations` and must only be written by the toggle
/// engine, account deletion, and counter repair.
const SCHEMA_SQL: &str = r#"
-- User profiles. Credentials live in the fronting auth service, not here.
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    first_name TEXT,
    last_name TEXT,
    profile_photo TEXT,
    header_image TEXT,
    account_type TEXT NOT NULL DEFAULT 'personal'
        CHECK(account_type IN ('personal','academic','professional')),
    biography TEXT,
    date_of_birth TEXT,
    joined TEXT NOT NULL
);

-- Posts with denormalized reaction counters
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    posted_by TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    posted_on TEXT NOT NULL,
    image TEXT,
    youtube TEXT,
    reply_count INTEGER NOT NULL DEFAULT 0 CHECK(reply_count >= 0),
    repost_count INTEGER NOT NULL DEFAULT 0 CHECK(repost_count >= 0),
    like_count INTEGER NOT NULL DEFAULT 0 CHECK(like_count >= 0),
    dislike_count INTEGER NOT NULL DEFAULT 0 CHECK(dislike_count >= 0),
    bookmark_count INTEGER NOT NULL DEFAULT 0 CHECK(bookmark_count >= 0)
);

CREATE INDEX IF NOT EXISTS idx_posts_posted_by ON posts(posted_by);
CREATE INDEX IF NOT EXISTS idx_posts_posted_on ON posts(posted_on);

-- User-to-post reactions (like/dislike/bookmark), one row per pair per kind
CREATE TABLE IF NOT EXISTS relations (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL CHECK(kind IN ('like','dislike','bookmark')),
    actor_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    subject_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    UNIQUE(kind, actor_id, subject_id)
);

CREATE INDEX IF NOT EXISTS idx_relations_subject ON relations(kind, subject_id);
CREATE INDEX IF NOT EXISTS idx_relations_actor ON relations(kind, actor_id);

-- User-to-user follow edges
CREATE TABLE IF NOT EXISTS follows (
    id TEXT PRIMARY KEY,
    follower_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    followed_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    UNIQUE(follower_id, followed_id)
);

CREATE INDEX IF NOT EXISTS idx_follows_follower ON follows(follower_id);
CREATE INDEX IF NOT EXISTS idx_follows_followed ON follows(followed_id);

-- Direct messages
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    sender_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    recipient_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    body TEXT NOT NULL,
    sent_on TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages(sender_id);
CREATE INDEX IF NOT EXISTS idx_messages_recipient ON messages(recipient_id);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"posts".to_string()));
        assert!(tables.contains(&"relations".to_string()));
        assert!(tables.contains(&"follows".to_string()));
        assert!(tables.contains(&"messages".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn counters_reject_negative_values() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO users (id, username, email, joined) VALUES ('u1', 'alice', 'a@x.io', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO posts (id, content, posted_by, posted_on, like_count)
             VALUES ('p1', 'hello', 'u1', '2026-01-01T00:00:00Z', -1)",
            [],
        );
        assert!(result.is_err(), "negative counter must violate CHECK");
    }
}
