//! Forward-only schema migration framework.
//!
//! Tracks the schema version in `schema_meta` and runs sequential migrations
//! to bring the database up to [`CURRENT_SCHEMA_VERSION`].

use rusqlite::Connection;

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

/// Update the stored schema version.
fn update_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Run any pending forward-only migrations.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let mut version = get_schema_version(conn)?;
    tracing::debug!(schema_version = version, target = CURRENT_SCHEMA_VERSION, "checking migrations");

    while version < CURRENT_SCHEMA_VERSION {
        let next = version + 1;
        tracing::info!(from = version, to = next, "running migration");

        match next {
            2 => migrate_v1_to_v2(conn)?,
            _ => {
                tracing::error!(version = next, "unknown migration target");
                break;
            }
        }

        update_schema_version(conn, next)?;
        version = next;
    }

    Ok(())
}

/// Migration v1 → v2: rebuild the denormalized post counters from the
/// relations table. Databases written by the pre-transactional updater can
/// carry drifted counts; the rebuild is idempotent, so fresh databases pass
/// through unchanged.
fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    let repaired = crate::social::relations::rebuild_counters(conn)?;
    if repaired > 0 {
        tracing::warn!(posts = repaired, "repaired drifted reaction counters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        crate::db::schema::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn get_schema_version_returns_1_on_fresh_db() {
        let conn = test_db();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
    }

    #[test]
    fn run_migrations_reaches_current_version() {
        let conn = test_db();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = test_db();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn v2_repairs_drifted_counters() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO users (id, username, email, joined) VALUES ('u1', 'alice', 'a@x.io', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        // Post claims three likes but no relation rows back them
        conn.execute(
            "INSERT INTO posts (id, content, posted_by, posted_on, like_count)
             VALUES ('p1', 'hello', 'u1', '2026-01-01T00:00:00Z', 3)",
            [],
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let likes: i64 = conn
            .query_row("SELECT like_count FROM posts WHERE id = 'p1'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(likes, 0);
    }
}
