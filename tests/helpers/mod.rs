#![allow(dead_code)]

use roost::db;
use roost::social::posts::{self, NewPost};
use roost::social::users::{self, NewUser};
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// Insert a user with a generated email. Returns the user ID.
pub fn seed_user(conn: &Connection, username: &str) -> String {
    users::create_user(conn, NewUser::new(username, &format!("{username}@roost.test")))
        .unwrap()
        .id
}

/// Insert a post authored by `user_id`. Returns the post ID.
pub fn seed_post(conn: &Connection, user_id: &str, content: &str) -> String {
    posts::create_post(conn, user_id, NewPost::new(content))
        .unwrap()
        .id
}

/// The stored reaction counter for one post column.
pub fn read_counter(conn: &Connection, post_id: &str, column: &str) -> i64 {
    conn.query_row(
        &format!("SELECT {column} FROM posts WHERE id = ?1"),
        [post_id],
        |row| row.get(0),
    )
    .unwrap()
}

/// `COUNT(*)` over the relations table for one kind and subject.
pub fn count_relations(conn: &Connection, kind: &str, post_id: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM relations WHERE kind = ?1 AND subject_id = ?2",
        [kind, post_id],
        |row| row.get(0),
    )
    .unwrap()
}
