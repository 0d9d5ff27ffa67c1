//! On-disk database lifecycle: creation, persistence across reopen, and
//! migration versioning.

use roost::db;
use roost::social::posts::{self, NewPost};
use roost::social::users::{self, NewUser};

#[test]
fn open_database_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("roost.db");

    let conn = db::open_database(&path).unwrap();
    assert!(path.exists());

    // WAL mode survives into the live connection
    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roost.db");

    let user_id = {
        let conn = db::open_database(&path).unwrap();
        let user = users::create_user(&conn, NewUser::new("alice", "alice@roost.test")).unwrap();
        posts::create_post(&conn, &user.id, NewPost::new("persistent post")).unwrap();
        user.id
    };

    let conn = db::open_database(&path).unwrap();
    let found = users::find_user(&conn, &user_id).unwrap();
    assert_eq!(found.username, "alice");
    assert_eq!(posts::posts_by_user(&conn, &user_id).unwrap().len(), 1);
}

#[test]
fn fresh_database_is_at_current_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let conn = db::open_database(dir.path().join("roost.db")).unwrap();

    let version = db::migrations::get_schema_version(&conn).unwrap();
    assert_eq!(version, db::migrations::CURRENT_SCHEMA_VERSION);
}
