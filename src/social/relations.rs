//! The relation store: user-to-post reaction records.
//!
//! One kind-tagged table backs all three reaction kinds. Each (kind, actor,
//! subject) pair holds at most one row — a reaction is a set-membership
//! fact, enforced by the unique index. Counter maintenance lives in
//! [`crate::social::toggle`]; this module only moves relation rows and
//! reports counts.

use rusqlite::{params, Connection, OptionalExtension};

use crate::social::error::SocialError;
use crate::social::types::{Post, Relation, RelationKind, User};
use crate::social::{posts, users};

/// True iff a relation of `kind` exists for the (actor, subject) pair.
pub fn exists(
    conn: &Connection,
    kind: RelationKind,
    actor_id: &str,
    subject_id: &str,
) -> Result<bool, SocialError> {
    let found: Option<String> = conn
        .query_row(
            "SELECT id FROM relations WHERE kind = ?1 AND actor_id = ?2 AND subject_id = ?3",
            params![kind.as_str(), actor_id, subject_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Look up the single relation record for the pair, if present.
pub fn find(
    conn: &Connection,
    kind: RelationKind,
    actor_id: &str,
    subject_id: &str,
) -> Result<Option<Relation>, SocialError> {
    let relation = conn
        .query_row(
            "SELECT id, kind, actor_id, subject_id, created_at FROM relations
             WHERE kind = ?1 AND actor_id = ?2 AND subject_id = ?3",
            params![kind.as_str(), actor_id, subject_id],
            relation_from_row,
        )
        .optional()?;
    Ok(relation)
}

/// Create the relation record for the pair.
///
/// Fails with [`SocialError::DuplicateRelation`] if the pair already has one.
pub fn insert(
    conn: &Connection,
    kind: RelationKind,
    actor_id: &str,
    subject_id: &str,
) -> Result<Relation, SocialError> {
    let id = uuid::Uuid::now_v7().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();

    match conn.execute(
        "INSERT INTO relations (id, kind, actor_id, subject_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, kind.as_str(), actor_id, subject_id, created_at],
    ) {
        Ok(_) => Ok(Relation {
            id,
            kind,
            actor_id: actor_id.to_string(),
            subject_id: subject_id.to_string(),
            created_at,
        }),
        Err(e) if SocialError::is_unique_violation(&e) => Err(SocialError::DuplicateRelation),
        Err(e) => Err(e.into()),
    }
}

/// Delete the relation record for the pair. Returns `true` if a row was
/// removed; an absent pair is a no-op, not an error.
pub fn remove(
    conn: &Connection,
    kind: RelationKind,
    actor_id: &str,
    subject_id: &str,
) -> Result<bool, SocialError> {
    let removed = conn.execute(
        "DELETE FROM relations WHERE kind = ?1 AND actor_id = ?2 AND subject_id = ?3",
        params![kind.as_str(), actor_id, subject_id],
    )?;
    Ok(removed > 0)
}

/// Bulk-delete every relation of `kind` held by an actor. Returns the number
/// of rows removed. Counter fixup is the caller's job (see
/// [`crate::social::users::delete_user`]).
pub fn remove_all_by_actor(
    conn: &Connection,
    kind: RelationKind,
    actor_id: &str,
) -> Result<usize, SocialError> {
    let removed = conn.execute(
        "DELETE FROM relations WHERE kind = ?1 AND actor_id = ?2",
        params![kind.as_str(), actor_id],
    )?;
    Ok(removed)
}

/// Atomically clear an actor's relations of `kind` with counter fixup on
/// every affected post.
pub fn clear_actor_relations(
    conn: &mut Connection,
    kind: RelationKind,
    actor_id: &str,
) -> Result<usize, SocialError> {
    let tx = conn.transaction()?;
    let removed = fixup_and_remove_by_actor(&tx, kind, actor_id)?;
    tx.commit()?;
    Ok(removed)
}

/// Decrement each affected post's counter, then bulk-delete the actor's
/// relations of `kind`. The single-decrement form is exact because each
/// (kind, actor, subject) pair holds at most one row. Callers supply the
/// transaction.
pub(crate) fn fixup_and_remove_by_actor(
    conn: &Connection,
    kind: RelationKind,
    actor_id: &str,
) -> Result<usize, SocialError> {
    let column = kind.counter_column();
    conn.execute(
        &format!(
            "UPDATE posts SET {column} = {column} - 1
             WHERE id IN (SELECT subject_id FROM relations
                          WHERE kind = ?1 AND actor_id = ?2)"
        ),
        params![kind.as_str(), actor_id],
    )?;
    remove_all_by_actor(conn, kind, actor_id)
}

/// Bulk-delete every relation of `kind` targeting a subject. Used when the
/// post itself goes away, so its counters go with it.
pub fn remove_all_by_subject(
    conn: &Connection,
    kind: RelationKind,
    subject_id: &str,
) -> Result<usize, SocialError> {
    let removed = conn.execute(
        "DELETE FROM relations WHERE kind = ?1 AND subject_id = ?2",
        params![kind.as_str(), subject_id],
    )?;
    Ok(removed)
}

/// `COUNT(*)` of relations of `kind` targeting a subject.
pub fn count_by_subject(
    conn: &Connection,
    kind: RelationKind,
    subject_id: &str,
) -> Result<i64, SocialError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM relations WHERE kind = ?1 AND subject_id = ?2",
        params![kind.as_str(), subject_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// The users who hold a relation of `kind` to a subject ("who liked this
/// post"), oldest reaction first.
pub fn users_for_subject(
    conn: &Connection,
    kind: RelationKind,
    subject_id: &str,
) -> Result<Vec<User>, SocialError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM relations r JOIN users u ON u.id = r.actor_id
         WHERE r.kind = ?1 AND r.subject_id = ?2
         ORDER BY r.created_at, r.id",
        users::USER_COLUMNS_PREFIXED
    ))?;
    let rows = stmt
        .query_map(params![kind.as_str(), subject_id], users::user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The posts an actor holds a relation of `kind` to ("what did this user
/// bookmark"), newest reaction first.
pub fn posts_for_actor(
    conn: &Connection,
    kind: RelationKind,
    actor_id: &str,
) -> Result<Vec<Post>, SocialError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM relations r JOIN posts p ON p.id = r.subject_id
         WHERE r.kind = ?1 AND r.actor_id = ?2
         ORDER BY r.created_at DESC, r.id DESC",
        posts::POST_COLUMNS_PREFIXED
    ))?;
    let rows = stmt
        .query_map(params![kind.as_str(), actor_id], posts::post_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Recompute every post's cached reaction counters from the relations table.
/// Returns the number of posts whose counters actually changed. Idempotent.
pub fn rebuild_counters(conn: &Connection) -> rusqlite::Result<usize> {
    let mut repaired = 0;
    for kind in RelationKind::ALL {
        let column = kind.counter_column();
        repaired += conn.execute(
            &format!(
                "UPDATE posts SET {column} =
                     (SELECT COUNT(*) FROM relations
                      WHERE kind = ?1 AND subject_id = posts.id)
                 WHERE {column} <>
                     (SELECT COUNT(*) FROM relations
                      WHERE kind = ?1 AND subject_id = posts.id)"
            ),
            params![kind.as_str()],
        )?;
    }
    Ok(repaired)
}

fn relation_from_row(row: &rusqlite::Row) -> rusqlite::Result<Relation> {
    let kind: String = row.get(1)?;
    let kind = kind.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Relation {
        id: row.get(0)?,
        kind,
        actor_id: row.get(2)?,
        subject_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::social::{posts, users};

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    fn seed_user(conn: &Connection, username: &str) -> String {
        users::create_user(conn, users::NewUser::new(username, &format!("{username}@x.io")))
            .unwrap()
            .id
    }

    fn seed_post(conn: &Connection, author: &str, content: &str) -> String {
        posts::create_post(conn, author, posts::NewPost::new(content))
            .unwrap()
            .id
    }

    #[test]
    fn insert_then_exists() {
        let conn = test_db();
        let u = seed_user(&conn, "alice");
        let p = seed_post(&conn, &u, "hello");

        assert!(!exists(&conn, RelationKind::Like, &u, &p).unwrap());
        insert(&conn, RelationKind::Like, &u, &p).unwrap();
        assert!(exists(&conn, RelationKind::Like, &u, &p).unwrap());

        // Kinds are independent
        assert!(!exists(&conn, RelationKind::Bookmark, &u, &p).unwrap());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let conn = test_db();
        let u = seed_user(&conn, "alice");
        let p = seed_post(&conn, &u, "hello");

        insert(&conn, RelationKind::Bookmark, &u, &p).unwrap();
        let err = insert(&conn, RelationKind::Bookmark, &u, &p).unwrap_err();
        assert!(matches!(err, SocialError::DuplicateRelation));

        assert_eq!(count_by_subject(&conn, RelationKind::Bookmark, &p).unwrap(), 1);
    }

    #[test]
    fn remove_absent_pair_is_noop() {
        let conn = test_db();
        let u = seed_user(&conn, "alice");
        let p = seed_post(&conn, &u, "hello");

        assert!(!remove(&conn, RelationKind::Like, &u, &p).unwrap());
        insert(&conn, RelationKind::Like, &u, &p).unwrap();
        assert!(remove(&conn, RelationKind::Like, &u, &p).unwrap());
        assert!(!exists(&conn, RelationKind::Like, &u, &p).unwrap());
    }

    #[test]
    fn bulk_delete_by_actor_spares_other_actors() {
        let conn = test_db();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        let p1 = seed_post(&conn, &alice, "one");
        let p2 = seed_post(&conn, &alice, "two");

        insert(&conn, RelationKind::Like, &alice, &p1).unwrap();
        insert(&conn, RelationKind::Like, &alice, &p2).unwrap();
        insert(&conn, RelationKind::Like, &bob, &p1).unwrap();

        let removed = remove_all_by_actor(&conn, RelationKind::Like, &alice).unwrap();
        assert_eq!(removed, 2);
        assert!(!exists(&conn, RelationKind::Like, &alice, &p1).unwrap());
        assert!(exists(&conn, RelationKind::Like, &bob, &p1).unwrap());
    }

    #[test]
    fn populated_views_join_both_directions() {
        let conn = test_db();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        let p = seed_post(&conn, &alice, "hello");

        insert(&conn, RelationKind::Like, &alice, &p).unwrap();
        insert(&conn, RelationKind::Like, &bob, &p).unwrap();

        let who = users_for_subject(&conn, RelationKind::Like, &p).unwrap();
        let names: Vec<_> = who.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);

        let liked = posts_for_actor(&conn, RelationKind::Like, &bob).unwrap();
        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].id, p);
    }

    #[test]
    fn clear_actor_relations_fixes_counters() {
        let mut conn = test_db();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        let p = seed_post(&conn, &alice, "hello");

        crate::social::toggle::toggle(&mut conn, RelationKind::Like, &alice, &p).unwrap();
        crate::social::toggle::toggle(&mut conn, RelationKind::Like, &bob, &p).unwrap();

        let removed = clear_actor_relations(&mut conn, RelationKind::Like, &alice).unwrap();
        assert_eq!(removed, 1);

        let post = posts::find_post(&conn, &p).unwrap();
        assert_eq!(post.stats.likes, 1);
        assert_eq!(count_by_subject(&conn, RelationKind::Like, &p).unwrap(), 1);
    }

    #[test]
    fn rebuild_counters_fixes_drift() {
        let conn = test_db();
        let u = seed_user(&conn, "alice");
        let p = seed_post(&conn, &u, "hello");
        insert(&conn, RelationKind::Like, &u, &p).unwrap();

        // Drift the cache behind the store's back
        conn.execute("UPDATE posts SET like_count = 7 WHERE id = ?1", params![p])
            .unwrap();

        let repaired = rebuild_counters(&conn).unwrap();
        assert_eq!(repaired, 1);
        let post = posts::find_post(&conn, &p).unwrap();
        assert_eq!(post.stats.likes, 1);

        // Second pass has nothing to do
        assert_eq!(rebuild_counters(&conn).unwrap(), 0);
    }
}
