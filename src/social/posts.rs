//! Post storage and the cached-counter writer.
//!
//! [`bump_stat`] is the single way a reaction counter moves outside the
//! repair rebuild. It is an atomic in-place increment, so it composes with
//! the toggle transaction without a separate read, and it reports a missing
//! post instead of silently writing nothing.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::social::error::SocialError;
use crate::social::types::{Post, PostStats, RelationKind};
use crate::social::users;

pub(crate) const POST_COLUMNS: &str = "id, content, posted_by, posted_on, image, youtube, \
     reply_count, repost_count, like_count, dislike_count, bookmark_count";

pub(crate) const POST_COLUMNS_PREFIXED: &str =
    "p.id, p.content, p.posted_by, p.posted_on, p.image, p.youtube, \
     p.reply_count, p.repost_count, p.like_count, p.dislike_count, p.bookmark_count";

/// Payload for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub content: String,
    pub image: Option<String>,
    pub youtube: Option<String>,
}

impl NewPost {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            image: None,
            youtube: None,
        }
    }
}

/// Partial update payload; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostUpdate {
    pub content: Option<String>,
    pub image: Option<String>,
    pub youtube: Option<String>,
}

/// Insert a post authored by `user_id`.
pub fn create_post(conn: &Connection, user_id: &str, new: NewPost) -> Result<Post, SocialError> {
    if !users::exists(conn, user_id)? {
        return Err(SocialError::UserNotFound(user_id.to_string()));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let posted_on = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO posts (id, content, posted_by, posted_on, image, youtube)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, new.content, user_id, posted_on, new.image, new.youtube],
    )?;

    Ok(Post {
        id,
        content: new.content,
        posted_by: user_id.to_string(),
        posted_on,
        image: new.image,
        youtube: new.youtube,
        stats: PostStats::default(),
    })
}

/// All posts, newest first.
pub fn list_posts(conn: &Connection) -> Result<Vec<Post>, SocialError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POST_COLUMNS} FROM posts ORDER BY posted_on DESC, id DESC"
    ))?;
    let rows = stmt
        .query_map([], post_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Posts authored by one user, newest first.
pub fn posts_by_user(conn: &Connection, user_id: &str) -> Result<Vec<Post>, SocialError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE posted_by = ?1 ORDER BY posted_on DESC, id DESC"
    ))?;
    let rows = stmt
        .query_map(params![user_id], post_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_post(conn: &Connection, post_id: &str) -> Result<Post, SocialError> {
    conn.query_row(
        &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
        params![post_id],
        post_from_row,
    )
    .optional()?
    .ok_or_else(|| SocialError::PostNotFound(post_id.to_string()))
}

pub fn post_exists(conn: &Connection, post_id: &str) -> Result<bool, SocialError> {
    let found: Option<String> = conn
        .query_row(
            "SELECT id FROM posts WHERE id = ?1",
            params![post_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Apply a partial update to a post's content fields. Stats are not
/// reachable from here.
pub fn update_post(
    conn: &Connection,
    post_id: &str,
    update: PostUpdate,
) -> Result<Post, SocialError> {
    let changed = conn.execute(
        "UPDATE posts SET
             content = COALESCE(?1, content),
             image = COALESCE(?2, image),
             youtube = COALESCE(?3, youtube)
         WHERE id = ?4",
        params![update.content, update.image, update.youtube, post_id],
    )?;
    if changed == 0 {
        return Err(SocialError::PostNotFound(post_id.to_string()));
    }
    find_post(conn, post_id)
}

/// Delete a post and its relation records. The counters die with the row, so
/// no fixup is needed.
pub fn delete_post(conn: &mut Connection, post_id: &str) -> Result<(), SocialError> {
    let tx = conn.transaction()?;

    if !post_exists(&tx, post_id)? {
        return Err(SocialError::PostNotFound(post_id.to_string()));
    }

    for kind in RelationKind::ALL {
        crate::social::relations::remove_all_by_subject(&tx, kind, post_id)?;
    }
    tx.execute("DELETE FROM posts WHERE id = ?1", params![post_id])?;

    tx.commit()?;
    tracing::info!(post = %post_id, "post deleted");
    Ok(())
}

/// Atomically move a cached counter by `delta` and return the new value.
pub fn bump_stat(
    conn: &Connection,
    post_id: &str,
    kind: RelationKind,
    delta: i64,
) -> Result<i64, SocialError> {
    let column = kind.counter_column();
    let changed = conn.execute(
        &format!("UPDATE posts SET {column} = {column} + ?1 WHERE id = ?2"),
        params![delta, post_id],
    )?;
    if changed == 0 {
        return Err(SocialError::PostNotFound(post_id.to_string()));
    }
    let value = conn.query_row(
        &format!("SELECT {column} FROM posts WHERE id = ?1"),
        params![post_id],
        |row| row.get(0),
    )?;
    Ok(value)
}

pub(crate) fn post_from_row(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        content: row.get(1)?,
        posted_by: row.get(2)?,
        posted_on: row.get(3)?,
        image: row.get(4)?,
        youtube: row.get(5)?,
        stats: PostStats {
            replies: row.get(6)?,
            reposts: row.get(7)?,
            likes: row.get(8)?,
            dislikes: row.get(9)?,
            bookmarks: row.get(10)?,
        },
    })
}
