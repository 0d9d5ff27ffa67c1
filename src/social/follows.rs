//! Follow edges between users.
//!
//! Following is idempotent: re-following an already-followed user reports
//! `already_following` instead of erroring, and unfollowing an unfollowed
//! user is a no-op. No counter is cached for follows.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::social::error::SocialError;
use crate::social::types::User;
use crate::social::users;

/// Result returned from a follow operation.
#[derive(Debug, Serialize)]
pub struct FollowResult {
    /// ID of the created (or existing) follow edge.
    pub id: String,
    /// `true` if the edge already existed.
    pub already_following: bool,
}

/// Record that `follower_id` follows `followed_id`.
pub fn follow(
    conn: &Connection,
    follower_id: &str,
    followed_id: &str,
) -> Result<FollowResult, SocialError> {
    if !users::exists(conn, follower_id)? {
        return Err(SocialError::UserNotFound(follower_id.to_string()));
    }
    if !users::exists(conn, followed_id)? {
        return Err(SocialError::UserNotFound(followed_id.to_string()));
    }

    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
            params![follower_id, followed_id],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(FollowResult {
            id,
            already_following: true,
        });
    }

    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO follows (id, follower_id, followed_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, follower_id, followed_id, chrono::Utc::now().to_rfc3339()],
    )?;

    Ok(FollowResult {
        id,
        already_following: false,
    })
}

/// Remove the follow edge. Returns `true` if one existed.
pub fn unfollow(
    conn: &Connection,
    follower_id: &str,
    followed_id: &str,
) -> Result<bool, SocialError> {
    let removed = conn.execute(
        "DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
        params![follower_id, followed_id],
    )?;
    Ok(removed > 0)
}

/// The users that `user_id` follows, oldest edge first.
pub fn following(conn: &Connection, user_id: &str) -> Result<Vec<User>, SocialError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM follows f JOIN users u ON u.id = f.followed_id
         WHERE f.follower_id = ?1
         ORDER BY f.created_at, f.id",
        users::USER_COLUMNS_PREFIXED
    ))?;
    let rows = stmt
        .query_map(params![user_id], users::user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The users following `user_id`, oldest edge first.
pub fn followers(conn: &Connection, user_id: &str) -> Result<Vec<User>, SocialError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM follows f JOIN users u ON u.id = f.follower_id
         WHERE f.followed_id = ?1
         ORDER BY f.created_at, f.id",
        users::USER_COLUMNS_PREFIXED
    ))?;
    let rows = stmt
        .query_map(params![user_id], users::user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Remove every edge touching a user, both directions. Account-deletion
/// cleanup.
pub fn remove_all_for_user(conn: &Connection, user_id: &str) -> Result<usize, SocialError> {
    let removed = conn.execute(
        "DELETE FROM follows WHERE follower_id = ?1 OR followed_id = ?1",
        params![user_id],
    )?;
    Ok(removed)
}
