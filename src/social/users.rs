//! User profile storage and transactional account deletion.
//!
//! Deleting an account is the one multi-table cascade in the system: the
//! user's reactions are removed with a counter fixup on every affected post
//! (the cached counts must keep matching the relation rows), then follows,
//! messages, posts, and finally the profile row, all in one transaction.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::social::error::SocialError;
use crate::social::types::{AccountType, RelationKind, User};
use crate::social::{follows, messages, relations};

pub(crate) const USER_COLUMNS: &str = "id, username, email, first_name, last_name, \
     profile_photo, header_image, account_type, biography, date_of_birth, joined";

pub(crate) const USER_COLUMNS_PREFIXED: &str =
    "u.id, u.username, u.email, u.first_name, u.last_name, \
     u.profile_photo, u.header_image, u.account_type, u.biography, u.date_of_birth, u.joined";

/// Payload for creating a user profile.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub header_image: Option<String>,
    #[serde(default)]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

impl NewUser {
    pub fn new(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            profile_photo: None,
            header_image: None,
            account_type: None,
            biography: None,
            date_of_birth: None,
        }
    }
}

/// Partial profile update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: Option<AccountType>,
    pub biography: Option<String>,
    pub date_of_birth: Option<String>,
}

/// Insert a new profile. Fails with [`SocialError::UsernameTaken`] if the
/// username is in use.
pub fn create_user(conn: &Connection, new: NewUser) -> Result<User, SocialError> {
    let id = uuid::Uuid::now_v7().to_string();
    let joined = chrono::Utc::now().to_rfc3339();
    let account_type = new.account_type.unwrap_or(AccountType::Personal);

    let inserted = conn.execute(
        "INSERT INTO users (id, username, email, first_name, last_name, profile_photo,
                            header_image, account_type, biography, date_of_birth, joined)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            id,
            new.username,
            new.email,
            new.first_name,
            new.last_name,
            new.profile_photo,
            new.header_image,
            account_type.as_str(),
            new.biography,
            new.date_of_birth,
            joined
        ],
    );
    match inserted {
        Ok(_) => {}
        Err(e) if SocialError::is_unique_violation(&e) => {
            return Err(SocialError::UsernameTaken(new.username));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user = %id, username = %new.username, "user created");

    Ok(User {
        id,
        username: new.username,
        email: new.email,
        first_name: new.first_name,
        last_name: new.last_name,
        profile_photo: new.profile_photo,
        header_image: new.header_image,
        account_type,
        biography: new.biography,
        date_of_birth: new.date_of_birth,
        joined,
    })
}

/// All users, by join order.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, SocialError> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY joined, id"))?;
    let rows = stmt
        .query_map([], user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_user(conn: &Connection, user_id: &str) -> Result<User, SocialError> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![user_id],
        user_from_row,
    )
    .optional()?
    .ok_or_else(|| SocialError::UserNotFound(user_id.to_string()))
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>, SocialError> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

pub fn exists(conn: &Connection, user_id: &str) -> Result<bool, SocialError> {
    let found: Option<String> = conn
        .query_row(
            "SELECT id FROM users WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Apply a partial profile update.
pub fn update_user(
    conn: &Connection,
    user_id: &str,
    update: UserUpdate,
) -> Result<User, SocialError> {
    let updated = conn.execute(
        "UPDATE users SET
             username = COALESCE(?1, username),
             email = COALESCE(?2, email),
             first_name = COALESCE(?3, first_name),
             last_name = COALESCE(?4, last_name),
             profile_photo = COALESCE(?5, profile_photo),
             header_image = COALESCE(?6, header_image),
             account_type = COALESCE(?7, account_type),
             biography = COALESCE(?8, biography),
             date_of_birth = COALESCE(?9, date_of_birth)
         WHERE id = ?10",
        params![
            update.username,
            update.email,
            update.first_name,
            update.last_name,
            update.profile_photo,
            update.header_image,
            update.account_type.map(|t| t.as_str()),
            update.biography,
            update.date_of_birth,
            user_id
        ],
    );
    match updated {
        Ok(0) => return Err(SocialError::UserNotFound(user_id.to_string())),
        Ok(_) => {}
        Err(e) if SocialError::is_unique_violation(&e) => {
            return Err(SocialError::UsernameTaken(
                update.username.unwrap_or_default(),
            ));
        }
        Err(e) => return Err(e.into()),
    }
    find_user(conn, user_id)
}

/// Delete an account and everything hanging off it.
///
/// Order matters: affected posts get their counters decremented while the
/// user's relation rows still exist, so the counter invariant holds at
/// commit. Each (kind, actor, subject) pair has at most one row, which is
/// what makes the single-decrement form exact.
pub fn delete_user(conn: &mut Connection, user_id: &str) -> Result<(), SocialError> {
    let tx = conn.transaction()?;

    if !exists(&tx, user_id)? {
        return Err(SocialError::UserNotFound(user_id.to_string()));
    }

    // 1. The user's outgoing reactions, with counter fixup first
    for kind in RelationKind::ALL {
        relations::fixup_and_remove_by_actor(&tx, kind, user_id)?;
    }

    // 2. Incoming reactions on the user's own posts (their counters die with
    //    the rows), then the posts themselves
    let authored: Vec<String> = {
        let mut stmt = tx.prepare("SELECT id FROM posts WHERE posted_by = ?1")?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        ids
    };
    for post_id in &authored {
        for kind in RelationKind::ALL {
            relations::remove_all_by_subject(&tx, kind, post_id)?;
        }
    }
    tx.execute("DELETE FROM posts WHERE posted_by = ?1", params![user_id])?;

    // 3. Follow edges and messages, both directions
    follows::remove_all_for_user(&tx, user_id)?;
    messages::delete_all_sent(&tx, user_id)?;
    messages::delete_all_received(&tx, user_id)?;

    // 4. The profile row
    tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;

    tx.commit()?;
    tracing::info!(user = %user_id, posts = authored.len(), "user deleted");
    Ok(())
}

pub(crate) fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let account_type: String = row.get(7)?;
    let account_type = account_type.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        profile_photo: row.get(5)?,
        header_image: row.get(6)?,
        account_type,
        biography: row.get(8)?,
        date_of_birth: row.get(9)?,
        joined: row.get(10)?,
    })
}
