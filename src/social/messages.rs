//! Direct messages between users.

use rusqlite::{params, Connection};
use serde::Deserialize;

use crate::social::error::SocialError;
use crate::social::types::Message;
use crate::social::users;

/// Payload for sending a message.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub body: String,
}

/// Send a message from `sender_id` to `recipient_id`.
pub fn send_message(
    conn: &Connection,
    sender_id: &str,
    recipient_id: &str,
    new: NewMessage,
) -> Result<Message, SocialError> {
    if !users::exists(conn, sender_id)? {
        return Err(SocialError::UserNotFound(sender_id.to_string()));
    }
    if !users::exists(conn, recipient_id)? {
        return Err(SocialError::UserNotFound(recipient_id.to_string()));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let sent_on = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO messages (id, sender_id, recipient_id, body, sent_on)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, sender_id, recipient_id, new.body, sent_on],
    )?;

    Ok(Message {
        id,
        sender_id: sender_id.to_string(),
        recipient_id: recipient_id.to_string(),
        body: new.body,
        sent_on,
    })
}

/// Messages the user has sent, newest first.
pub fn messages_sent(conn: &Connection, user_id: &str) -> Result<Vec<Message>, SocialError> {
    list_messages(conn, "sender_id", user_id)
}

/// Messages the user has received, newest first.
pub fn messages_received(conn: &Connection, user_id: &str) -> Result<Vec<Message>, SocialError> {
    list_messages(conn, "recipient_id", user_id)
}

fn list_messages(
    conn: &Connection,
    side: &str,
    user_id: &str,
) -> Result<Vec<Message>, SocialError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, sender_id, recipient_id, body, sent_on FROM messages
         WHERE {side} = ?1 ORDER BY sent_on DESC, id DESC"
    ))?;
    let rows = stmt
        .query_map(params![user_id], message_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Delete one message by id.
pub fn delete_message(conn: &Connection, message_id: &str) -> Result<(), SocialError> {
    let removed = conn.execute("DELETE FROM messages WHERE id = ?1", params![message_id])?;
    if removed == 0 {
        return Err(SocialError::MessageNotFound(message_id.to_string()));
    }
    Ok(())
}

/// Delete every message the user has sent. Returns the number removed.
pub fn delete_all_sent(conn: &Connection, user_id: &str) -> Result<usize, SocialError> {
    let removed = conn.execute(
        "DELETE FROM messages WHERE sender_id = ?1",
        params![user_id],
    )?;
    Ok(removed)
}

/// Delete every message the user has received. Returns the number removed.
pub fn delete_all_received(conn: &Connection, user_id: &str) -> Result<usize, SocialError> {
    let removed = conn.execute(
        "DELETE FROM messages WHERE recipient_id = ?1",
        params![user_id],
    )?;
    Ok(removed)
}

fn message_from_row(row: &rusqlite::Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        recipient_id: row.get(2)?,
        body: row.get(3)?,
        sent_on: row.get(4)?,
    })
}
