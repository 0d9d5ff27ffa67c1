//! Core social type definitions.
//!
//! Defines [`RelationKind`] (the three reaction kinds sharing one toggle
//! engine), [`ActorRef`] (explicit id or the session-bound `me` sentinel),
//! and the record structs matching the table schemas.

use serde::{Deserialize, Serialize};

use crate::social::error::SocialError;

/// The three user-to-post reaction kinds. Each pairs a relation record set
/// with a cached counter column on the post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Like,
    Dislike,
    Bookmark,
}

impl RelationKind {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Bookmark => "bookmark",
        }
    }

    /// The posts column caching `COUNT(*)` of this kind.
    pub fn counter_column(&self) -> &'static str {
        match self {
            Self::Like => "like_count",
            Self::Dislike => "dislike_count",
            Self::Bookmark => "bookmark_count",
        }
    }

    pub const ALL: [RelationKind; 3] = [Self::Like, Self::Dislike, Self::Bookmark];
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            "bookmark" => Ok(Self::Bookmark),
            _ => Err(format!("unknown relation kind: {s}")),
        }
    }
}

/// An actor position in a request path: either an explicit user id or the
/// `me` sentinel standing for the session-bound identity.
///
/// Resolution happens at the API boundary; the engine only ever sees a
/// concrete id or the [`SocialError::ActorUnresolved`] failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorRef {
    Me,
    Id(String),
}

impl ActorRef {
    /// Parse a path segment. The literal `me` is the sentinel; anything else
    /// is taken as an explicit user id.
    pub fn parse(raw: &str) -> Self {
        if raw == "me" {
            Self::Me
        } else {
            Self::Id(raw.to_string())
        }
    }

    /// Substitute the session identity for the `me` sentinel. Fails with
    /// `ActorUnresolved` when the sentinel is used without a session — no
    /// store access may happen after that failure.
    pub fn resolve(self, session_user: Option<&str>) -> Result<String, SocialError> {
        match self {
            Self::Id(id) => Ok(id),
            Self::Me => session_user
                .map(str::to_string)
                .ok_or(SocialError::ActorUnresolved),
        }
    }
}

/// User account types carried from the profile model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Personal,
    Academic,
    Professional,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Academic => "academic",
            Self::Professional => "professional",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(Self::Personal),
            "academic" => Ok(Self::Academic),
            "professional" => Ok(Self::Professional),
            _ => Err(format!("unknown account type: {s}")),
        }
    }
}

/// A user profile, matching the `users` table schema. Credentials are not
/// stored here; authentication belongs to the fronting service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub account_type: AccountType,
    pub biography: Option<String>,
    /// ISO 8601 date, if the user chose to share it.
    pub date_of_birth: Option<String>,
    /// ISO 8601 timestamp of account creation.
    pub joined: String,
}

/// Cached reaction counters embedded in a post. Every field must equal the
/// corresponding `COUNT(*)` over `relations`; only the toggle engine,
/// account deletion, and counter repair may write them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    pub replies: i64,
    pub reposts: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub bookmarks: i64,
}

/// A post record, matching the `posts` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// UUID v7 primary key.
    pub id: String,
    pub content: String,
    /// ID of the authoring user.
    pub posted_by: String,
    /// ISO 8601 creation timestamp.
    pub posted_on: String,
    pub image: Option<String>,
    pub youtube: Option<String>,
    pub stats: PostStats,
}

/// A single user-to-post reaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// UUID v7 primary key.
    pub id: String,
    pub kind: RelationKind,
    /// ID of the acting user.
    pub actor_id: String,
    /// ID of the post acted upon.
    pub subject_id: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// A direct message between two users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub body: String,
    /// ISO 8601 send timestamp.
    pub sent_on: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_kind_round_trips() {
        for kind in RelationKind::ALL {
            assert_eq!(kind.as_str().parse::<RelationKind>().unwrap(), kind);
        }
        assert!("retweet".parse::<RelationKind>().is_err());
    }

    #[test]
    fn counter_columns_are_distinct() {
        let columns: std::collections::HashSet<_> =
            RelationKind::ALL.iter().map(|k| k.counter_column()).collect();
        assert_eq!(columns.len(), 3);
    }

    #[test]
    fn actor_ref_parses_sentinel() {
        assert_eq!(ActorRef::parse("me"), ActorRef::Me);
        assert_eq!(ActorRef::parse("u42"), ActorRef::Id("u42".into()));
    }

    #[test]
    fn actor_ref_resolution() {
        assert_eq!(
            ActorRef::Me.resolve(Some("u1")).unwrap(),
            "u1".to_string()
        );
        // Explicit id wins even with a session present
        assert_eq!(
            ActorRef::Id("u2".into()).resolve(Some("u1")).unwrap(),
            "u2".to_string()
        );
        assert!(matches!(
            ActorRef::Me.resolve(None),
            Err(SocialError::ActorUnresolved)
        ));
    }
}
