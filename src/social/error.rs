//! Typed failure taxonomy for the social engine.
//!
//! Every engine operation surfaces one of these; nothing is swallowed.
//! Storage errors propagate unchanged — retry policy for transport-level
//! failures belongs to the caller, not the engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SocialError {
    /// The post a reaction or lookup targets does not exist. Raised before
    /// any mutation (check-before-act).
    #[error("post not found: {0}")]
    PostNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("message not found: {0}")]
    MessageNotFound(String),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// The `me` sentinel was used without a session identity to substitute.
    #[error("actor identity unresolved")]
    ActorUnresolved,

    /// A relation insert hit an existing (kind, actor, subject) row. Internal
    /// to the toggle engine, which retries once before reporting
    /// [`SocialError::ToggleConflict`].
    #[error("relation already exists for this actor and post")]
    DuplicateRelation,

    /// A toggle lost its insert race twice. Callers may retry; a fresh
    /// invocation re-checks existence before acting.
    #[error("toggle conflicted with a concurrent update; retry")]
    ToggleConflict,

    /// Storage-level failure, propagated unchanged.
    #[error("storage error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The store could not be reached at all (e.g. poisoned connection lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl SocialError {
    /// True for the SQLite unique-constraint violation that signals a
    /// duplicate relation or follow edge insert. Checks the extended code so
    /// foreign-key violations are not misread as duplicates.
    pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}
