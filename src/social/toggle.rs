//! The reaction toggle orchestrator.
//!
//! One operation serves likes, dislikes, and bookmarks: flip the (actor,
//! subject) relation of the given kind and keep the post's cached counter
//! equal to the relation count. The flip and the counter update run in a
//! single transaction, and the counter moves by an atomic in-place
//! increment rather than writing back a separately read count. The legacy
//! updater read the count first and wrote `count ± 1` after the flip, which
//! loses increments when two toggles on the same post interleave; the
//! transactional form holds the counter invariant under any interleaving,
//! and a failed toggle leaves both tables at the prior state.

use rusqlite::Connection;
use serde::Serialize;

use crate::social::error::SocialError;
use crate::social::types::RelationKind;
use crate::social::{posts, relations, users};

/// Result of a toggle: the relation's new state and the counter backing it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToggleOutcome {
    /// `true` if the relation exists after the toggle.
    pub active: bool,
    /// The post's cached counter for this kind after the toggle.
    pub count: i64,
}

/// Flip the relation of `kind` between an actor and a post.
///
/// The subject must exist before any mutation happens. A lost insert race
/// against a concurrent writer ([`SocialError::DuplicateRelation`]) is
/// retried once — the fresh attempt re-checks existence, which is the
/// correct recovery after an unknown outcome — and surfaces
/// [`SocialError::ToggleConflict`] if the conflict persists.
pub fn toggle(
    conn: &mut Connection,
    kind: RelationKind,
    actor_id: &str,
    subject_id: &str,
) -> Result<ToggleOutcome, SocialError> {
    match toggle_once(conn, kind, actor_id, subject_id) {
        Err(SocialError::DuplicateRelation) => {
            tracing::debug!(
                kind = %kind,
                actor = %actor_id,
                subject = %subject_id,
                "toggle lost insert race, retrying"
            );
            match toggle_once(conn, kind, actor_id, subject_id) {
                Err(SocialError::DuplicateRelation) => Err(SocialError::ToggleConflict),
                other => other,
            }
        }
        other => other,
    }
}

fn toggle_once(
    conn: &mut Connection,
    kind: RelationKind,
    actor_id: &str,
    subject_id: &str,
) -> Result<ToggleOutcome, SocialError> {
    let tx = conn.transaction()?;

    // Check-before-act: no mutation may happen for a missing post or actor.
    if !posts::post_exists(&tx, subject_id)? {
        return Err(SocialError::PostNotFound(subject_id.to_string()));
    }
    if !users::exists(&tx, actor_id)? {
        return Err(SocialError::UserNotFound(actor_id.to_string()));
    }

    let was_active = relations::exists(&tx, kind, actor_id, subject_id)?;

    let count = if was_active {
        relations::remove(&tx, kind, actor_id, subject_id)?;
        posts::bump_stat(&tx, subject_id, kind, -1)?
    } else {
        relations::insert(&tx, kind, actor_id, subject_id)?;
        posts::bump_stat(&tx, subject_id, kind, 1)?
    };

    tx.commit()?;

    tracing::debug!(
        kind = %kind,
        actor = %actor_id,
        subject = %subject_id,
        active = !was_active,
        count,
        "relation toggled"
    );

    Ok(ToggleOutcome {
        active: !was_active,
        count,
    })
}
