//! `/api/.../likes|dislikes|bookmarks` — the reaction endpoints.
//!
//! All three kinds share one set of handlers; the kind is bound when the
//! routes are registered, so adding a kind is one enum variant, not a new
//! controller.

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};

use super::{resolve_actor, with_db, ApiError, AppState, SessionUser};
use crate::social::toggle::ToggleOutcome;
use crate::social::types::{Post, Relation, RelationKind, User};
use crate::social::{relations, toggle};

pub fn router() -> Router<AppState> {
    RelationKind::ALL
        .iter()
        .fold(Router::new(), |router, &kind| router.merge(kind_router(kind)))
}

fn kind_router(kind: RelationKind) -> Router<AppState> {
    let plural = format!("{}s", kind.as_str());
    Router::new()
        .route(
            &format!("/api/users/{{uid}}/{plural}/{{pid}}"),
            put(
                move |state: State<AppState>, path: Path<(String, String)>, session: SessionUser| {
                    toggle_reaction(kind, state, path, session)
                },
            )
            .get(
                move |state: State<AppState>, path: Path<(String, String)>, session: SessionUser| {
                    find_reaction(kind, state, path, session)
                },
            ),
        )
        .route(
            &format!("/api/users/{{uid}}/{plural}"),
            get(
                move |state: State<AppState>, path: Path<String>, session: SessionUser| {
                    posts_for_actor(kind, state, path, session)
                },
            )
            .delete(
                move |state: State<AppState>, path: Path<String>, session: SessionUser| {
                    clear_reactions(kind, state, path, session)
                },
            ),
        )
        .route(
            &format!("/api/posts/{{pid}}/{plural}"),
            get(move |state: State<AppState>, path: Path<String>| {
                users_for_subject(kind, state, path)
            }),
        )
}

/// PUT `/api/users/{uid}/{kind}s/{pid}` — flip the reaction and report the
/// new state plus the post's cached counter.
async fn toggle_reaction(
    kind: RelationKind,
    State(state): State<AppState>,
    Path((uid, pid)): Path<(String, String)>,
    session: SessionUser,
) -> Result<Json<ToggleOutcome>, ApiError> {
    let actor = resolve_actor(&uid, &session)?;
    let outcome = with_db(&state, move |conn| toggle::toggle(conn, kind, &actor, &pid)).await?;
    Ok(Json(outcome))
}

/// GET `/api/users/{uid}/{kind}s/{pid}` — the single relation record, or
/// null when the pair has none.
async fn find_reaction(
    kind: RelationKind,
    State(state): State<AppState>,
    Path((uid, pid)): Path<(String, String)>,
    session: SessionUser,
) -> Result<Json<Option<Relation>>, ApiError> {
    let actor = resolve_actor(&uid, &session)?;
    let relation =
        with_db(&state, move |conn| relations::find(conn, kind, &actor, &pid)).await?;
    Ok(Json(relation))
}

/// GET `/api/users/{uid}/{kind}s` — the posts this user has reacted to.
async fn posts_for_actor(
    kind: RelationKind,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    let actor = resolve_actor(&uid, &session)?;
    let posts = with_db(&state, move |conn| {
        relations::posts_for_actor(conn, kind, &actor)
    })
    .await?;
    Ok(Json(posts))
}

/// GET `/api/posts/{pid}/{kind}s` — the users who reacted to this post.
async fn users_for_subject(
    kind: RelationKind,
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = with_db(&state, move |conn| {
        relations::users_for_subject(conn, kind, &pid)
    })
    .await?;
    Ok(Json(users))
}

/// DELETE `/api/users/{uid}/{kind}s` — clear every reaction of this kind the
/// user holds, with counter fixup. Returns the number removed.
async fn clear_reactions(
    kind: RelationKind,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = resolve_actor(&uid, &session)?;
    let removed = with_db(&state, move |conn| {
        relations::clear_actor_relations(conn, kind, &actor)
    })
    .await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}
