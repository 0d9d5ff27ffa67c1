//! `/api/users/{uid}/follows` — the follow graph.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{resolve_actor, with_db, ApiError, AppState, SessionUser};
use crate::social::follows::{self, FollowResult};
use crate::social::types::User;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/{uid}/following", get(following))
        .route("/api/users/{uid}/followers", get(followers))
        .route(
            "/api/users/{uid}/follows/{ouid}",
            post(follow).delete(unfollow),
        )
}

async fn following(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let users = with_db(&state, move |conn| follows::following(conn, &uid)).await?;
    Ok(Json(users))
}

async fn followers(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let users = with_db(&state, move |conn| follows::followers(conn, &uid)).await?;
    Ok(Json(users))
}

async fn follow(
    State(state): State<AppState>,
    Path((uid, ouid)): Path<(String, String)>,
    session: SessionUser,
) -> Result<Json<FollowResult>, ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let result = with_db(&state, move |conn| follows::follow(conn, &uid, &ouid)).await?;
    Ok(Json(result))
}

async fn unfollow(
    State(state): State<AppState>,
    Path((uid, ouid)): Path<(String, String)>,
    session: SessionUser,
) -> Result<StatusCode, ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let removed = with_db(&state, move |conn| follows::unfollow(conn, &uid, &ouid)).await?;
    Ok(if removed {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    })
}
