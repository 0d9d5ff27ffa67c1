//! `/api/posts` — post CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{resolve_actor, with_db, ApiError, AppState, SessionUser};
use crate::social::posts::{self, NewPost, PostUpdate};
use crate::social::types::Post;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route(
            "/api/posts/{pid}",
            get(find_post).put(update_post).delete(delete_post),
        )
        .route(
            "/api/users/{uid}/posts",
            get(posts_by_user).post(create_post),
        )
}

async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    let all = with_db(&state, |conn| posts::list_posts(conn)).await?;
    Ok(Json(all))
}

async fn find_post(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = with_db(&state, move |conn| posts::find_post(conn, &pid)).await?;
    Ok(Json(post))
}

async fn posts_by_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let posts = with_db(&state, move |conn| posts::posts_by_user(conn, &uid)).await?;
    Ok(Json(posts))
}

async fn create_post(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
    Json(new): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let post = with_db(&state, move |conn| posts::create_post(conn, &uid, new)).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<AppState>,
    Path(pid): Path<String>,
    Json(update): Json<PostUpdate>,
) -> Result<Json<Post>, ApiError> {
    let post = with_db(&state, move |conn| posts::update_post(conn, &pid, update)).await?;
    Ok(Json(post))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<StatusCode, ApiError> {
    with_db(&state, move |conn| posts::delete_post(conn, &pid)).await?;
    Ok(StatusCode::NO_CONTENT)
}
