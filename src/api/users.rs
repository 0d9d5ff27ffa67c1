//! `/api/users` — profile CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{resolve_actor, with_db, ApiError, AppState, SessionUser};
use crate::social::types::User;
use crate::social::users::{self, NewUser, UserUpdate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{uid}",
            get(find_user).put(update_user).delete(delete_user),
        )
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let all = with_db(&state, |conn| users::list_users(conn)).await?;
    Ok(Json(all))
}

async fn create_user(
    State(state): State<AppState>,
    Json(new): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = with_db(&state, move |conn| users::create_user(conn, new)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn find_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
) -> Result<Json<User>, ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let user = with_db(&state, move |conn| users::find_user(conn, &uid)).await?;
    Ok(Json(user))
}

async fn update_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let user = with_db(&state, move |conn| users::update_user(conn, &uid, update)).await?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
) -> Result<StatusCode, ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    with_db(&state, move |conn| users::delete_user(conn, &uid)).await?;
    Ok(StatusCode::NO_CONTENT)
}
