//! `/api/.../messages` — direct messages.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use super::{resolve_actor, with_db, ApiError, AppState, SessionUser};
use crate::social::messages::{self, NewMessage};
use crate::social::types::Message;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/{uid}/messages/sent", get(sent))
        .route("/api/users/{uid}/messages/received", get(received))
        .route("/api/users/{uid}/messages/{ouid}", post(send))
        .route("/api/messages/{mid}", delete(delete_message))
}

async fn sent(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
) -> Result<Json<Vec<Message>>, ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let msgs = with_db(&state, move |conn| messages::messages_sent(conn, &uid)).await?;
    Ok(Json(msgs))
}

async fn received(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    session: SessionUser,
) -> Result<Json<Vec<Message>>, ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let msgs = with_db(&state, move |conn| messages::messages_received(conn, &uid)).await?;
    Ok(Json(msgs))
}

async fn send(
    State(state): State<AppState>,
    Path((uid, ouid)): Path<(String, String)>,
    session: SessionUser,
    Json(new): Json<NewMessage>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let uid = resolve_actor(&uid, &session)?;
    let msg = with_db(&state, move |conn| {
        messages::send_message(conn, &uid, &ouid, new)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(msg)))
}

async fn delete_message(
    State(state): State<AppState>,
    Path(mid): Path<String>,
) -> Result<StatusCode, ApiError> {
    with_db(&state, move |conn| messages::delete_message(conn, &mid)).await?;
    Ok(StatusCode::NO_CONTENT)
}
