//! axum handlers, one file per resource.
//!
//! Handlers are thin adapters: resolve the actor if the path uses the `me`
//! sentinel, run the blocking storage call on the blocking pool, translate
//! [`SocialError`] into an HTTP status. All domain decisions live in
//! [`crate::social`].

pub mod follows;
pub mod messages;
pub mod posts;
pub mod relations;
pub mod users;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::social::error::SocialError;
use crate::social::types::ActorRef;

/// Shared application state: one SQLite connection behind a mutex, used from
/// the blocking pool.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }
}

/// HTTP-facing wrapper for engine failures.
#[derive(Debug)]
pub struct ApiError(pub SocialError);

impl From<SocialError> for ApiError {
    fn from(err: SocialError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SocialError::PostNotFound(_)
            | SocialError::UserNotFound(_)
            | SocialError::MessageNotFound(_) => StatusCode::NOT_FOUND,
            SocialError::UsernameTaken(_)
            | SocialError::DuplicateRelation
            | SocialError::ToggleConflict => StatusCode::CONFLICT,
            // The legacy service reported an unresolved session actor as 503;
            // kept as the distinct unresolved-actor signal.
            SocialError::ActorUnresolved | SocialError::Unavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            SocialError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, self.0.to_string()).into_response()
    }
}

/// The session collaborator's resolved identity, if the request carries one.
/// The fronting auth layer sets `x-user-id` after authenticating the cookie
/// session; roost never sees credentials.
#[derive(Debug, Clone)]
pub struct SessionUser(pub Option<String>);

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(SessionUser(user))
    }
}

/// Substitute the session identity for a `me` path segment; explicit ids
/// pass through. Fails 503 (`ActorUnresolved`) when `me` has no session.
pub(crate) fn resolve_actor(raw: &str, session: &SessionUser) -> Result<String, ApiError> {
    ActorRef::parse(raw)
        .resolve(session.0.as_deref())
        .map_err(ApiError)
}

/// Run a storage closure on the blocking pool with the connection locked.
pub(crate) async fn with_db<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Connection) -> Result<T, SocialError> + Send + 'static,
    T: Send + 'static,
{
    let db = Arc::clone(&state.db);
    let result = tokio::task::spawn_blocking(move || {
        let mut conn = db
            .lock()
            .map_err(|e| SocialError::Unavailable(format!("db lock poisoned: {e}")))?;
        f(&mut conn)
    })
    .await
    .map_err(|e| SocialError::Unavailable(format!("db task failed: {e}")))?;

    result.map_err(ApiError)
}
