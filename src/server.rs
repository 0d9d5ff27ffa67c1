//! Router assembly and the serve entry point.

use anyhow::Result;
use axum::Router;

use crate::api::{self, AppState};
use crate::config::RoostConfig;
use crate::db;

/// Assemble the full `/api` router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::users::router())
        .merge(api::posts::router())
        .merge(api::relations::router())
        .merge(api::follows::router())
        .merge(api::messages::router())
        .with_state(state)
}

/// Open the database, bind, and serve until ctrl-c.
pub async fn serve(config: RoostConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let state = AppState::new(conn);
    let router = build_router(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "roost listening at http://{bind_addr}/api");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
