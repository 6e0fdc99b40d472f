use axum::{
    routing::{delete, get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::routes::{add_word, create_deck, delete_deck, list_decks, record_score, AppState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/decks", get(list_decks).post(create_deck))
        .route("/decks/:name", delete(delete_deck))
        .route("/words", post(add_word))
        .route("/scores", post(record_score))
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn run(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
}
