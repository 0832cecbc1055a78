//! Keep-alive web server.
//!
//! Hosting platforms that put idle services to sleep ping `/` or `/health`;
//! both report the current registration count. Runs on WEB_PORT (default
//! 8080) next to the bot dispatcher.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use indoc::formatdoc;
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::storage::TeamStore;

/// Shared state for the web server.
#[derive(Clone)]
struct WebState {
    store: TeamStore,
}

/// Builds the router without binding a socket.
pub fn router(store: TeamStore) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .with_state(WebState { store })
}

/// Start the keep-alive web server.
pub async fn start_web_server(port: u16, store: TeamStore) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(store);

    log::info!("Starting web server on http://{}", addr);
    log::info!("  /        - Status page (HTML)");
    log::info!("  /health  - Health check (JSON)");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Body of `/health`
#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    registrations: Option<u64>,
}

/// Total registrations, or `None` if the store could not be read.
async fn registration_count(store: &TeamStore) -> Option<u64> {
    let store = store.clone();
    match tokio::task::spawn_blocking(move || store.total_count()).await {
        Ok(Ok(total)) => Some(total),
        Ok(Err(e)) => {
            log::error!("Web server failed to read registrations: {}", e);
            None
        }
        Err(e) => {
            log::error!("Registration count task failed: {}", e);
            None
        }
    }
}

/// GET /: human-readable status page.
async fn index_handler(State(state): State<WebState>) -> Response {
    let registrations = match registration_count(&state.store).await {
        Some(total) => total.to_string(),
        None => "—".to_string(),
    };

    let html = formatdoc! {r#"
        <!DOCTYPE html>
        <html lang="ru">
        <head>
          <meta charset="utf-8">
          <title>Распределение по командам</title>
        </head>
        <body>
          <h1>🤖 Бот распределения по командам работает</h1>
          <p>Зарегистрировано участников: {registrations}</p>
          <p>Команд: {teams}</p>
        </body>
        </html>
    "#, registrations = registrations, teams = state.store.team_count()};

    Html(html).into_response()
}

/// GET /health: JSON liveness check.
async fn health_handler(State(state): State<WebState>) -> Response {
    match registration_count(&state.store).await {
        Some(total) => (
            StatusCode::OK,
            Json(Health {
                status: "ok",
                registrations: Some(total),
            }),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Health {
                status: "degraded",
                registrations: None,
            }),
        )
            .into_response(),
    }
}
