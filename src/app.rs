#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::Config;
use crate::grid::{GridPayload, GridSnapshot};
use crate::session::Dashboard;
use crate::table::Table;

// Grid snapshots carry the whole table, so allow bodies well past axum's 2 MB default.
const MAX_SNAPSHOT_BYTES: usize = 64 * 1024 * 1024;

pub struct AppState {
    dashboard: Mutex<Dashboard>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        AppState {
            dashboard: Mutex::new(dashboard),
        }
    }

    // Every action runs to completion under this lock before the next one starts.
    fn dashboard(&self) -> MutexGuard<'_, Dashboard> {
        self.dashboard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub status: String,
    pub message: Option<String>,
    pub saved_annotations: Option<Table>,
    pub last_update: Option<String>,
}

/// Builds the router for one dashboard session.
pub fn router(dashboard: Dashboard) -> Router {
    let app_state = Arc::new(AppState::new(dashboard));

    Router::new()
        .route("/", get(serve_dashboard))
        .route("/static/dashboard.js", get(serve_script))
        .route("/api/grid", get(get_grid))
        .route("/api/save", post(save_grid))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_SNAPSHOT_BYTES))
        .with_state(app_state)
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = config.bind_addr.clone();
    log::info!(
        "serving {} with annotations in {}",
        config.primary_path.display(),
        config.annotations_path.display()
    );
    let app = router(Dashboard::new(config));

    // Start server
    let listener = TcpListener::bind(&bind_addr).await?;
    log::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard() -> Html<&'static str> {
    Html(include_str!("./static/dashboard.html"))
}

async fn serve_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        include_str!("./static/dashboard.js"),
    )
}

async fn get_grid(State(state): State<Arc<AppState>>) -> Json<GridPayload> {
    Json(state.dashboard().payload())
}

async fn save_grid(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<GridSnapshot>,
) -> Json<SaveResponse> {
    let mut dashboard = state.dashboard();

    match dashboard.save(snapshot) {
        Ok(report) => Json(SaveResponse {
            status: "ok".to_string(),
            message: Some("Wijzigingen zijn opgeslagen!".to_string()),
            saved_annotations: Some(report.saved_annotations),
            last_update: Some(report.saved_at.to_rfc3339()),
        }),
        Err(e) => Json(SaveResponse {
            status: "error".to_string(),
            message: Some(format!("Error bij het opslaan: {}", e)),
            saved_annotations: None,
            last_update: None,
        }),
    }
}
