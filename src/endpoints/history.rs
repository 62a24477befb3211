use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::middleware::{Authorized, HistoryView};
use crate::services::history::{history_stats, list_history, HistoryEntry, HistoryQuery, HistoryStats};
use crate::state::AppState;

/// Create history routes
pub fn history_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_history))
        .route("/stats", get(get_stats))
        .with_state(state)
}

/// History log, most recent first
async fn get_history(
    auth: Authorized<HistoryView>,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>> {
    let entries = list_history(&state.db, &query, auth.policy().scope()).await?;
    Ok(Json(entries))
}

async fn get_stats(
    auth: Authorized<HistoryView>,
    State(state): State<AppState>,
) -> Result<Json<HistoryStats>> {
    Ok(Json(history_stats(&state.db, auth.policy().scope()).await?))
}
