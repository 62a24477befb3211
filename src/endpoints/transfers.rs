use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::endpoints::extractors::ApiJson;
use crate::error::Result;
use crate::middleware::{Authorized, HistoryView, TransfersCreate};
use crate::services::history::{list_transfers, TransferEntry, TransferQuery};
use crate::services::inventory::{transfer_item, TransferRequest};
use crate::state::AppState;

/// Create transfers routes
pub fn transfers_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_transfers).post(create_transfer))
        .with_state(state)
}

/// Move item quantity between rooms
async fn create_transfer(
    auth: Authorized<TransfersCreate>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TransferRequest>,
) -> Result<(StatusCode, Json<TransferEntry>)> {
    let transfer = transfer_item(&state.db, &auth.policy(), request).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

/// Transfer log, most recent first
async fn get_transfers(
    auth: Authorized<HistoryView>,
    State(state): State<AppState>,
    Query(query): Query<TransferQuery>,
) -> Result<Json<Vec<TransferEntry>>> {
    let transfers = list_transfers(&state.db, &query, auth.policy().scope()).await?;
    Ok(Json(transfers))
}
