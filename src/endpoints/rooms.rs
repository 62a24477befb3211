use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::DbConn;
use crate::endpoints::extractors::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::{Authorized, InventoryView, RoomsManage};
use crate::models::prelude::*;
use crate::models::{item, room};
use crate::services::access::{AccessPolicy, SchoolScope};
use crate::services::history::empty_as_none;
use crate::state::AppState;

/// Create rooms routes
pub fn rooms_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_rooms).post(create_room))
        .route("/{id}", get(get_room).put(update_room).delete(delete_room))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RoomFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub school_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RoomRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub school_id: i64,
    pub status_id: Option<i64>,
    pub type_id: Option<i64>,
    pub responsible_user_id: Option<i64>,
    pub floor: Option<String>,
    pub building: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoomResponse {
    #[serde(flatten)]
    pub room: room::Model,
    pub school_name: Option<String>,
    pub status_name: Option<String>,
    pub type_name: Option<String>,
    pub item_count: u64,
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn describe_room(db: &DbConn, found: room::Model) -> Result<RoomResponse> {
    let school_name = School::find_by_id(found.school_id)
        .one(db)
        .await?
        .map(|s| s.name);

    let status_name = match found.status_id {
        Some(id) => RoomStatus::find_by_id(id).one(db).await?.map(|s| s.name),
        None => None,
    };

    let type_name = match found.type_id {
        Some(id) => RoomType::find_by_id(id).one(db).await?.map(|t| t.name),
        None => None,
    };

    let item_count = Item::find()
        .filter(item::Column::RoomId.eq(found.id))
        .count(db)
        .await?;

    Ok(RoomResponse {
        room: found,
        school_name,
        status_name,
        type_name,
        item_count,
    })
}

/// Check every reference a room request makes
async fn validate_room_request(
    db: &DbConn,
    policy: &AccessPolicy,
    request: &RoomRequest,
) -> Result<()> {
    request.validate()?;
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }

    if School::find_by_id(request.school_id).one(db).await?.is_none() {
        return Err(AppError::Validation(format!(
            "School {} does not exist",
            request.school_id
        )));
    }
    policy.ensure_school(request.school_id)?;

    if let Some(status_id) = request.status_id {
        if RoomStatus::find_by_id(status_id).one(db).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Room status {} does not exist",
                status_id
            )));
        }
    }
    if let Some(type_id) = request.type_id {
        if RoomType::find_by_id(type_id).one(db).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Room type {} does not exist",
                type_id
            )));
        }
    }
    if let Some(user_id) = request.responsible_user_id {
        if User::find_by_id(user_id).one(db).await?.is_none() {
            return Err(AppError::Validation(format!(
                "User {} does not exist",
                user_id
            )));
        }
    }

    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Endpoints
// ============================================================================

async fn list_rooms(
    auth: Authorized<InventoryView>,
    State(state): State<AppState>,
    Query(filter): Query<RoomFilter>,
) -> Result<Json<Vec<RoomResponse>>> {
    let mut query = Room::find();

    match auth.policy().scope() {
        SchoolScope::None => return Ok(Json(vec![])),
        SchoolScope::School(own) => {
            query = query.filter(room::Column::SchoolId.eq(own));
        }
        SchoolScope::All => {}
    }
    if let Some(school_id) = filter.school_id {
        query = query.filter(room::Column::SchoolId.eq(school_id));
    }

    let rooms = query
        .order_by_asc(room::Column::Name)
        .all(&state.db)
        .await?;

    let mut result = Vec::with_capacity(rooms.len());
    for found in rooms {
        result.push(describe_room(&state.db, found).await?);
    }

    Ok(Json(result))
}

async fn get_room(
    auth: Authorized<InventoryView>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RoomResponse>> {
    let found = auth.policy().ensure_room(&state.db, id).await?;
    Ok(Json(describe_room(&state.db, found).await?))
}

async fn create_room(
    auth: Authorized<RoomsManage>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>)> {
    validate_room_request(&state.db, &auth.policy(), &request).await?;

    let now = Utc::now();
    let created = room::ActiveModel {
        name: Set(request.name.trim().to_string()),
        school_id: Set(request.school_id),
        status_id: Set(request.status_id),
        type_id: Set(request.type_id),
        responsible_user_id: Set(request.responsible_user_id),
        floor: Set(trimmed(request.floor)),
        building: Set(trimmed(request.building)),
        notes: Set(trimmed(request.notes)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(
        room_id = created.id,
        school_id = created.school_id,
        user_id = auth.user_id(),
        "Room created"
    );

    Ok((
        StatusCode::CREATED,
        Json(describe_room(&state.db, created).await?),
    ))
}

async fn update_room(
    auth: Authorized<RoomsManage>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<RoomRequest>,
) -> Result<Json<RoomResponse>> {
    let policy = auth.policy();
    let existing = policy.ensure_room(&state.db, id).await?;
    validate_room_request(&state.db, &policy, &request).await?;

    let mut active: room::ActiveModel = existing.into();
    active.name = Set(request.name.trim().to_string());
    active.school_id = Set(request.school_id);
    active.status_id = Set(request.status_id);
    active.type_id = Set(request.type_id);
    active.responsible_user_id = Set(request.responsible_user_id);
    active.floor = Set(trimmed(request.floor));
    active.building = Set(trimmed(request.building));
    active.notes = Set(trimmed(request.notes));
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    tracing::info!(room_id = id, user_id = auth.user_id(), "Room updated");

    Ok(Json(describe_room(&state.db, updated).await?))
}

async fn delete_room(
    auth: Authorized<RoomsManage>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let existing = auth.policy().ensure_room(&state.db, id).await?;

    let items = Item::find()
        .filter(item::Column::RoomId.eq(id))
        .count(&state.db)
        .await?;
    if items > 0 {
        return Err(AppError::Conflict(
            "Cannot delete room that still contains items".to_string(),
        ));
    }

    Room::delete_by_id(id).exec(&state.db).await?;
    tracing::info!(room_id = id, user_id = auth.user_id(), "Room deleted");

    Ok(Json(serde_json::json!({
        "message": format!("Room '{}' deleted", existing.name),
        "id": id,
    })))
}
