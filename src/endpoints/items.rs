use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::db::DbConn;
use crate::endpoints::extractors::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::{Authorized, InventoryView, ItemsManage};
use crate::models::prelude::*;
use crate::models::{category, item, room, school};
use crate::services::access::SchoolScope;
use crate::services::history::empty_as_none;
use crate::services::inventory::{
    create_item, delete_item, update_item, CreateItemRequest, UpdateItemRequest,
};
use crate::state::AppState;

/// Create items routes
pub fn items_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_items).post(add_item))
        .route("/{id}", get(get_item).put(edit_item).delete(remove_item))
        .with_state(state)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ItemFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub room_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub school_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    #[serde(flatten)]
    pub item: item::Model,
    pub room_name: Option<String>,
    pub school_id: Option<i64>,
    pub school_name: Option<String>,
    pub category_name: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn describe_items(db: &DbConn, items: Vec<item::Model>) -> Result<Vec<ItemResponse>> {
    let room_ids: HashSet<i64> = items.iter().map(|i| i.room_id).collect();
    let category_ids: HashSet<i64> = items.iter().map(|i| i.category_id).collect();

    let rooms: HashMap<i64, room::Model> = if room_ids.is_empty() {
        HashMap::new()
    } else {
        Room::find()
            .filter(room::Column::Id.is_in(room_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect()
    };

    let school_ids: HashSet<i64> = rooms.values().map(|r| r.school_id).collect();
    let schools: HashMap<i64, String> = if school_ids.is_empty() {
        HashMap::new()
    } else {
        School::find()
            .filter(school::Column::Id.is_in(school_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect()
    };

    let categories: HashMap<i64, String> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        Category::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect()
    };

    Ok(items
        .into_iter()
        .map(|item| {
            let owning_room = rooms.get(&item.room_id);
            ItemResponse {
                room_name: owning_room.map(|r| r.name.clone()),
                school_id: owning_room.map(|r| r.school_id),
                school_name: owning_room.and_then(|r| schools.get(&r.school_id).cloned()),
                category_name: categories.get(&item.category_id).cloned(),
                item,
            }
        })
        .collect())
}

async fn describe_item(db: &DbConn, item: item::Model) -> Result<ItemResponse> {
    describe_items(db, vec![item])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Item lookup returned nothing".to_string()))
}

// ============================================================================
// Endpoints
// ============================================================================

/// List items by name within the caller's schools
async fn list_items(
    auth: Authorized<InventoryView>,
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> Result<Json<Vec<ItemResponse>>> {
    let mut query = Item::find();

    if let Some(room_id) = filter.room_id {
        query = query.filter(item::Column::RoomId.eq(room_id));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(item::Column::CategoryId.eq(category_id));
    }
    if let Some(search) = filter.search.as_deref() {
        query = query.filter(item::Column::Name.contains(search));
    }

    let school_filter = match (filter.school_id, auth.policy().scope()) {
        (_, SchoolScope::None) => return Ok(Json(vec![])),
        (Some(requested), SchoolScope::School(own)) if requested != own => {
            return Ok(Json(vec![]))
        }
        (Some(requested), _) => Some(requested),
        (None, SchoolScope::School(own)) => Some(own),
        (None, SchoolScope::All) => None,
    };

    if let Some(school_id) = school_filter {
        let room_ids: Vec<i64> = Room::find()
            .filter(room::Column::SchoolId.eq(school_id))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        query = query.filter(item::Column::RoomId.is_in(room_ids));
    }

    let items = query
        .order_by_asc(item::Column::Name)
        .order_by_asc(item::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(describe_items(&state.db, items).await?))
}

async fn get_item(
    auth: Authorized<InventoryView>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ItemResponse>> {
    let found = auth.policy().ensure_item(&state.db, id).await?;
    Ok(Json(describe_item(&state.db, found).await?))
}

async fn add_item(
    auth: Authorized<ItemsManage>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>)> {
    let created = create_item(&state.db, &auth.policy(), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(describe_item(&state.db, created).await?),
    ))
}

async fn edit_item(
    auth: Authorized<ItemsManage>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateItemRequest>,
) -> Result<Json<ItemResponse>> {
    let updated = update_item(&state.db, &auth.policy(), id, request).await?;
    Ok(Json(describe_item(&state.db, updated).await?))
}

async fn remove_item(
    auth: Authorized<ItemsManage>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let deleted = delete_item(&state.db, &auth.policy(), id).await?;
    Ok(Json(serde_json::json!({
        "message": format!("Item '{}' deleted", deleted.name),
        "id": deleted.id,
    })))
}
