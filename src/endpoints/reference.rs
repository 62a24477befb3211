//! Reference data: item categories, room types and room statuses

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use validator::Validate;

use crate::endpoints::extractors::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::{Authorized, InventoryView, ItemsManage};
use crate::models::prelude::*;
use crate::models::{category, room_status, room_type};
use crate::state::AppState;

/// Create reference data routes
pub fn reference_routes(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/room-types", get(list_room_types))
        .route("/room-statuses", get(list_room_statuses))
        .with_state(state)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

async fn list_categories(
    _auth: Authorized<InventoryView>,
    State(state): State<AppState>,
) -> Result<Json<Vec<category::Model>>> {
    let categories = Category::find()
        .order_by_asc(category::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(categories))
}

async fn create_category(
    auth: Authorized<ItemsManage>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CategoryRequest>,
) -> Result<(StatusCode, Json<category::Model>)> {
    request.validate()?;
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }

    let duplicate = Category::find()
        .filter(category::Column::Name.eq(name.as_str()))
        .one(&state.db)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::Conflict(format!(
            "Category '{}' already exists",
            name
        )));
    }

    let created = category::ActiveModel {
        name: Set(name),
        description: Set(request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(category_id = created.id, user_id = auth.user_id(), "Category created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_room_types(
    _auth: Authorized<InventoryView>,
    State(state): State<AppState>,
) -> Result<Json<Vec<room_type::Model>>> {
    let types = RoomType::find()
        .order_by_asc(room_type::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(types))
}

async fn list_room_statuses(
    _auth: Authorized<InventoryView>,
    State(state): State<AppState>,
) -> Result<Json<Vec<room_status::Model>>> {
    let statuses = RoomStatus::find()
        .order_by_asc(room_status::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(statuses))
}
