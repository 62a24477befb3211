use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use validator::Validate;

use crate::endpoints::extractors::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::{Authorized, InventoryView, SchoolsManage};
use crate::models::prelude::*;
use crate::models::user::Role;
use crate::models::{room, school};
use crate::services::access::SchoolScope;
use crate::state::AppState;

/// Create schools routes
pub fn schools_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_schools).post(create_school))
        .route(
            "/{id}",
            get(get_school).put(update_school).delete(delete_school),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize, Validate)]
pub struct SchoolRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub address: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub kepala_sekolah_id: Option<i64>,
}

impl SchoolRequest {
    async fn check(&self, db: &crate::db::DbConn) -> Result<()> {
        self.validate()?;
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }

        if let Some(head_id) = self.kepala_sekolah_id {
            let head = User::find_by_id(head_id)
                .one(db)
                .await?
                .ok_or_else(|| AppError::Validation(format!("User {} does not exist", head_id)))?;
            if head.role() != Some(Role::KepalaSekolah) {
                return Err(AppError::Validation(format!(
                    "User {} is not a kepala_sekolah",
                    head_id
                )));
            }
        }
        Ok(())
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn list_schools(
    auth: Authorized<InventoryView>,
    State(state): State<AppState>,
) -> Result<Json<Vec<school::Model>>> {
    let query = match auth.policy().scope() {
        SchoolScope::All => School::find(),
        SchoolScope::School(own) => School::find().filter(school::Column::Id.eq(own)),
        SchoolScope::None => return Ok(Json(vec![])),
    };

    let schools = query
        .order_by_asc(school::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(schools))
}

async fn get_school(
    auth: Authorized<InventoryView>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<school::Model>> {
    let found = School::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("School {} not found", id)))?;

    auth.policy().ensure_school(found.id)?;
    Ok(Json(found))
}

async fn create_school(
    auth: Authorized<SchoolsManage>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SchoolRequest>,
) -> Result<(StatusCode, Json<school::Model>)> {
    request.check(&state.db).await?;

    let now = Utc::now();
    let created = school::ActiveModel {
        name: Set(request.name.trim().to_string()),
        address: Set(trimmed(request.address)),
        phone: Set(trimmed(request.phone)),
        email: Set(trimmed(request.email)),
        kepala_sekolah_id: Set(request.kepala_sekolah_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(school_id = created.id, user_id = auth.user_id(), "School created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_school(
    auth: Authorized<SchoolsManage>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<SchoolRequest>,
) -> Result<Json<school::Model>> {
    let existing = School::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("School {} not found", id)))?;
    request.check(&state.db).await?;

    let mut active: school::ActiveModel = existing.into();
    active.name = Set(request.name.trim().to_string());
    active.address = Set(trimmed(request.address));
    active.phone = Set(trimmed(request.phone));
    active.email = Set(trimmed(request.email));
    active.kepala_sekolah_id = Set(request.kepala_sekolah_id);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    tracing::info!(school_id = id, user_id = auth.user_id(), "School updated");
    Ok(Json(updated))
}

async fn delete_school(
    auth: Authorized<SchoolsManage>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let existing = School::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("School {} not found", id)))?;

    let rooms = Room::find()
        .filter(room::Column::SchoolId.eq(id))
        .count(&state.db)
        .await?;
    if rooms > 0 {
        return Err(AppError::Conflict(
            "Cannot delete school that still has rooms".to_string(),
        ));
    }

    School::delete_by_id(id).exec(&state.db).await?;
    tracing::info!(school_id = id, user_id = auth.user_id(), "School deleted");

    Ok(Json(serde_json::json!({
        "message": format!("School '{}' deleted", existing.name),
        "id": id,
    })))
}
