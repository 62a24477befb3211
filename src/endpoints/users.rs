use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use validator::Validate;

use crate::endpoints::extractors::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::{Authorized, UsersManage};
use crate::models::prelude::*;
use crate::models::user::{self, Role};
use crate::services::security::hash_password;
use crate::state::AppState;

/// Create users routes
pub fn users_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .with_state(state)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub no_induk: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(min = 6))]
    pub password: String,
    pub role: String,
    pub school_id: Option<i64>,
}

async fn list_users(
    _auth: Authorized<UsersManage>,
    State(state): State<AppState>,
) -> Result<Json<Vec<user::Model>>> {
    let users = User::find()
        .order_by_asc(user::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(users))
}

async fn create_user(
    auth: Authorized<UsersManage>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<user::Model>)> {
    request.validate()?;

    let role: Role = request
        .role
        .parse()
        .map_err(|_| AppError::Validation(format!("Unknown role '{}'", request.role)))?;

    let no_induk = request.no_induk.trim().to_string();
    if no_induk.is_empty() {
        return Err(AppError::Validation("no_induk is required".to_string()));
    }
    let phone = request
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    if let Some(school_id) = request.school_id {
        if School::find_by_id(school_id).one(&state.db).await?.is_none() {
            return Err(AppError::Validation(format!(
                "School {} does not exist",
                school_id
            )));
        }
    }

    if User::find()
        .filter(user::Column::NoInduk.eq(no_induk.as_str()))
        .one(&state.db)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "No induk '{}' is already registered",
            no_induk
        )));
    }

    if let Some(phone) = phone.as_deref() {
        if User::find()
            .filter(user::Column::Phone.eq(phone))
            .one(&state.db)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Phone number '{}' is already registered",
                phone
            )));
        }
    }

    let now = Utc::now();
    let created = user::ActiveModel {
        name: Set(request.name.trim().to_string()),
        no_induk: Set(no_induk),
        phone: Set(phone),
        hashed_password: Set(hash_password(&request.password)?),
        role: Set(role.to_string()),
        school_id: Set(request.school_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(
        created_user_id = created.id,
        role = %role,
        user_id = auth.user_id(),
        "User created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}
