//! Password hashing and cookie session storage

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

use crate::config::auth::BootstrapAdmin;

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::user::Role;
use crate::models::{session, user};

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Look up a user by `no_induk` and check the password
pub async fn authenticate(db: &DbConn, no_induk: &str, password: &str) -> Result<user::Model> {
    let found = User::find()
        .filter(user::Column::NoInduk.eq(no_induk.trim()))
        .one(db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(password, &found.hashed_password) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    Ok(found)
}

/// Create a session for a user, valid for `ttl_hours`
pub async fn create_session(db: &DbConn, user_id: i64, ttl_hours: i64) -> Result<session::Model> {
    let now = Utc::now();
    let new_session = session::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        user_id: Set(user_id),
        created_at: Set(now),
        expires_at: Set(now + Duration::hours(ttl_hours)),
    };

    Ok(new_session.insert(db).await?)
}

/// Resolve a session id into its user, ignoring expired sessions
pub async fn resolve_session(db: &DbConn, session_id: &str) -> Result<Option<user::Model>> {
    let found = Session::find_by_id(session_id.to_string())
        .filter(session::Column::ExpiresAt.gt(Utc::now()))
        .find_also_related(User)
        .one(db)
        .await?;

    Ok(found.and_then(|(_, user)| user))
}

/// Delete a session (logout)
pub async fn delete_session(db: &DbConn, session_id: &str) -> Result<()> {
    Session::delete_by_id(session_id.to_string()).exec(db).await?;
    Ok(())
}

/// Remove expired sessions, returning how many were deleted
pub async fn purge_expired_sessions(db: &DbConn) -> Result<u64> {
    let result = Session::delete_many()
        .filter(session::Column::ExpiresAt.lte(Utc::now()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Create the first admin account when the users table is empty.
///
/// Returns `true` when an account was created.
pub async fn ensure_admin(db: &DbConn, admin: &BootstrapAdmin) -> Result<bool> {
    if User::find().count(db).await? > 0 {
        return Ok(false);
    }

    let now = Utc::now();
    user::ActiveModel {
        name: Set("Administrator".to_string()),
        no_induk: Set(admin.no_induk.clone()),
        phone: Set(None),
        hashed_password: Set(hash_password(&admin.password)?),
        role: Set(Role::Admin.to_string()),
        school_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(no_induk = %admin.no_induk, "Created bootstrap admin account");
    Ok(true)
}
