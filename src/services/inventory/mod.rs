//! Mutation engine for items
//!
//! Every write here changes current item state and appends the matching audit
//! row inside one database transaction. Input validation and existence checks
//! run before the transaction opens. Once it is open, any error rolls back
//! every write before it is returned.

mod delete;
mod transfer;
mod update;

pub use delete::delete_item;
pub use transfer::{transfer_item, TransferRequest};
pub use update::{diff_item, update_item, ItemSnapshot, UpdateItemRequest};

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, Set, TransactionTrait,
};
use serde::Deserialize;
use validator::Validate;

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::item;
use crate::models::prelude::*;
use crate::services::access::AccessPolicy;
use crate::services::history::{self, HistoryRecord};

/// Commit on success, roll back on error
async fn finish<T>(txn: DatabaseTransaction, result: Result<T>, operation: &str) -> Result<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            tracing::warn!("{} rolled back: {}", operation, err);
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Rollback of {} failed: {}", operation, rollback_err);
            }
            Err(err)
        }
    }
}

/// Require that a category exists; a dangling reference is a validation error
async fn require_category<C: ConnectionTrait>(db: &C, category_id: i64) -> Result<()> {
    Category::find_by_id(category_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::Validation(format!("Category {} does not exist", category_id)))
}

/// Require that a room exists; a dangling reference is a validation error
async fn require_room<C: ConnectionTrait>(db: &C, room_id: i64) -> Result<()> {
    Room::find_by_id(room_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::Validation(format!("Room {} does not exist", room_id)))
}

/// Blank optional text is stored as NULL
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category_id: i64,
    pub room_id: i64,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(length(min = 1, max = 50))]
    pub condition: String,
    pub acquisition_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Add a new item to a room, recording an `add` history row
pub async fn create_item(
    db: &DbConn,
    policy: &AccessPolicy,
    request: CreateItemRequest,
) -> Result<item::Model> {
    request.validate()?;
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }

    require_category(db, request.category_id).await?;
    require_room(db, request.room_id).await?;
    policy.ensure_room(db, request.room_id).await?;

    let now = Utc::now();
    let new_item = item::ActiveModel {
        name: Set(name),
        category_id: Set(request.category_id),
        room_id: Set(request.room_id),
        quantity: Set(request.quantity),
        condition: Set(request.condition.trim().to_string()),
        acquisition_date: Set(request.acquisition_date),
        notes: Set(non_blank(request.notes)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let txn = db.begin().await?;
    let result = async {
        let created = new_item.insert(&txn).await?;
        history::append(
            &txn,
            HistoryRecord::Add {
                item: created.clone(),
                user_id: policy.user_id(),
            },
        )
        .await?;
        Ok::<_, AppError>(created)
    }
    .await;
    let created = finish(txn, result, "item creation").await?;

    tracing::info!(
        item_id = created.id,
        room_id = created.room_id,
        quantity = created.quantity,
        user_id = ?policy.user_id(),
        "Item added"
    );
    Ok(created)
}
