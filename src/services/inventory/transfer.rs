use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;

use super::{finish, non_blank};
use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{item, item_transfer, room};
use crate::services::access::AccessPolicy;
use crate::services::history::{self, describe_transfers, HistoryRecord, TransferEntry};

/// Move `quantity` units of an item from one room to another
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferRequest {
    pub item_id: Option<i64>,
    pub from_room_id: Option<i64>,
    pub to_room_id: Option<i64>,
    pub quantity: Option<i64>,
    pub transferred_by_user_id: Option<i64>,
    pub notes: Option<String>,
}

/// Validated transfer input
struct TransferPlan {
    source: item::Model,
    from: room::Model,
    to: room::Model,
    quantity: i32,
    user_id: Option<i64>,
    notes: Option<String>,
}

/// Transfer item quantity between rooms.
///
/// Checks run in a fixed order, each failing fast:
/// 1. ids present and `quantity > 0` (`Validation`)
/// 2. source and destination rooms differ (`Validation`)
/// 3. the item exists in the source room (`NotFound`)
/// 4. the item holds at least `quantity` units (`InsufficientQuantity`)
/// 5. the destination room exists (`NotFound`)
///
/// The acting user must be able to reach both rooms (`Forbidden`).
///
/// The move itself is one transaction: decrement the source, merge into a
/// destination row with the same name and category (or create one), write the
/// `item_transfers` and `item_history` rows, and drop the source row if it
/// reached zero.
/// A merge whose sum would not fit a quantity is a `Validation` error and
/// leaves every row untouched.
pub async fn transfer_item(
    db: &DbConn,
    policy: &AccessPolicy,
    request: TransferRequest,
) -> Result<TransferEntry> {
    let plan = plan_transfer(db, policy, request).await?;

    let item_id = plan.source.id;
    let from_room_id = plan.from.id;
    let to_room_id = plan.to.id;
    let quantity = plan.quantity;

    let txn = db.begin().await?;
    let result = apply_transfer(&txn, plan).await;
    let record = finish(txn, result, "transfer").await?;

    tracing::info!(
        transfer_id = record.id,
        item_id,
        from_room_id,
        to_room_id,
        quantity,
        user_id = ?record.transferred_by_user_id,
        "Item transferred"
    );

    let mut described = describe_transfers(db, vec![record]).await?;
    described
        .pop()
        .ok_or_else(|| AppError::Internal("Transfer record vanished after commit".to_string()))
}

async fn plan_transfer(
    db: &DbConn,
    policy: &AccessPolicy,
    request: TransferRequest,
) -> Result<TransferPlan> {
    let (item_id, from_room_id, to_room_id, requested) = match (
        request.item_id,
        request.from_room_id,
        request.to_room_id,
        request.quantity,
    ) {
        (Some(item_id), Some(from), Some(to), Some(quantity)) if quantity > 0 => {
            (item_id, from, to, quantity)
        }
        _ => {
            return Err(AppError::Validation(
                "item_id, from_room_id, to_room_id and a quantity greater than 0 are required"
                    .to_string(),
            ))
        }
    };

    if from_room_id == to_room_id {
        return Err(AppError::Validation(
            "Cannot transfer to same room".to_string(),
        ));
    }

    let source = Item::find_by_id(item_id)
        .filter(item::Column::RoomId.eq(from_room_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Item {} not found in room {}",
                item_id, from_room_id
            ))
        })?;

    let from = policy.ensure_room(db, from_room_id).await?;

    let quantity = i32::try_from(requested)
        .map_err(|_| AppError::Validation(format!("quantity {} is too large", requested)))?;
    if source.quantity < quantity {
        return Err(AppError::InsufficientQuantity {
            available: source.quantity,
            requested: quantity,
        });
    }

    let to = policy.ensure_room(db, to_room_id).await?;

    Ok(TransferPlan {
        source,
        from,
        to,
        quantity,
        // The acting user wins; the request field is for callers without one
        user_id: policy.user_id().or(request.transferred_by_user_id),
        notes: non_blank(request.notes),
    })
}

async fn apply_transfer(
    txn: &DatabaseTransaction,
    plan: TransferPlan,
) -> Result<item_transfer::Model> {
    let TransferPlan {
        source,
        from,
        to,
        quantity,
        user_id,
        notes,
    } = plan;
    let now = Utc::now();

    // Merge only on an exact (name, category, room) match
    let existing = Item::find()
        .filter(item::Column::Name.eq(source.name.as_str()))
        .filter(item::Column::CategoryId.eq(source.category_id))
        .filter(item::Column::RoomId.eq(to.id))
        .one(txn)
        .await?;

    let merge = match existing {
        Some(found) => {
            let merged_quantity = found.quantity.checked_add(quantity).ok_or_else(|| {
                AppError::Validation(format!(
                    "Room {} already holds {} of '{}'; adding {} exceeds the maximum quantity",
                    to.name, found.quantity, found.name, quantity
                ))
            })?;
            Some((found, merged_quantity))
        }
        None => None,
    };

    let remaining = source.quantity - quantity;
    let mut decremented: item::ActiveModel = source.clone().into();
    decremented.quantity = Set(remaining);
    decremented.updated_at = Set(now);
    decremented.update(txn).await?;

    let destination = match merge {
        Some((found, merged_quantity)) => {
            let mut merged: item::ActiveModel = found.into();
            merged.quantity = Set(merged_quantity);
            merged.updated_at = Set(now);
            merged.update(txn).await?
        }
        None => {
            item::ActiveModel {
                name: Set(source.name.clone()),
                category_id: Set(source.category_id),
                room_id: Set(to.id),
                quantity: Set(quantity),
                condition: Set(source.condition.clone()),
                acquisition_date: Set(source.acquisition_date),
                notes: Set(source.notes.clone()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(txn)
            .await?
        }
    };

    let record = item_transfer::ActiveModel {
        item_id: Set(Some(source.id)),
        destination_item_id: Set(Some(destination.id)),
        item_name: Set(source.name.clone()),
        quantity: Set(quantity),
        from_room_id: Set(Some(from.id)),
        to_room_id: Set(Some(to.id)),
        transferred_by_user_id: Set(user_id),
        notes: Set(notes.clone()),
        transfer_date: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    history::append(
        txn,
        HistoryRecord::Transfer {
            item_id: source.id,
            item_name: source.name.clone(),
            quantity,
            from,
            to,
            notes,
            user_id,
        },
    )
    .await?;

    // Fully consumed; the FK nulls item_id on the rows written above
    if remaining <= 0 {
        Item::delete_by_id(source.id).exec(txn).await?;
    }

    // Re-read so the returned row reflects any nulled reference
    ItemTransfer::find_by_id(record.id)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::Internal("Transfer record missing after insert".to_string()))
}
