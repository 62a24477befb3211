use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait};

use super::finish;
use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{item, item_transfer};
use crate::services::access::AccessPolicy;
use crate::services::history::{self, HistoryRecord};

/// Delete an item that has never been part of a transfer.
///
/// Items referenced by any transfer record, as source or as destination, can
/// only be reduced to zero through an update.
pub async fn delete_item(db: &DbConn, policy: &AccessPolicy, item_id: i64) -> Result<item::Model> {
    let existing = policy.ensure_item(db, item_id).await?;

    let transfers = ItemTransfer::find()
        .filter(
            Condition::any()
                .add(item_transfer::Column::ItemId.eq(item_id))
                .add(item_transfer::Column::DestinationItemId.eq(item_id)),
        )
        .count(db)
        .await?;
    if transfers > 0 {
        return Err(AppError::Conflict(
            "Cannot delete item with transfer history; reduce quantity instead".to_string(),
        ));
    }

    let txn = db.begin().await?;
    let result = async {
        history::append(
            &txn,
            HistoryRecord::Delete {
                item: existing.clone(),
                user_id: policy.user_id(),
            },
        )
        .await?;
        Item::delete_by_id(item_id).exec(&txn).await?;
        Ok::<_, AppError>(())
    }
    .await;
    finish(txn, result, "item deletion").await?;

    tracing::info!(
        item_id,
        room_id = existing.room_id,
        quantity = existing.quantity,
        user_id = ?policy.user_id(),
        "Item deleted"
    );
    Ok(existing)
}
