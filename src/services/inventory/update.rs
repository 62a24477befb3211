use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{finish, non_blank, require_category, require_room};
use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::item;
use crate::services::access::AccessPolicy;
use crate::services::history::{self, HistoryRecord};

/// Proposed new values for an item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub name: String,
    pub category_id: i64,
    /// Falls back to the current room when absent
    pub room_id: Option<i64>,
    /// Coerced to an integer; non-numeric or missing counts as 0
    pub quantity: Option<Value>,
    pub condition: String,
    pub acquisition_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// The item fields that take part in change detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSnapshot {
    pub name: String,
    pub category_id: i64,
    pub room_id: i64,
    pub quantity: i64,
    pub condition: String,
}

impl From<&item::Model> for ItemSnapshot {
    fn from(model: &item::Model) -> Self {
        Self {
            name: model.name.clone(),
            category_id: model.category_id,
            room_id: model.room_id,
            quantity: i64::from(model.quantity),
            condition: model.condition.clone(),
        }
    }
}

/// Coerce a loosely typed quantity into an integer
fn coerce_quantity(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// Human-readable list of what changed between two snapshots.
///
/// Quantity, name and condition are compared individually. Only when none of
/// those differ is the whole snapshot compared, and any remaining difference is
/// reported as "Other properties updated". An empty list means nothing changed.
pub fn diff_item(old: &ItemSnapshot, new: &ItemSnapshot) -> Vec<String> {
    let mut changes = Vec::new();

    if old.quantity != new.quantity {
        changes.push(format!(
            "Quantity changed from {} to {}",
            old.quantity, new.quantity
        ));
    }
    if old.name != new.name {
        changes.push(format!("Name changed from '{}' to '{}'", old.name, new.name));
    }
    if old.condition != new.condition {
        changes.push(format!(
            "Condition changed from '{}' to '{}'",
            old.condition, new.condition
        ));
    }

    if changes.is_empty() {
        let before = serde_json::to_value(old).ok();
        let after = serde_json::to_value(new).ok();
        if before != after {
            changes.push("Other properties updated".to_string());
        }
    }

    changes
}

/// Update an item, writing an `update` history row when something changed.
///
/// Category and room references are checked before the transaction opens. The
/// acting user must reach the item and, when it moves, the new room.
pub async fn update_item(
    db: &DbConn,
    policy: &AccessPolicy,
    item_id: i64,
    request: UpdateItemRequest,
) -> Result<item::Model> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    let condition = request.condition.trim().to_string();
    if condition.is_empty() {
        return Err(AppError::Validation("condition is required".to_string()));
    }

    let quantity = coerce_quantity(request.quantity.as_ref());
    if quantity < 0 {
        return Err(AppError::Validation(
            "quantity cannot be negative".to_string(),
        ));
    }
    let quantity = i32::try_from(quantity)
        .map_err(|_| AppError::Validation("quantity is too large".to_string()))?;

    let existing = policy.ensure_item(db, item_id).await?;

    let room_id = request.room_id.unwrap_or(existing.room_id);
    require_category(db, request.category_id).await?;
    require_room(db, room_id).await?;

    if room_id != existing.room_id {
        policy.ensure_room(db, room_id).await?;
    }

    let txn = db.begin().await?;
    let result = async {
        let before = ItemSnapshot::from(&existing);
        let after = ItemSnapshot {
            name: name.clone(),
            category_id: request.category_id,
            room_id,
            quantity: i64::from(quantity),
            condition: condition.clone(),
        };
        let changes = diff_item(&before, &after);

        let mut active: item::ActiveModel = existing.clone().into();
        active.name = Set(name);
        active.category_id = Set(request.category_id);
        active.room_id = Set(room_id);
        active.quantity = Set(quantity);
        active.condition = Set(condition);
        active.acquisition_date = Set(request.acquisition_date);
        active.notes = Set(non_blank(request.notes));
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        if !changes.is_empty() {
            history::append(
                &txn,
                HistoryRecord::Update {
                    item: updated.clone(),
                    changes: changes.clone(),
                    user_id: policy.user_id(),
                },
            )
            .await?;
        }

        Ok::<_, AppError>((updated, changes))
    }
    .await;
    let (updated, changes) = finish(txn, result, "item update").await?;

    if changes.is_empty() {
        tracing::debug!(item_id, "Item saved without tracked changes");
    } else {
        tracing::info!(
            item_id,
            room_id = updated.room_id,
            quantity = updated.quantity,
            user_id = ?policy.user_id(),
            changes = %changes.join("; "),
            "Item updated"
        );
    }
    Ok(updated)
}
