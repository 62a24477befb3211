//! Item audit trail: writing `item_history` rows and reading both audit logs
//!
//! History rows are only ever inserted, never updated or deleted. Every writer
//! here takes the caller's connection so the row lands in the same transaction
//! as the state change it describes.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::db::DbConn;
use crate::error::Result;
use crate::models::item_history::{self, ActionType};
use crate::models::prelude::*;
use crate::models::{item, item_transfer, room};
use crate::services::access::SchoolScope;

// ============================================================================
// Writing
// ============================================================================

/// One audit entry to append, shaped per action kind
#[derive(Debug, Clone)]
pub enum HistoryRecord {
    Add {
        item: item::Model,
        user_id: Option<i64>,
    },
    Delete {
        item: item::Model,
        user_id: Option<i64>,
    },
    Update {
        item: item::Model,
        changes: Vec<String>,
        user_id: Option<i64>,
    },
    Transfer {
        item_id: i64,
        item_name: String,
        quantity: i32,
        from: room::Model,
        to: room::Model,
        notes: Option<String>,
        user_id: Option<i64>,
    },
}

impl HistoryRecord {
    pub fn action_type(&self) -> ActionType {
        match self {
            HistoryRecord::Add { .. } => ActionType::Add,
            HistoryRecord::Delete { .. } => ActionType::Delete,
            HistoryRecord::Update { .. } => ActionType::Update,
            HistoryRecord::Transfer { .. } => ActionType::Transfer,
        }
    }

    fn into_active_model(self) -> item_history::ActiveModel {
        let now = Utc::now();
        match self {
            HistoryRecord::Add { item, user_id } => add_row(item, user_id, now),
            HistoryRecord::Delete { item, user_id } => delete_row(item, user_id, now),
            HistoryRecord::Update {
                item,
                changes,
                user_id,
            } => update_row(item, changes, user_id, now),
            HistoryRecord::Transfer {
                item_id,
                item_name,
                quantity,
                from,
                to,
                notes,
                user_id,
            } => {
                let notes = notes.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| {
                    format!(
                        "Transferred {} from {} to {}",
                        quantity, from.name, to.name
                    )
                });
                item_history::ActiveModel {
                    item_id: Set(Some(item_id)),
                    item_name: Set(item_name),
                    room_id: Set(Some(from.id)),
                    action_type: Set(ActionType::Transfer.to_string()),
                    quantity: Set(quantity),
                    notes: Set(Some(notes)),
                    action_date: Set(now),
                    user_id: Set(user_id),
                    source_room_id: Set(Some(from.id)),
                    destination_room_id: Set(Some(to.id)),
                    source_room_name: Set(Some(from.name)),
                    destination_room_name: Set(Some(to.name)),
                    ..Default::default()
                }
            }
        }
    }
}

fn add_row(
    item: item::Model,
    user_id: Option<i64>,
    now: chrono::DateTime<Utc>,
) -> item_history::ActiveModel {
    item_history::ActiveModel {
        item_id: Set(Some(item.id)),
        notes: Set(Some(format!("Item added: {}", item.name))),
        item_name: Set(item.name),
        room_id: Set(Some(item.room_id)),
        action_type: Set(ActionType::Add.to_string()),
        quantity: Set(item.quantity),
        action_date: Set(now),
        user_id: Set(user_id),
        destination_room_id: Set(Some(item.room_id)),
        ..Default::default()
    }
}

fn delete_row(
    item: item::Model,
    user_id: Option<i64>,
    now: chrono::DateTime<Utc>,
) -> item_history::ActiveModel {
    item_history::ActiveModel {
        item_id: Set(Some(item.id)),
        notes: Set(Some(format!("Item deleted: {}", item.name))),
        item_name: Set(item.name),
        room_id: Set(Some(item.room_id)),
        action_type: Set(ActionType::Delete.to_string()),
        quantity: Set(item.quantity),
        action_date: Set(now),
        user_id: Set(user_id),
        source_room_id: Set(Some(item.room_id)),
        ..Default::default()
    }
}

/// `quantity` is the new quantity, not a delta
fn update_row(
    item: item::Model,
    changes: Vec<String>,
    user_id: Option<i64>,
    now: chrono::DateTime<Utc>,
) -> item_history::ActiveModel {
    item_history::ActiveModel {
        item_id: Set(Some(item.id)),
        item_name: Set(item.name),
        room_id: Set(Some(item.room_id)),
        action_type: Set(ActionType::Update.to_string()),
        quantity: Set(item.quantity),
        notes: Set(Some(changes.join("; "))),
        action_date: Set(now),
        user_id: Set(user_id),
        ..Default::default()
    }
}

/// Append one history row on the given connection or transaction
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    record: HistoryRecord,
) -> Result<item_history::Model> {
    let action = record.action_type();
    let row = record.into_active_model().insert(conn).await?;
    tracing::debug!(
        history_id = row.id,
        item_id = ?row.item_id,
        action = %action,
        "History recorded"
    );
    Ok(row)
}

// ============================================================================
// Reading
// ============================================================================

/// Treat `?room_id=` the same as an absent parameter
pub(crate) fn empty_as_none<'de, D, T>(de: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Filters for `GET /history`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    /// Matches the room the action happened in, or either side of a transfer
    #[serde(default, deserialize_with = "empty_as_none")]
    pub room_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub item_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub action_type: Option<String>,
}

/// Filters for `GET /transfers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferQuery {
    /// Matches the source item or the destination item
    #[serde(default, deserialize_with = "empty_as_none")]
    pub item_id: Option<i64>,
    /// Matches either side of the transfer
    #[serde(default, deserialize_with = "empty_as_none")]
    pub room_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from_room_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to_room_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub user_id: Option<i64>,
}

/// History row enriched with display names
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: item_history::Model,
    pub user_name: Option<String>,
    pub room_name: Option<String>,
    pub school_name: Option<String>,
    pub source_school_name: Option<String>,
    pub destination_school_name: Option<String>,
}

/// Transfer row enriched with display names
#[derive(Debug, Clone, Serialize)]
pub struct TransferEntry {
    #[serde(flatten)]
    pub record: item_transfer::Model,
    pub from_room_name: Option<String>,
    pub to_room_name: Option<String>,
    pub from_school_name: Option<String>,
    pub to_school_name: Option<String>,
    pub transferred_by_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionCount {
    pub action_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryStats {
    pub total_events: u64,
    pub by_action: Vec<ActionCount>,
    pub total_transfers: u64,
}

/// Room ids reachable under a scope, `None` meaning unrestricted
async fn scoped_room_ids(db: &DbConn, scope: SchoolScope) -> Result<Option<Vec<i64>>> {
    match scope {
        SchoolScope::All => Ok(None),
        SchoolScope::None => Ok(Some(vec![])),
        SchoolScope::School(school_id) => {
            let rooms = Room::find()
                .filter(room::Column::SchoolId.eq(school_id))
                .all(db)
                .await?;
            Ok(Some(rooms.into_iter().map(|r| r.id).collect()))
        }
    }
}

/// Lookup tables for display names
#[derive(Default)]
struct NameLookup {
    rooms: HashMap<i64, room::Model>,
    schools: HashMap<i64, String>,
    users: HashMap<i64, String>,
}

impl NameLookup {
    async fn load(
        db: &DbConn,
        room_ids: HashSet<i64>,
        user_ids: HashSet<i64>,
    ) -> Result<Self> {
        use crate::models::{school, user};

        let mut lookup = NameLookup::default();

        if !room_ids.is_empty() {
            let rooms = Room::find()
                .filter(room::Column::Id.is_in(room_ids))
                .all(db)
                .await?;

            let school_ids: HashSet<i64> = rooms.iter().map(|r| r.school_id).collect();
            if !school_ids.is_empty() {
                lookup.schools = School::find()
                    .filter(school::Column::Id.is_in(school_ids))
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|s| (s.id, s.name))
                    .collect();
            }

            lookup.rooms = rooms.into_iter().map(|r| (r.id, r)).collect();
        }

        if !user_ids.is_empty() {
            lookup.users = User::find()
                .filter(user::Column::Id.is_in(user_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|u| (u.id, u.name))
                .collect();
        }

        Ok(lookup)
    }

    fn room_name(&self, room_id: Option<i64>) -> Option<String> {
        room_id
            .and_then(|id| self.rooms.get(&id))
            .map(|r| r.name.clone())
    }

    fn school_name(&self, room_id: Option<i64>) -> Option<String> {
        room_id
            .and_then(|id| self.rooms.get(&id))
            .and_then(|r| self.schools.get(&r.school_id))
            .cloned()
    }

    fn user_name(&self, user_id: Option<i64>) -> Option<String> {
        user_id.and_then(|id| self.users.get(&id)).cloned()
    }
}

/// List history rows, most recent first
pub async fn list_history(
    db: &DbConn,
    query: &HistoryQuery,
    scope: SchoolScope,
) -> Result<Vec<HistoryEntry>> {
    let mut select = ItemHistory::find();

    if let Some(room_id) = query.room_id {
        select = select.filter(
            Condition::any()
                .add(item_history::Column::RoomId.eq(room_id))
                .add(item_history::Column::SourceRoomId.eq(room_id))
                .add(item_history::Column::DestinationRoomId.eq(room_id)),
        );
    }

    if let Some(item_id) = query.item_id {
        select = select.filter(item_history::Column::ItemId.eq(item_id));
    }

    if let Some(action_type) = query.action_type.as_deref() {
        select = select.filter(item_history::Column::ActionType.eq(action_type));
    }

    if let Some(room_ids) = scoped_room_ids(db, scope).await? {
        select = select.filter(history_scope_filter(room_ids));
    }

    let rows = select
        .order_by_desc(item_history::Column::ActionDate)
        .order_by_desc(item_history::Column::Id)
        .all(db)
        .await?;

    let room_ids: HashSet<i64> = rows
        .iter()
        .flat_map(|r| [r.room_id, r.source_room_id, r.destination_room_id])
        .flatten()
        .collect();
    let user_ids: HashSet<i64> = rows.iter().filter_map(|r| r.user_id).collect();
    let names = NameLookup::load(db, room_ids, user_ids).await?;

    Ok(rows
        .into_iter()
        .map(|record| HistoryEntry {
            user_name: names.user_name(record.user_id),
            room_name: names.room_name(record.room_id),
            school_name: names.school_name(record.room_id),
            source_school_name: names.school_name(record.source_room_id),
            destination_school_name: names.school_name(record.destination_room_id),
            record,
        })
        .collect())
}

/// List transfer rows, most recent first
pub async fn list_transfers(
    db: &DbConn,
    query: &TransferQuery,
    scope: SchoolScope,
) -> Result<Vec<TransferEntry>> {
    let mut select = ItemTransfer::find();

    if let Some(item_id) = query.item_id {
        select = select.filter(
            Condition::any()
                .add(item_transfer::Column::ItemId.eq(item_id))
                .add(item_transfer::Column::DestinationItemId.eq(item_id)),
        );
    }

    if let Some(room_id) = query.room_id {
        select = select.filter(
            Condition::any()
                .add(item_transfer::Column::FromRoomId.eq(room_id))
                .add(item_transfer::Column::ToRoomId.eq(room_id)),
        );
    }

    if let Some(from_room_id) = query.from_room_id {
        select = select.filter(item_transfer::Column::FromRoomId.eq(from_room_id));
    }

    if let Some(to_room_id) = query.to_room_id {
        select = select.filter(item_transfer::Column::ToRoomId.eq(to_room_id));
    }

    if let Some(user_id) = query.user_id {
        select = select.filter(item_transfer::Column::TransferredByUserId.eq(user_id));
    }

    if let Some(room_ids) = scoped_room_ids(db, scope).await? {
        select = select.filter(transfer_scope_filter(room_ids));
    }

    let rows = select
        .order_by_desc(item_transfer::Column::TransferDate)
        .order_by_desc(item_transfer::Column::Id)
        .all(db)
        .await?;

    describe_transfers(db, rows).await
}

/// Attach display names to transfer rows
pub async fn describe_transfers(
    db: &DbConn,
    rows: Vec<item_transfer::Model>,
) -> Result<Vec<TransferEntry>> {
    let room_ids: HashSet<i64> = rows
        .iter()
        .flat_map(|r| [r.from_room_id, r.to_room_id])
        .flatten()
        .collect();
    let user_ids: HashSet<i64> = rows.iter().filter_map(|r| r.transferred_by_user_id).collect();
    let names = NameLookup::load(db, room_ids, user_ids).await?;

    Ok(rows
        .into_iter()
        .map(|record| TransferEntry {
            from_room_name: names.room_name(record.from_room_id),
            to_room_name: names.room_name(record.to_room_id),
            from_school_name: names.school_name(record.from_room_id),
            to_school_name: names.school_name(record.to_room_id),
            transferred_by_name: names.user_name(record.transferred_by_user_id),
            record,
        })
        .collect())
}

fn history_scope_filter(room_ids: Vec<i64>) -> Condition {
    Condition::any()
        .add(item_history::Column::RoomId.is_in(room_ids.clone()))
        .add(item_history::Column::SourceRoomId.is_in(room_ids.clone()))
        .add(item_history::Column::DestinationRoomId.is_in(room_ids))
}

fn transfer_scope_filter(room_ids: Vec<i64>) -> Condition {
    Condition::any()
        .add(item_transfer::Column::FromRoomId.is_in(room_ids.clone()))
        .add(item_transfer::Column::ToRoomId.is_in(room_ids))
}

/// Counts per action type plus the number of transfer records, within a scope
pub async fn history_stats(db: &DbConn, scope: SchoolScope) -> Result<HistoryStats> {
    let room_ids = scoped_room_ids(db, scope).await?;

    let history = || {
        let select = ItemHistory::find();
        match &room_ids {
            Some(ids) => select.filter(history_scope_filter(ids.clone())),
            None => select,
        }
    };

    let total_events = history().count(db).await?;

    let mut by_action = Vec::with_capacity(ActionType::ALL.len());
    for action in ActionType::ALL {
        let count = history()
            .filter(item_history::Column::ActionType.eq(action.to_string()))
            .count(db)
            .await?;
        by_action.push(ActionCount {
            action_type: action.to_string(),
            count,
        });
    }

    let transfers = match &room_ids {
        Some(ids) => ItemTransfer::find().filter(transfer_scope_filter(ids.clone())),
        None => ItemTransfer::find(),
    };
    let total_transfers = transfers.count(db).await?;

    Ok(HistoryStats {
        total_events,
        by_action,
        total_transfers,
    })
}
