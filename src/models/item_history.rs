use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit row; one per item mutation
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_id: Option<i64>,
    /// Item name at the time of the action
    pub item_name: String,
    pub room_id: Option<i64>,
    pub action_type: String,
    pub quantity: i32,
    pub notes: Option<String>,
    pub action_date: DateTimeUtc,
    pub user_id: Option<i64>,
    pub source_room_id: Option<i64>,
    pub destination_room_id: Option<i64>,
    pub source_room_name: Option<String>,
    pub destination_room_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// History action types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Add,
    Delete,
    Transfer,
    Update,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [
        ActionType::Add,
        ActionType::Delete,
        ActionType::Transfer,
        ActionType::Update,
    ];
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Add => write!(f, "add"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::Transfer => write!(f, "transfer"),
            ActionType::Update => write!(f, "update"),
        }
    }
}

impl std::str::FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(ActionType::Add),
            "delete" => Ok(ActionType::Delete),
            "transfer" => Ok(ActionType::Transfer),
            "update" => Ok(ActionType::Update),
            other => Err(format!("unknown action type: {}", other)),
        }
    }
}
