use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Source item row; nulled once that row is consumed or removed
    pub item_id: Option<i64>,
    /// Destination item row the quantity was merged into or created as
    pub destination_item_id: Option<i64>,
    pub item_name: String,
    pub quantity: i32,
    pub from_room_id: Option<i64>,
    pub to_room_id: Option<i64>,
    pub transferred_by_user_id: Option<i64>,
    pub notes: Option<String>,
    pub transfer_date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
