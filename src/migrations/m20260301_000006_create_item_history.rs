//! Migration: Create item_history table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ItemHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ItemHistory::ItemId).big_integer().null())
                    .col(ColumnDef::new(ItemHistory::ItemName).string().not_null())
                    .col(ColumnDef::new(ItemHistory::RoomId).big_integer().null())
                    .col(ColumnDef::new(ItemHistory::ActionType).string().not_null())
                    .col(ColumnDef::new(ItemHistory::Quantity).integer().not_null())
                    .col(ColumnDef::new(ItemHistory::Notes).string().null())
                    .col(
                        ColumnDef::new(ItemHistory::ActionDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ItemHistory::UserId).big_integer().null())
                    .col(ColumnDef::new(ItemHistory::SourceRoomId).big_integer().null())
                    .col(
                        ColumnDef::new(ItemHistory::DestinationRoomId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ItemHistory::SourceRoomName).string().null())
                    .col(
                        ColumnDef::new(ItemHistory::DestinationRoomName)
                            .string()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemHistory::Table, ItemHistory::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemHistory::Table, ItemHistory::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemHistory::Table, ItemHistory::SourceRoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemHistory::Table, ItemHistory::DestinationRoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemHistory::Table, ItemHistory::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_item_history_action_date", ItemHistory::ActionDate),
            ("idx_item_history_item_id", ItemHistory::ItemId),
            ("idx_item_history_room_id", ItemHistory::RoomId),
            ("idx_item_history_action_type", ItemHistory::ActionType),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(ItemHistory::Table)
                        .col(col)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemHistory::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "item_history"]
pub enum ItemHistory {
    Table,
    Id,
    #[iden = "item_id"]
    ItemId,
    #[iden = "item_name"]
    ItemName,
    #[iden = "room_id"]
    RoomId,
    #[iden = "action_type"]
    ActionType,
    Quantity,
    Notes,
    #[iden = "action_date"]
    ActionDate,
    #[iden = "user_id"]
    UserId,
    #[iden = "source_room_id"]
    SourceRoomId,
    #[iden = "destination_room_id"]
    DestinationRoomId,
    #[iden = "source_room_name"]
    SourceRoomName,
    #[iden = "destination_room_name"]
    DestinationRoomName,
}

#[derive(Iden)]
pub enum Items {
    Table,
    Id,
}

#[derive(Iden)]
pub enum Rooms {
    Table,
    Id,
}

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
}
