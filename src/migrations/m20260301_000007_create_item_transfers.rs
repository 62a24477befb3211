//! Migration: Create item_transfers table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ItemTransfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemTransfers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ItemTransfers::ItemId).big_integer().null())
                    .col(
                        ColumnDef::new(ItemTransfers::DestinationItemId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ItemTransfers::ItemName).string().not_null())
                    .col(
                        ColumnDef::new(ItemTransfers::Quantity)
                            .integer()
                            .not_null()
                            .check(Expr::col(ItemTransfers::Quantity).gt(0)),
                    )
                    .col(ColumnDef::new(ItemTransfers::FromRoomId).big_integer().null())
                    .col(ColumnDef::new(ItemTransfers::ToRoomId).big_integer().null())
                    .col(
                        ColumnDef::new(ItemTransfers::TransferredByUserId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ItemTransfers::Notes).string().null())
                    .col(
                        ColumnDef::new(ItemTransfers::TransferDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemTransfers::Table, ItemTransfers::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemTransfers::Table, ItemTransfers::DestinationItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemTransfers::Table, ItemTransfers::FromRoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemTransfers::Table, ItemTransfers::ToRoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ItemTransfers::Table, ItemTransfers::TransferredByUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_item_transfers_transfer_date", ItemTransfers::TransferDate),
            ("idx_item_transfers_item_id", ItemTransfers::ItemId),
            ("idx_item_transfers_destination_item_id", ItemTransfers::DestinationItemId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(ItemTransfers::Table)
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
            .drop_table(Table::drop().table(ItemTransfers::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "item_transfers"]
pub enum ItemTransfers {
    Table,
    Id,
    #[iden = "item_id"]
    ItemId,
    #[iden = "destination_item_id"]
    DestinationItemId,
    #[iden = "item_name"]
    ItemName,
    Quantity,
    #[iden = "from_room_id"]
    FromRoomId,
    #[iden = "to_room_id"]
    ToRoomId,
    #[iden = "transferred_by_user_id"]
    TransferredByUserId,
    Notes,
    #[iden = "transfer_date"]
    TransferDate,
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
