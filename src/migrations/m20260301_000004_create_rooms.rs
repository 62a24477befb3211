//! Migration: Create rooms table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rooms::Name).string().not_null())
                    .col(ColumnDef::new(Rooms::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(Rooms::StatusId).big_integer().null())
                    .col(ColumnDef::new(Rooms::TypeId).big_integer().null())
                    .col(ColumnDef::new(Rooms::ResponsibleUserId).big_integer().null())
                    .col(ColumnDef::new(Rooms::Floor).string().null())
                    .col(ColumnDef::new(Rooms::Building).string().null())
                    .col(ColumnDef::new(Rooms::Notes).string().null())
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rooms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Rooms::Table, Rooms::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Rooms::Table, Rooms::StatusId)
                            .to(RoomStatuses::Table, RoomStatuses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Rooms::Table, Rooms::TypeId)
                            .to(RoomTypes::Table, RoomTypes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Rooms::Table, Rooms::ResponsibleUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_school_id")
                    .table(Rooms::Table)
                    .col(Rooms::SchoolId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rooms::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Rooms {
    Table,
    Id,
    Name,
    #[iden = "school_id"]
    SchoolId,
    #[iden = "status_id"]
    StatusId,
    #[iden = "type_id"]
    TypeId,
    #[iden = "responsible_user_id"]
    ResponsibleUserId,
    Floor,
    Building,
    Notes,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

#[derive(Iden)]
pub enum Schools {
    Table,
    Id,
}

#[derive(Iden)]
#[iden = "room_statuses"]
pub enum RoomStatuses {
    Table,
    Id,
}

#[derive(Iden)]
#[iden = "room_types"]
pub enum RoomTypes {
    Table,
    Id,
}

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
}
