//! Migration: Create items table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .col(ColumnDef::new(Items::CategoryId).big_integer().not_null())
                    .col(ColumnDef::new(Items::RoomId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Items::Quantity)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Items::Quantity).gte(0)),
                    )
                    .col(ColumnDef::new(Items::Condition).string().not_null())
                    .col(ColumnDef::new(Items::AcquisitionDate).date().null())
                    .col(ColumnDef::new(Items::Notes).string().null())
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Items::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Items::Table, Items::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Items::Table, Items::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Merge lookups during transfers hit (room_id, name, category_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_items_room_name_category")
                    .table(Items::Table)
                    .col(Items::RoomId)
                    .col(Items::Name)
                    .col(Items::CategoryId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Items::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Items {
    Table,
    Id,
    Name,
    #[iden = "category_id"]
    CategoryId,
    #[iden = "room_id"]
    RoomId,
    Quantity,
    Condition,
    #[iden = "acquisition_date"]
    AcquisitionDate,
    Notes,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

#[derive(Iden)]
pub enum Categories {
    Table,
    Id,
}

#[derive(Iden)]
pub enum Rooms {
    Table,
    Id,
}
