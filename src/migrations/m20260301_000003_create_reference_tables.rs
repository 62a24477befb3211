//! Migration: Create categories, room_statuses and room_types lookup tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Lookup::Categories,
            Lookup::RoomStatuses,
            Lookup::RoomTypes,
        ] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Lookup::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Lookup::Name).string().not_null().unique_key())
                        .col(ColumnDef::new(Lookup::Description).string().null())
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Lookup::RoomTypes,
            Lookup::RoomStatuses,
            Lookup::Categories,
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden, Clone, Copy)]
enum Lookup {
    #[iden = "categories"]
    Categories,
    #[iden = "room_statuses"]
    RoomStatuses,
    #[iden = "room_types"]
    RoomTypes,
    Id,
    Name,
    Description,
}
