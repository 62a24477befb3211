use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

#[derive(DeriveMigrationName)]
pub struct Migration;

const CATEGORIES: [(&str, &str); 3] = [
    ("Perabot", "Furniture such as desks, chairs and cabinets"),
    ("Peralatan", "Equipment and devices"),
    ("Buku", "Books and printed material"),
];

const ROOM_STATUSES: [(&str, &str); 3] = [
    ("Baik", "Room is in good condition"),
    ("Perbaikan", "Room is under repair"),
    ("Tidak Digunakan", "Room is not in use"),
];

const ROOM_TYPES: [(&str, &str); 5] = [
    ("Kelas", "Classroom"),
    ("Laboratorium", "Laboratory"),
    ("Perpustakaan", "Library"),
    ("Kantor", "Office"),
    ("Gudang", "Storage"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        use crate::models::prelude::*;

        let db = manager.get_connection();

        if Category::find().count(db).await? == 0 {
            for (name, description) in CATEGORIES {
                category::ActiveModel {
                    name: Set(name.to_string()),
                    description: Set(Some(description.to_string())),
                    ..Default::default()
                }
                .insert(db)
                .await?;
            }
        }

        if RoomStatus::find().count(db).await? == 0 {
            for (name, description) in ROOM_STATUSES {
                room_status::ActiveModel {
                    name: Set(name.to_string()),
                    description: Set(Some(description.to_string())),
                    ..Default::default()
                }
                .insert(db)
                .await?;
            }
        }

        if RoomType::find().count(db).await? == 0 {
            for (name, description) in ROOM_TYPES {
                room_type::ActiveModel {
                    name: Set(name.to_string()),
                    description: Set(Some(description.to_string())),
                    ..Default::default()
                }
                .insert(db)
                .await?;
            }
        }

        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Seeding is not reversible - reference rows may be in use
        Ok(())
    }
}
