pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_schools;
mod m20260301_000002_create_users;
mod m20260301_000003_create_reference_tables;
mod m20260301_000004_create_rooms;
mod m20260301_000005_create_items;
mod m20260301_000006_create_item_history;
mod m20260301_000007_create_item_transfers;
mod m20260301_000008_create_sessions;
mod m20260301_000009_seed_reference_data;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_schools::Migration),
            Box::new(m20260301_000002_create_users::Migration),
            Box::new(m20260301_000003_create_reference_tables::Migration),
            Box::new(m20260301_000004_create_rooms::Migration),
            Box::new(m20260301_000005_create_items::Migration),
            Box::new(m20260301_000006_create_item_history::Migration),
            Box::new(m20260301_000007_create_item_transfers::Migration),
            Box::new(m20260301_000008_create_sessions::Migration),
            Box::new(m20260301_000009_seed_reference_data::Migration),
        ]
    }
}
