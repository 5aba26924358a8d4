//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_log_files;
mod m20250601_000002_add_blob_removed_at;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_log_files::Migration),
            Box::new(m20250601_000002_add_blob_removed_at::Migration),
        ]
    }
}
