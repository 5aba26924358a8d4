//! Track reclamation of soft-deleted blobs.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_log_files::LogFile;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(LogFile::Table)
                    .add_column(ColumnDef::new(BlobRemovedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(LogFile::Table)
                    .drop_column(BlobRemovedAt)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
struct BlobRemovedAt;
