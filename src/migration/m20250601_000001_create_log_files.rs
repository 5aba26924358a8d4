//! Create log_files table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LogFile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LogFile::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LogFile::Filename).string_len(255).not_null())
                    .col(
                        ColumnDef::new(LogFile::OriginalFilename)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LogFile::FilePath).string_len(500).not_null())
                    .col(ColumnDef::new(LogFile::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(LogFile::FileHash).string_len(64))
                    .col(
                        ColumnDef::new(LogFile::UploadTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(LogFile::ClientInfo).string_len(500))
                    .col(
                        ColumnDef::new(LogFile::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_log_files_upload_time")
                    .table(LogFile::Table)
                    .col(LogFile::UploadTime)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Fingerprints are unique among active rows only; a deleted upload may be re-uploaded.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_log_files_active_hash \
                 ON log_files (file_hash) WHERE is_deleted = FALSE",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LogFile::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum LogFile {
    Table,
    Id,
    Filename,
    OriginalFilename,
    FilePath,
    FileSize,
    FileHash,
    UploadTime,
    ClientInfo,
    IsDeleted,
}
