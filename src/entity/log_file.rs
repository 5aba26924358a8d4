//! LogFile entity for SeaORM.
//!
//! One row per uploaded blob. Rows are never hard-deleted; `is_deleted` hides
//! them from every read and `blob_removed_at` records that the blob was reclaimed.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "log_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Timestamp-prefixed, sanitised name of the blob on disk.
    pub filename: String,
    /// Name supplied by the uploader, shown to clients.
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    /// SHA-256 hex digest, unique among active rows.
    pub file_hash: Option<String>,
    pub upload_time: DateTimeUtc,
    pub client_info: Option<String>,
    pub is_deleted: bool,
    pub blob_removed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
