//! Per-user project countdown blob.
//!
//! The whole collection lives in one nullable text column holding a JSON
//! array; `NULL` means the user never saved anything.

use sea_orm_migration::prelude::*;

use crate::m20261001_000000_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ProjectCountdown {
    #[iden = "project_countdown_data"]
    Data,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(ColumnDef::new(ProjectCountdown::Data).text().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(ProjectCountdown::Data)
                    .to_owned(),
            )
            .await
    }
}
