//! Migration: admin audit log.
//!
//! No foreign keys: the log outlives the users and listings it mentions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminActions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminActions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminActions::AdminId).uuid().not_null())
                    .col(ColumnDef::new(AdminActions::Action).string_len(32).not_null())
                    .col(
                        ColumnDef::new(AdminActions::TargetType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminActions::TargetId).uuid().not_null())
                    .col(ColumnDef::new(AdminActions::Details).text().null())
                    .col(
                        ColumnDef::new(AdminActions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_actions_created")
                    .table(AdminActions::Table)
                    .col(AdminActions::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminActions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AdminActions {
    Table,
    Id,
    AdminId,
    Action,
    TargetType,
    TargetId,
    Details,
    CreatedAt,
}
