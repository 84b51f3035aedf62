//! Create post group table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostGroup::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostGroup::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostGroup::Title).string_len(200).not_null())
                    .col(ColumnDef::new(PostGroup::Slug).string_len(64).not_null())
                    .col(ColumnDef::new(PostGroup::Description).text().not_null())
                    .col(
                        ColumnDef::new(PostGroup::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: slug
        manager
            .create_index(
                Index::create()
                    .name("idx_post_group_slug")
                    .table(PostGroup::Table)
                    .col(PostGroup::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostGroup::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PostGroup {
    Table,
    Id,
    Title,
    Slug,
    Description,
    CreatedAt,
}
