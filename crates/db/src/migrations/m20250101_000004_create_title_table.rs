//! Create title table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Title::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Title::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Title::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Title::Description).text())
                    .col(ColumnDef::new(Title::Year).integer().not_null())
                    .col(ColumnDef::new(Title::CategoryId).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_title_category")
                            .from(Title::Table, Title::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_title_category_id")
                    .table(Title::Table)
                    .col(Title::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_title_year")
                    .table(Title::Table)
                    .col(Title::Year)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Title::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Title {
    Table,
    Id,
    Name,
    Description,
    Year,
    CategoryId,
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Id,
}
