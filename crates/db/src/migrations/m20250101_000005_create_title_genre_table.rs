//! Create title_genre join table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TitleGenre::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TitleGenre::TitleId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TitleGenre::GenreId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TitleGenre::TitleId)
                            .col(TitleGenre::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_title_genre_title")
                            .from(TitleGenre::Table, TitleGenre::TitleId)
                            .to(Title::Table, Title::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_title_genre_genre")
                            .from(TitleGenre::Table, TitleGenre::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_title_genre_genre_id")
                    .table(TitleGenre::Table)
                    .col(TitleGenre::GenreId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TitleGenre::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TitleGenre {
    Table,
    TitleId,
    GenreId,
}

#[derive(DeriveIden)]
enum Title {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Genre {
    Table,
    Id,
}
