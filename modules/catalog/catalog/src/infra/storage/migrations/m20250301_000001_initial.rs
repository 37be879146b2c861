//! Initial schema: accounts, taxonomy, titles, reviews and comments.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(150).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(254).not_null())
                    .col(ColumnDef::new(Users::FirstName).string_len(150).not_null().default(""))
                    .col(ColumnDef::new(Users::LastName).string_len(150).not_null().default(""))
                    .col(ColumnDef::new(Users::Bio).text().not_null().default(""))
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null().default("user"))
                    .col(ColumnDef::new(Users::IsSuperuser).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;
        unique_index(manager, "ux_users_username", Users::Table, &[Users::Username]).await?;
        unique_index(manager, "ux_users_email", Users::Table, &[Users::Email]).await?;

        for (table, name) in [
            (Taxon::Categories, "ux_categories_slug"),
            (Taxon::Genres, "ux_genres_slug"),
        ] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(ColumnDef::new(Taxon::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Taxon::Name).string_len(256).not_null())
                        .col(ColumnDef::new(Taxon::NameSearch).string_len(256).not_null())
                        .col(ColumnDef::new(Taxon::Slug).string_len(50).not_null())
                        .to_owned(),
                )
                .await?;
            unique_index(manager, name, table, &[Taxon::Slug]).await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Titles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Titles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Titles::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Titles::NameSearch).string_len(256).not_null())
                    .col(ColumnDef::new(Titles::Year).integer().not_null())
                    .col(ColumnDef::new(Titles::Description).text().null())
                    .col(ColumnDef::new(Titles::CategoryId).uuid().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_titles_category")
                            .from(Titles::Table, Titles::CategoryId)
                            .to(Taxon::Categories, Taxon::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;
        index(manager, "ix_titles_year_name", Titles::Table, &[Titles::Year, Titles::Name]).await?;

        manager
            .create_table(
                Table::create()
                    .table(GenreTitle::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GenreTitle::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GenreTitle::TitleId).uuid().not_null())
                    .col(ColumnDef::new(GenreTitle::GenreId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_genre_title_title")
                            .from(GenreTitle::Table, GenreTitle::TitleId)
                            .to(Titles::Table, Titles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_genre_title_genre")
                            .from(GenreTitle::Table, GenreTitle::GenreId)
                            .to(Taxon::Genres, Taxon::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        unique_index(
            manager,
            "ux_genre_title_pair",
            GenreTitle::Table,
            &[GenreTitle::TitleId, GenreTitle::GenreId],
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reviews::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Reviews::TitleId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Reviews::Text).text().not_null())
                    .col(ColumnDef::new(Reviews::Score).integer().not_null())
                    .col(ColumnDef::new(Reviews::PubDate).timestamp_with_time_zone().not_null())
                    .check(Expr::col(Reviews::Score).between(1, 10))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_title")
                            .from(Reviews::Table, Reviews::TitleId)
                            .to(Titles::Table, Titles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_author")
                            .from(Reviews::Table, Reviews::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        // One review per author per title.
        unique_index(
            manager,
            "ux_reviews_title_author",
            Reviews::Table,
            &[Reviews::TitleId, Reviews::AuthorId],
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Comments::ReviewId).uuid().not_null())
                    .col(ColumnDef::new(Comments::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Comments::Text).text().not_null())
                    .col(ColumnDef::new(Comments::PubDate).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_review")
                            .from(Comments::Table, Comments::ReviewId)
                            .to(Reviews::Table, Reviews::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author")
                            .from(Comments::Table, Comments::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        index(manager, "ix_comments_review", Comments::Table, &[Comments::ReviewId]).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Comments::Table.into_iden(),
            Reviews::Table.into_iden(),
            GenreTitle::Table.into_iden(),
            Titles::Table.into_iden(),
            Taxon::Genres.into_iden(),
            Taxon::Categories.into_iden(),
            Users::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

async fn unique_index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    cols: &[C],
) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
    C: IntoIden + Copy,
{
    let mut stmt = Index::create();
    stmt.name(name).table(table).unique().if_not_exists();
    for col in cols {
        stmt.col(*col);
    }
    manager.create_index(stmt).await
}

async fn index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    cols: &[C],
) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
    C: IntoIden + Copy,
{
    let mut stmt = Index::create();
    stmt.name(name).table(table).if_not_exists();
    for col in cols {
        stmt.col(*col);
    }
    manager.create_index(stmt).await
}

#[derive(DeriveIden, Clone, Copy)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    Bio,
    Role,
    IsSuperuser,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

/// Categories and genres share a column layout.
#[derive(DeriveIden, Clone, Copy)]
enum Taxon {
    Categories,
    Genres,
    Id,
    Name,
    NameSearch,
    Slug,
}

#[derive(DeriveIden, Clone, Copy)]
enum Titles {
    Table,
    Id,
    Name,
    NameSearch,
    Year,
    Description,
    CategoryId,
}

#[derive(DeriveIden, Clone, Copy)]
enum GenreTitle {
    Table,
    Id,
    TitleId,
    GenreId,
}

#[derive(DeriveIden, Clone, Copy)]
enum Reviews {
    Table,
    Id,
    TitleId,
    AuthorId,
    Text,
    Score,
    PubDate,
}

#[derive(DeriveIden, Clone, Copy)]
enum Comments {
    Table,
    Id,
    ReviewId,
    AuthorId,
    Text,
    PubDate,
}
