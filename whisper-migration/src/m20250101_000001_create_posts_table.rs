use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250101_000001_create_posts_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Posts::Slug)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Posts::Provider).string_len(255).null())
                    .col(ColumnDef::new(Posts::Public).boolean().not_null().default(false))
                    .col(ColumnDef::new(Posts::Indexed).boolean().not_null().default(false))
                    .col(ColumnDef::new(Posts::Creation).big_integer().not_null())
                    .col(ColumnDef::new(Posts::Modified).big_integer().not_null())
                    .col(ColumnDef::new(Posts::Title).text().not_null())
                    .col(ColumnDef::new(Posts::Excerpt).text().not_null())
                    .col(ColumnDef::new(Posts::Content).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::PostSlug).string_len(255).not_null())
                    .col(ColumnDef::new(Tags::Tag).string_len(255).not_null())
                    .primary_key(Index::create().col(Tags::PostSlug).col(Tags::Tag))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tags_post_slug")
                            .from(Tags::Table, Tags::PostSlug)
                            .to(Posts::Table, Posts::Slug)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Metas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Metas::PostSlug).string_len(255).not_null())
                    .col(ColumnDef::new(Metas::MetaKey).string_len(255).not_null())
                    .col(ColumnDef::new(Metas::MetaValue).text().not_null())
                    .primary_key(Index::create().col(Metas::PostSlug).col(Metas::MetaKey))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_metas_post_slug")
                            .from(Metas::Table, Metas::PostSlug)
                            .to(Posts::Table, Posts::Slug)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Metas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Slug,
    Provider,
    Public,
    Indexed,
    Creation,
    Modified,
    Title,
    Excerpt,
    Content,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    PostSlug,
    Tag,
}

#[derive(DeriveIden)]
enum Metas {
    Table,
    PostSlug,
    MetaKey,
    MetaValue,
}
