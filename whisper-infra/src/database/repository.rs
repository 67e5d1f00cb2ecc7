use crate::database::entity::{meta, post, tag};
use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    TransactionTrait,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;
use whisper_api::{Error, PostRepository, ProviderUsage, Result};
use whisper_domain::{Post, PostFilter, PostPage, PostRecord};

fn db_err(err: DbErr) -> Error {
    Error::Repository(err.to_string())
}

/// SeaOrmPostRepository 使用Sea-ORM实现的文章仓储
pub struct SeaOrmPostRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmPostRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn replace_tags<C: ConnectionTrait>(conn: &C, slug: &str, tags: &BTreeSet<String>) -> Result<()> {
        tag::Entity::delete_many()
            .filter(tag::Column::PostSlug.eq(slug))
            .exec(conn)
            .await
            .map_err(db_err)?;
        if tags.is_empty() {
            return Ok(());
        }
        let rows = tags.iter().map(|t| tag::ActiveModel {
            post_slug: Set(slug.to_string()),
            tag: Set(t.clone()),
        });
        tag::Entity::insert_many(rows)
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn replace_meta<C: ConnectionTrait>(
        conn: &C,
        slug: &str,
        meta: &BTreeMap<String, String>,
    ) -> Result<()> {
        meta::Entity::delete_many()
            .filter(meta::Column::PostSlug.eq(slug))
            .exec(conn)
            .await
            .map_err(db_err)?;
        if meta.is_empty() {
            return Ok(());
        }
        let rows = meta.iter().map(|(k, v)| meta::ActiveModel {
            post_slug: Set(slug.to_string()),
            meta_key: Set(k.clone()),
            meta_value: Set(v.clone()),
        });
        meta::Entity::insert_many(rows)
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn rename<C: ConnectionTrait>(conn: &C, from: &str, to: &str) -> Result<()> {
        post::Entity::update_many()
            .col_expr(post::Column::Slug, Expr::value(to))
            .filter(post::Column::Slug.eq(from))
            .exec(conn)
            .await
            .map_err(db_err)?;
        // 数据库未开启外键级联时手动迁移子表
        tag::Entity::update_many()
            .col_expr(tag::Column::PostSlug, Expr::value(to))
            .filter(tag::Column::PostSlug.eq(from))
            .exec(conn)
            .await
            .map_err(db_err)?;
        meta::Entity::update_many()
            .col_expr(meta::Column::PostSlug, Expr::value(to))
            .filter(meta::Column::PostSlug.eq(from))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn find_post(&self, slug: &str, include_private: bool) -> Result<Option<Post>> {
        let mut query = post::Entity::find_by_id(slug.to_string());
        if !include_private {
            query = query.filter(post::Column::Public.eq(true));
        }
        let model = query.one(&*self.db).await.map_err(db_err)?;
        match model {
            Some(model) => Ok(Some(Post::from_record(PostRecord::from(model))?)),
            None => Ok(None),
        }
    }

    async fn load_tags(&self, post: &mut Post) -> Result<()> {
        let tags = tag::Entity::find()
            .filter(tag::Column::PostSlug.eq(post.original_slug()))
            .all(&*self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| row.tag)
            .collect();
        post.load_tags(tags);
        Ok(())
    }

    async fn load_meta(&self, post: &mut Post) -> Result<()> {
        let meta = meta::Entity::find()
            .filter(meta::Column::PostSlug.eq(post.original_slug()))
            .all(&*self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| (row.meta_key, row.meta_value))
            .collect();
        post.load_meta(meta);
        Ok(())
    }

    async fn list_posts(&self, filter: &PostFilter, page: u64, page_size: u64) -> Result<PostPage> {
        let mut query = post::Entity::find();
        if let Some(tag) = &filter.tag {
            query = query
                .join(JoinType::InnerJoin, post::Relation::Tags.def())
                .filter(tag::Column::Tag.eq(tag.as_str()));
        }
        if let Some(indexed) = filter.indexed {
            query = query.filter(post::Column::Indexed.eq(indexed));
        }
        if let Some(public) = filter.public {
            query = query.filter(post::Column::Public.eq(public));
        }
        if let Some(provider) = &filter.provider {
            query = query.filter(post::Column::Provider.eq(provider.as_str()));
        }
        if let Some(pattern) = filter.search_pattern() {
            query = query.filter(
                sea_orm::Condition::any()
                    .add(post::Column::Slug.like(pattern.as_str()))
                    .add(post::Column::Title.like(pattern.as_str())),
            );
        }

        let count = query.clone().count(&*self.db).await.map_err(db_err)?;
        let total_pages = PostPage::total_pages_for(count, page_size);
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        debug!("Listing posts page {} of {} ({} matches)", page, total_pages, count);

        let models = query
            .order_by_desc(post::Column::Creation)
            .order_by_asc(post::Column::Slug)
            .offset(offset)
            .limit(page_size)
            .all(&*self.db)
            .await
            .map_err(db_err)?;

        let posts = models
            .into_iter()
            .map(|model| Post::from_record(PostRecord::from(model)).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;
        Ok(PostPage { posts, total_pages })
    }

    async fn upsert_post(&self, post: &Post) -> Result<()> {
        let key = post.original_slug().to_string();
        let record = post.to_record();
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = post::ActiveModel {
            slug: Set(key.clone()),
            provider: Set(record.provider),
            public: Set(record.public),
            indexed: Set(record.indexed),
            creation: Set(record.creation),
            modified: Set(record.modified),
            title: Set(record.title),
            excerpt: Set(record.excerpt),
            content: Set(record.content),
        };
        post::Entity::insert(model)
            .on_conflict(
                OnConflict::column(post::Column::Slug)
                    .update_columns([
                        post::Column::Provider,
                        post::Column::Public,
                        post::Column::Indexed,
                        post::Column::Creation,
                        post::Column::Modified,
                        post::Column::Title,
                        post::Column::Excerpt,
                        post::Column::Content,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;

        if post.tags_dirty() {
            if let Some(tags) = post.tags() {
                Self::replace_tags(&txn, &key, tags).await?;
            }
        }
        if post.meta_dirty() {
            if let Some(meta) = post.meta() {
                Self::replace_meta(&txn, &key, meta).await?;
            }
        }
        if post.is_renamed() {
            debug!("Renaming post {} to {}", key, post.slug());
            Self::rename(&txn, &key, post.slug()).await?;
        }

        txn.commit().await.map_err(db_err)
    }

    async fn delete_post(&self, slug: &str) -> Result<()> {
        let txn = self.db.begin().await.map_err(db_err)?;
        tag::Entity::delete_many()
            .filter(tag::Column::PostSlug.eq(slug))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        meta::Entity::delete_many()
            .filter(meta::Column::PostSlug.eq(slug))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        post::Entity::delete_by_id(slug.to_string())
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)
    }

    async fn provider_usage(&self) -> Result<Vec<ProviderUsage>> {
        let rows: Vec<(Option<String>, i64)> = post::Entity::find()
            .select_only()
            .column(post::Column::Provider)
            .column_as(Expr::col(post::Column::Slug).count(), "count")
            .group_by(post::Column::Provider)
            .into_tuple()
            .all(&*self.db)
            .await
            .map_err(db_err)?;

        let mut usage: Vec<ProviderUsage> = rows
            .into_iter()
            .map(|(name, count)| ProviderUsage {
                name,
                count: count.max(0) as u64,
            })
            .collect();
        usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(usage)
    }
}
