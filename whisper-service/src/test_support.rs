use async_trait::async_trait;
use sea_orm::Database;
use std::sync::Arc;
use tempfile::TempDir;
use whisper_api::{
    ContentProvider, MainProvider, NotFoundContext, PostRepository, ProviderResponse,
    RenderContext, Result, Site, SiteBuilder,
};
use whisper_domain::Post;
use whisper_infra::{LocalPostStorage, SeaOrmPostRepository};
use whisper_migration::{Migrator, MigratorTrait};

/// 测试用主provider：回显文章和请求参数
pub struct EchoTheme;

#[async_trait]
impl ContentProvider for EchoTheme {
    async fn render(&self, cx: &RenderContext<'_>, post: Post) -> Result<ProviderResponse> {
        Ok(ProviderResponse::text(format!("theme:{}:{}", post.slug(), cx.subpath())))
    }
}

#[async_trait]
impl MainProvider for EchoTheme {
    async fn render_listing(
        &self,
        _cx: &RenderContext<'_>,
        page: u64,
        tag: Option<&str>,
    ) -> Result<ProviderResponse> {
        Ok(ProviderResponse::text(format!("list:{}:{}", page, tag.unwrap_or("-"))))
    }

    async fn render_not_found(
        &self,
        _cx: &RenderContext<'_>,
        context: &NotFoundContext,
    ) -> Result<ProviderResponse> {
        Ok(ProviderResponse::text(format!("404:{}", context.path)).with_status(404))
    }
}

pub struct TestSite {
    pub dir: TempDir,
    pub repository: Arc<SeaOrmPostRepository>,
    pub storage: Arc<LocalPostStorage>,
}

impl TestSite {
    pub async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let dir = TempDir::new().unwrap();
        Self {
            repository: Arc::new(SeaOrmPostRepository::new(Arc::new(db))),
            storage: Arc::new(LocalPostStorage::new(dir.path())),
            dir,
        }
    }

    pub fn builder(&self) -> SiteBuilder {
        let mut builder = SiteBuilder::new(self.repository.clone(), self.storage.clone(), "theme");
        builder
            .register_main_provider("theme", Arc::new(EchoTheme))
            .unwrap();
        builder
    }

    pub fn build(&self, configure: impl FnOnce(&mut SiteBuilder)) -> Arc<Site> {
        let mut builder = self.builder();
        configure(&mut builder);
        Arc::new(builder.build().unwrap())
    }

    /// 直接写入一篇文章
    pub async fn insert(&self, slug: &str, provider: Option<&str>, public: bool) -> Post {
        let mut post = Post::new(slug).unwrap();
        post.provider = provider.map(str::to_string);
        post.public = public;
        post.indexed = public;
        post.title = slug.to_uppercase();
        self.repository.upsert_post(&post).await.unwrap();
        post.mark_saved();
        post
    }
}
