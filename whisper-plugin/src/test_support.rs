use crate::config::PluginsConfig;
use crate::manager::PluginManager;
use async_trait::async_trait;
use sea_orm::Database;
use std::sync::Arc;
use tempfile::TempDir;
use whisper_api::{
    ContentProvider, PostRepository, ProviderResponse, RenderContext, Result, Site, SiteBuilder,
};
use whisper_domain::Post;
use whisper_infra::{LocalPostStorage, SeaOrmPostRepository};
use whisper_migration::{Migrator, MigratorTrait};

/// 测试用provider：直接输出文章内容
pub struct Echo;

#[async_trait]
impl ContentProvider for Echo {
    async fn render(&self, _cx: &RenderContext<'_>, post: Post) -> Result<ProviderResponse> {
        Ok(ProviderResponse::html(post.content))
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

    pub fn builder(&self, main: &str) -> SiteBuilder {
        SiteBuilder::new(self.repository.clone(), self.storage.clone(), main)
    }

    /// 按顺序加载插件并注册`echo`
    pub fn site_with(&self, plugins: &[&str], main: &str, config: &PluginsConfig) -> Site {
        let mut builder = self.builder(main);
        builder.register_provider("echo", Arc::new(Echo)).unwrap();
        let names: Vec<String> = plugins.iter().map(|s| s.to_string()).collect();
        PluginManager::new()
            .load_all(&names, config, &mut builder)
            .unwrap();
        builder.build().unwrap()
    }

    pub fn site(&self, plugins: &[&str], main: &str) -> Site {
        self.site_with(plugins, main, &PluginsConfig::default())
    }

    pub async fn insert(&self, slug: &str, provider: Option<&str>, public: bool) -> Post {
        let mut post = Post::new(slug).unwrap();
        post.provider = provider.map(str::to_string);
        post.public = public;
        post.indexed = public;
        post.title = slug.to_uppercase();
        self.save(&mut post).await;
        post
    }

    pub async fn save(&self, post: &mut Post) {
        self.repository.upsert_post(post).await.unwrap();
        post.mark_saved();
    }
}
