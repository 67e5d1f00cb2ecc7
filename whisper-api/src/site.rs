use crate::error::{Error, Result};
use crate::event::{names, EventBus, EventPayload, HandlerError};
use crate::provider::{ContentProvider, MainProvider, ProviderRegistry, MAIN_ALIAS};
use crate::repository::{PostRepository, PostStorage};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use whisper_domain::{Post, PostFilter, PostPage};

/// 站点上下文
///
/// 启动时构造一次，之后以`Arc<Site>`显式传递给需要仓储、事件总线或provider注册表的组件。
pub struct Site {
    repository: Arc<dyn PostRepository>,
    storage: Arc<dyn PostStorage>,
    events: EventBus,
    providers: ProviderRegistry,
    main_name: String,
    main: Arc<dyn MainProvider>,
}

impl Site {
    pub fn repository(&self) -> &Arc<dyn PostRepository> {
        &self.repository
    }

    pub fn storage(&self) -> &Arc<dyn PostStorage> {
        &self.storage
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn main_name(&self) -> &str {
        &self.main_name
    }

    pub fn main(&self) -> &Arc<dyn MainProvider> {
        &self.main
    }

    /// 解析provider名称，`main`指向主provider
    pub fn provider_name<'a>(&'a self, name: &'a str) -> &'a str {
        if name == MAIN_ALIAS {
            &self.main_name
        } else {
            name
        }
    }

    /// 按slug查找文章，`core:get_post`的处理器可以改写slug
    pub async fn find_post(&self, slug: &str, include_private: bool) -> Result<Option<Post>> {
        let payload = self
            .events
            .invoke(names::CORE_GET_POST, EventPayload::new().with("slug", slug))?;
        let slug = payload.get_str("slug").unwrap_or(slug);
        self.repository.find_post(slug, include_private).await
    }

    /// 分页列出文章，`core:get_posts`的处理器可以改写标签
    pub async fn list_posts(&self, filter: PostFilter, page: u64, page_size: u64) -> Result<PostPage> {
        let payload = self.events.invoke(
            names::CORE_GET_POSTS,
            EventPayload::new().with("tag", filter.tag.clone()),
        )?;
        // 处理器把tag置为null即取消标签过滤
        let tag = match payload.get("tag") {
            Some(Value::Null) => None,
            Some(Value::String(tag)) => Some(tag.clone()),
            _ => filter.tag.clone(),
        };
        let filter = filter.with_tag(tag);
        self.repository.list_posts(&filter, page, page_size).await
    }

    /// 确保标签已加载
    pub async fn ensure_tags(&self, post: &mut Post) -> Result<()> {
        if !post.tags_loaded() {
            self.repository.load_tags(post).await?;
        }
        Ok(())
    }

    /// 确保元数据已加载
    pub async fn ensure_meta(&self, post: &mut Post) -> Result<()> {
        if !post.meta_loaded() {
            self.repository.load_meta(post).await?;
        }
        Ok(())
    }

    /// 文章私有目录下的所有文件
    pub fn post_files(&self, post: &Post) -> Result<Vec<String>> {
        self.storage.list_files(post.original_slug())
    }
}

/// 站点构造器
///
/// 插件在启动阶段通过它注册provider和事件处理器。
pub struct SiteBuilder {
    repository: Arc<dyn PostRepository>,
    storage: Arc<dyn PostStorage>,
    events: EventBus,
    providers: ProviderRegistry,
    main_name: String,
}

impl SiteBuilder {
    pub fn new(
        repository: Arc<dyn PostRepository>,
        storage: Arc<dyn PostStorage>,
        main_name: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            storage,
            events: EventBus::new(),
            providers: ProviderRegistry::new(),
            main_name: main_name.into(),
        }
    }

    pub fn main_name(&self) -> &str {
        &self.main_name
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// 注册事件处理器
    pub fn on<F>(&mut self, event: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(EventPayload) -> std::result::Result<EventPayload, HandlerError> + Send + Sync + 'static,
    {
        self.events.register(event, handler);
        self
    }

    pub fn register_provider(
        &mut self,
        name: impl Into<String>,
        provider: Arc<dyn ContentProvider>,
    ) -> Result<&mut Self> {
        let name = name.into();
        info!("Registering provider {}", name);
        self.providers.register(name, provider)?;
        Ok(self)
    }

    pub fn register_main_provider<P>(&mut self, name: impl Into<String>, provider: Arc<P>) -> Result<&mut Self>
    where
        P: MainProvider + 'static,
    {
        let name = name.into();
        info!("Registering main provider {}", name);
        self.providers.register_main(name, provider)?;
        Ok(self)
    }

    /// 冻结注册表。配置的主provider必须已注册且满足`MainProvider`
    pub fn build(mut self) -> Result<Site> {
        let main = self
            .providers
            .get_main(&self.main_name)
            .cloned()
            .ok_or_else(|| {
                Error::Config(format!(
                    "main provider `{}` is not registered as a MainProvider",
                    self.main_name
                ))
            })?;
        self.events.set_main_alias(self.main_name.clone());
        Ok(Site {
            repository: self.repository,
            storage: self.storage,
            events: self.events,
            providers: self.providers,
            main_name: self.main_name,
            main,
        })
    }
}
