use crate::error::{Error, Result};
use crate::site::Site;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use whisper_domain::Post;

/// provider之间转发的最大深度，超过即视为转发环
pub const MAX_FORWARD_DEPTH: usize = 16;

/// 转发目标中代表主provider的名称
pub const MAIN_ALIAS: &str = "main";

/// provider返回的响应
///
/// 核心不解析响应内容，只负责原样传递给服务层。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: u16,
    pub content_type: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ProviderResponse {
    pub fn new(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: content_type.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::new("text/html; charset=utf-8", body.into())
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::new("text/plain; charset=utf-8", body.into())
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 响应体按UTF-8解释（用于测试和日志）
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// 404页面的上下文
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotFoundContext {
    pub path: String,
    pub reason: String,
}

impl NotFoundContext {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// 单次渲染的上下文
///
/// 携带站点、请求子路径、访问者是否有特权，以及当前转发深度。
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    site: &'a Site,
    subpath: &'a str,
    privileged: bool,
    depth: usize,
}

impl<'a> RenderContext<'a> {
    pub fn new(site: &'a Site, subpath: &'a str, privileged: bool) -> Self {
        Self {
            site,
            subpath,
            privileged,
            depth: 0,
        }
    }

    pub fn site(&self) -> &'a Site {
        self.site
    }

    pub fn subpath(&self) -> &'a str {
        self.subpath
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 将文章转发给另一个已注册的provider渲染
    ///
    /// 名称`main`指向站点的主provider。转发链由入口provider负责延续；
    /// 深度超过[`MAX_FORWARD_DEPTH`]时返回`ForwardingLimit`。
    pub async fn forward(&self, provider: &str, post: Post) -> Result<ProviderResponse> {
        let provider = self.site.provider_name(provider);
        if self.depth >= MAX_FORWARD_DEPTH {
            return Err(Error::ForwardingLimit {
                provider: provider.to_string(),
                limit: MAX_FORWARD_DEPTH,
            });
        }
        let target = self
            .site
            .providers()
            .get(provider)
            .cloned()
            .ok_or_else(|| Error::ProviderNotFound {
                provider: provider.to_string(),
                slug: post.slug().to_string(),
            })?;
        debug!("Forwarding post {} to provider {}", post.slug(), provider);
        let next = RenderContext {
            depth: self.depth + 1,
            ..*self
        };
        target.render(&next, post).await
    }
}

/// 内容provider：渲染单篇文章
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// 渲染文章，`cx.subpath()`为文章URL之后的路径（可能为空）
    async fn render(&self, cx: &RenderContext<'_>, post: Post) -> Result<ProviderResponse>;
}

/// 主provider：站点默认provider，同时负责列表页和404页
#[async_trait]
pub trait MainProvider: ContentProvider {
    async fn render_listing(
        &self,
        cx: &RenderContext<'_>,
        page: u64,
        tag: Option<&str>,
    ) -> Result<ProviderResponse>;

    async fn render_not_found(
        &self,
        cx: &RenderContext<'_>,
        context: &NotFoundContext,
    ) -> Result<ProviderResponse>;
}

/// provider注册表，按名称索引
///
/// 启动阶段填充，之后只读。
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ContentProvider>>,
    mains: HashMap<String, Arc<dyn MainProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册内容provider，名称必须唯一
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn ContentProvider>) -> Result<()> {
        let name = name.into();
        if self.providers.contains_key(&name) {
            return Err(Error::Config(format!("provider `{}` registered twice", name)));
        }
        self.providers.insert(name, provider);
        Ok(())
    }

    /// 注册主provider，同时可作为内容provider使用
    pub fn register_main<P>(&mut self, name: impl Into<String>, provider: Arc<P>) -> Result<()>
    where
        P: MainProvider + 'static,
    {
        let name = name.into();
        self.register(name.clone(), provider.clone())?;
        self.mains.insert(name, provider);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ContentProvider>> {
        self.providers.get(name)
    }

    pub fn get_main(&self, name: &str) -> Option<&Arc<dyn MainProvider>> {
        self.mains.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// 已注册的provider名称（排序后）
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
