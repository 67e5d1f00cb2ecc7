use std::sync::Arc;
use tracing::{debug, warn};
use whisper_api::{
    names, Error, EventPayload, NotFoundContext, ProviderResponse, RenderContext, Result, Site,
};
use whisper_domain::{clamp_page, MAX_PAGE};

/// 服务层解析出的请求形态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchRequest {
    /// `/<slug>/` 或 `/<slug>/<subpath>`
    Post { slug: String, subpath: String },
    /// `/` 或 `/tag/<tag>/`，页码未截断
    Listing { page: i64, tag: Option<String> },
    /// 无法识别的路径
    Unknown { path: String },
}

/// 请求分发器
///
/// 将文章或列表请求解析到具体的provider并调用，
/// 通过事件总线应用`post_not_found`、`provider_not_found`等覆盖规则。
/// 分发器自身从不重试。
#[derive(Clone)]
pub struct Dispatcher {
    site: Arc<Site>,
}

impl Dispatcher {
    pub fn new(site: Arc<Site>) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &Arc<Site> {
        &self.site
    }

    /// 解析单篇文章
    pub async fn resolve_post(
        &self,
        slug: &str,
        subpath: &str,
        privileged: bool,
    ) -> Result<ProviderResponse> {
        let site = self.site.as_ref();
        let post = match site.find_post(slug, privileged).await? {
            Some(post) => post,
            None => {
                let mut payload = site
                    .events()
                    .invoke(names::POST_NOT_FOUND, EventPayload::new().with("slug", slug))?;
                if let Some(response) = payload.take_response() {
                    debug!("post_not_found overridden for {}", slug);
                    return Ok(response);
                }
                return Err(Error::NotFound(format!("post `{}`", slug)));
            }
        };

        let cx = RenderContext::new(site, subpath, privileged);
        let provider_name = site.provider_name(post.provider_or(site.main_name())).to_string();
        if let Some(provider) = site.providers().get(&provider_name) {
            return provider.render(&cx, post).await;
        }

        warn!("Provider {} for post {} is not registered", provider_name, post.slug());
        let mut payload = site.events().invoke(
            names::PROVIDER_NOT_FOUND,
            EventPayload::new()
                .with("slug", post.slug())
                .with("provider", provider_name.as_str()),
        )?;
        if let Some(response) = payload.take_response() {
            return Ok(response);
        }
        if let Some(provider) = payload.take_provider() {
            debug!("Substituting provider for post {}", post.slug());
            return provider.render(&cx, post).await;
        }
        Err(Error::ProviderNotFound {
            provider: provider_name,
            slug: post.slug().to_string(),
        })
    }

    /// 解析列表页，页码截断到`[1, 2^32]`
    pub async fn resolve_listing(
        &self,
        page: i64,
        tag: Option<&str>,
        privileged: bool,
    ) -> Result<ProviderResponse> {
        let page = clamp_page(page, MAX_PAGE);
        let cx = RenderContext::new(&self.site, "", privileged);
        self.site.main().render_listing(&cx, page, tag).await
    }

    /// 由主provider渲染404页面
    pub async fn render_not_found(
        &self,
        context: &NotFoundContext,
        privileged: bool,
    ) -> Result<ProviderResponse> {
        let cx = RenderContext::new(&self.site, "", privileged);
        self.site.main().render_not_found(&cx, context).await
    }

    /// 处理一个请求，`NotFound`转为主provider的404页面，其他错误原样返回
    pub async fn dispatch(
        &self,
        request: DispatchRequest,
        path: &str,
        privileged: bool,
    ) -> Result<ProviderResponse> {
        let result = match &request {
            DispatchRequest::Post { slug, subpath } => {
                self.resolve_post(slug, subpath, privileged).await
            }
            DispatchRequest::Listing { page, tag } => {
                self.resolve_listing(*page, tag.as_deref(), privileged).await
            }
            DispatchRequest::Unknown { path } => Err(Error::NotFound(format!("route `{}`", path))),
        };
        match result {
            Err(Error::NotFound(reason)) => {
                debug!("Not found: {}", reason);
                self.render_not_found(&NotFoundContext::new(path, reason), privileged)
                    .await
            }
            other => other,
        }
    }
}
