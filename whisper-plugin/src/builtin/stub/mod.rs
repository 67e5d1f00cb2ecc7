use crate::builtin::descriptor;
use crate::descriptor::PluginDescriptor;
use crate::plugin::{Plugin, PluginError};
use async_trait::async_trait;
use std::sync::Arc;
use whisper_api::{
    ContentProvider, MainProvider, NotFoundContext, ProviderResponse, RenderContext, Result,
    SiteBuilder,
};
use whisper_domain::Post;

/// 调试用主provider，以纯文本回显请求
pub struct StubProvider;

#[async_trait]
impl ContentProvider for StubProvider {
    async fn render(&self, cx: &RenderContext<'_>, post: Post) -> Result<ProviderResponse> {
        Ok(ProviderResponse::text(format!(
            "stub:{}:{}\n{}\n{}",
            post.slug(),
            cx.subpath(),
            post.title,
            post.content
        )))
    }
}

#[async_trait]
impl MainProvider for StubProvider {
    async fn render_listing(
        &self,
        cx: &RenderContext<'_>,
        page: u64,
        tag: Option<&str>,
    ) -> Result<ProviderResponse> {
        Ok(ProviderResponse::text(format!(
            "stub:list:{}:{}:{}",
            page,
            tag.unwrap_or("-"),
            cx.is_privileged()
        )))
    }

    async fn render_not_found(
        &self,
        _cx: &RenderContext<'_>,
        not_found: &NotFoundContext,
    ) -> Result<ProviderResponse> {
        Ok(
            ProviderResponse::text(format!("stub:404:{}:{}", not_found.path, not_found.reason))
                .with_status(404),
        )
    }
}

pub struct StubPlugin {
    descriptor: PluginDescriptor,
}

impl StubPlugin {
    pub fn new() -> std::result::Result<Self, PluginError> {
        Ok(Self {
            descriptor: descriptor("stub", include_str!("plugin.yaml"))?,
        })
    }
}

impl Plugin for StubPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn install(&self, site: &mut SiteBuilder) -> Result<()> {
        site.register_main_provider("stub", Arc::new(StubProvider))?;
        Ok(())
    }
}
