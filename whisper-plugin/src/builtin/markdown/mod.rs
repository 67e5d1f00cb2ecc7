use crate::builtin::descriptor;
use crate::config::{MarkdownConfig, MarkdownOptions};
use crate::descriptor::PluginDescriptor;
use crate::plugin::{Plugin, PluginError};
use async_trait::async_trait;
use pulldown_cmark::{html, Options, Parser};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use whisper_api::{
    ContentProvider, Error, EventBus, EventPayload, ProviderResponse, RenderContext, Result,
    SiteBuilder,
};
use whisper_domain::Post;

pub const PRE_RENDER: &str = "markdown:pre_render";
pub const POST_RENDER: &str = "markdown:post_render";
/// 覆盖转发目标的文章元数据键
pub const META_MAIN: &str = "markdown:main";

/// 将markdown转换为HTML
pub fn to_html(text: &str, options: &MarkdownOptions) -> String {
    let mut flags = Options::empty();
    if options.tables {
        flags.insert(Options::ENABLE_TABLES);
    }
    if options.footnotes {
        flags.insert(Options::ENABLE_FOOTNOTES);
    }
    if options.strikethrough {
        flags.insert(Options::ENABLE_STRIKETHROUGH);
    }
    if options.tasklists {
        flags.insert(Options::ENABLE_TASKLISTS);
    }
    if options.smart_punctuation {
        flags.insert(Options::ENABLE_SMART_PUNCTUATION);
    }
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(text, flags));
    out
}

/// 渲染文章内容
///
/// 前后分别触发`markdown:pre_render`（可修改`options`）和
/// `markdown:post_render`（可修改`html`）。
pub fn render_post(events: &EventBus, post: &mut Post, options: &MarkdownOptions) -> Result<()> {
    let options_value =
        serde_json::to_value(options).map_err(|e| Error::Render(format!("markdown options: {}", e)))?;
    let mut payload = events.invoke(
        PRE_RENDER,
        EventPayload::new()
            .with("slug", post.slug())
            .with("options", options_value),
    )?;
    let options: MarkdownOptions = match payload.remove("options") {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| Error::Render(format!("markdown options: {}", e)))?,
        None => options.clone(),
    };

    let rendered = to_html(&post.content, &options);
    let mut payload = events.invoke(
        POST_RENDER,
        EventPayload::new()
            .with("slug", post.slug())
            .with("html", rendered.clone()),
    )?;
    post.content = match payload.remove("html") {
        Some(Value::String(html)) => html,
        _ => rendered,
    };
    Ok(())
}

/// markdown provider：渲染后转发
pub struct MarkdownProvider {
    config: MarkdownConfig,
}

impl MarkdownProvider {
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ContentProvider for MarkdownProvider {
    async fn render(&self, cx: &RenderContext<'_>, mut post: Post) -> Result<ProviderResponse> {
        let site = cx.site();
        render_post(site.events(), &mut post, &self.config.options)?;
        site.ensure_meta(&mut post).await?;
        let target = post
            .meta_value(META_MAIN)
            .unwrap_or(&self.config.main)
            .to_string();
        debug!("Markdown of {} rendered, forwarding to {}", post.slug(), target);
        cx.forward(&target, post).await
    }
}

pub struct MarkdownPlugin {
    descriptor: PluginDescriptor,
    config: MarkdownConfig,
}

impl MarkdownPlugin {
    pub fn new(config: MarkdownConfig) -> std::result::Result<Self, PluginError> {
        Ok(Self {
            descriptor: descriptor("markdown", include_str!("plugin.yaml"))?,
            config,
        })
    }
}

impl Plugin for MarkdownPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn install(&self, site: &mut SiteBuilder) -> Result<()> {
        site.register_provider("markdown", Arc::new(MarkdownProvider::new(self.config.clone())))?;
        Ok(())
    }
}
