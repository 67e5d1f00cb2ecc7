use crate::builtin::descriptor;
use crate::config::FileConfig;
use crate::descriptor::PluginDescriptor;
use crate::plugin::{Plugin, PluginError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::warn;
use whisper_api::{
    ContentProvider, Error, EventPayload, ProviderResponse, RenderContext, Result, Site,
    SiteBuilder,
};
use whisper_domain::Post;

pub const STATIC: &str = "file:static";
pub const RENDER: &str = "file:render";
pub const LIST: &str = "file:list";
pub const LIST_RENDERED: &str = "file:list_rendered";
/// 覆盖文件列表渲染目标的文章元数据键
pub const META_MAIN: &str = "file:main";

const LIST_TEMPLATE: &str = r#"{{ css | safe }}
<ul id="whisper-file-list">
{%- for file in files %}
    <li><a target="_blank" href="/{{ slug }}/{{ file }}">{{ file }}</a></li>
{%- endfor %}
</ul>
{{ js | safe }}"#;

/// 读取文章目录下的文件，按扩展名推断类型
pub fn serve(site: &Site, post: &Post, path: &str) -> Result<ProviderResponse> {
    let body = site.storage().read(post.original_slug(), path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(ProviderResponse::new(mime.to_string(), body))
}

/// file provider
///
/// 有子路径时直接返回该文件；否则尝试返回`post.content`指定的文件，
/// 找不到时渲染文件列表并转发给其他provider。
pub struct FileProvider {
    config: FileConfig,
}

impl FileProvider {
    pub fn new(config: FileConfig) -> Self {
        Self { config }
    }

    fn render_list(&self, slug: &str, files: &[String]) -> Result<String> {
        let mut context = Context::new();
        context.insert("slug", slug);
        context.insert("files", files);
        context.insert("css", &self.config.css);
        context.insert("js", &self.config.js);
        Tera::one_off(LIST_TEMPLATE, &context, true)
            .map_err(|e| Error::Render(format!("file list: {}", e)))
    }
}

#[async_trait]
impl ContentProvider for FileProvider {
    async fn render(&self, cx: &RenderContext<'_>, mut post: Post) -> Result<ProviderResponse> {
        let site = cx.site();
        let events = site.events();

        if !cx.subpath().is_empty() {
            let payload = events.invoke(
                STATIC,
                EventPayload::new()
                    .with("slug", post.slug())
                    .with("path", cx.subpath()),
            )?;
            let path = payload.get_str("path").unwrap_or(cx.subpath());
            return serve(site, &post, path);
        }

        let payload = events.invoke(
            RENDER,
            EventPayload::new()
                .with("slug", post.slug())
                .with("path", post.content.trim()),
        )?;
        let path = payload.get_str("path").unwrap_or_default().to_string();
        if !path.is_empty() {
            match serve(site, &post, &path) {
                Err(Error::NotFound(_)) => {
                    warn!("File {} of post {} not found, listing files", path, post.slug())
                }
                other => return other,
            }
        }

        let files = site.post_files(&post)?;
        let mut payload = events.invoke(
            LIST,
            EventPayload::new()
                .with("slug", post.slug())
                .with("files", json!(files)),
        )?;
        let files: Vec<String> = match payload.remove("files") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => files,
        };

        let html = self.render_list(post.slug(), &files)?;
        let mut payload = events.invoke(
            LIST_RENDERED,
            EventPayload::new()
                .with("slug", post.slug())
                .with("html", html.clone()),
        )?;
        post.content = match payload.remove("html") {
            Some(Value::String(html)) => html,
            _ => html,
        };

        site.ensure_meta(&mut post).await?;
        let target = post
            .meta_value(META_MAIN)
            .unwrap_or(&self.config.main)
            .to_string();
        cx.forward(&target, post).await
    }
}

pub struct FilePlugin {
    descriptor: PluginDescriptor,
    config: FileConfig,
}

impl FilePlugin {
    pub fn new(config: FileConfig) -> std::result::Result<Self, PluginError> {
        Ok(Self {
            descriptor: descriptor("file", include_str!("plugin.yaml"))?,
            config,
        })
    }
}

impl Plugin for FilePlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn install(&self, site: &mut SiteBuilder) -> Result<()> {
        site.register_provider("file", Arc::new(FileProvider::new(self.config.clone())))?;
        Ok(())
    }
}
