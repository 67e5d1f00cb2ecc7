use crate::builtin::{descriptor, markdown};
use crate::config::{InfimumConfig, MarkdownOptions};
use crate::descriptor::PluginDescriptor;
use crate::plugin::{Plugin, PluginError};
use async_trait::async_trait;
use chrono::{Local, TimeZone};
use serde::Serialize;
use std::sync::Arc;
use tera::{Context, Tera};
use whisper_api::{
    ContentProvider, Error, MainProvider, NotFoundContext, ProviderResponse, RenderContext,
    Result, SiteBuilder,
};
use whisper_domain::{clamp_page, Post, PostFilter};

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("templates/base.html")),
    ("post.html", include_str!("templates/post.html")),
    ("list.html", include_str!("templates/list.html")),
    ("404.html", include_str!("templates/404.html")),
];

fn strftime(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(time) => time.format("%Y/%m/%d %H:%M").to_string(),
        None => String::new(),
    }
}

/// 模板中使用的文章视图
#[derive(Debug, Serialize)]
struct PostView {
    slug: String,
    title: String,
    excerpt: String,
    content: String,
    public: bool,
    created: String,
    modified: String,
    tags: Vec<String>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        let tags = post.tags().map(|t| t.iter().cloned().collect()).unwrap_or_default();
        Self {
            slug: post.slug().to_string(),
            created: strftime(post.creation),
            modified: strftime(post.modified),
            title: post.title,
            excerpt: post.excerpt,
            content: post.content,
            public: post.public,
            tags,
        }
    }
}

/// infimum主题（主provider）
pub struct InfimumTheme {
    config: InfimumConfig,
    markdown: MarkdownOptions,
    tera: Tera,
}

impl InfimumTheme {
    pub fn new(config: InfimumConfig, markdown: MarkdownOptions) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())
            .map_err(|e| Error::Render(format!("infimum templates: {}", e)))?;
        tera.autoescape_on(vec![".html"]);
        Ok(Self {
            config,
            markdown,
            tera,
        })
    }

    fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site_title", &self.config.site_title);
        context
    }

    fn render_template(&self, name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(name, context)
            .map_err(|e| Error::Render(format!("infimum {}: {:?}", name, e)))
    }
}

#[async_trait]
impl ContentProvider for InfimumTheme {
    async fn render(&self, cx: &RenderContext<'_>, mut post: Post) -> Result<ProviderResponse> {
        if !cx.subpath().is_empty() {
            return cx.forward("file", post).await;
        }
        let site = cx.site();
        // 作为入口provider时自行渲染markdown
        if cx.depth() == 0 {
            markdown::render_post(site.events(), &mut post, &self.markdown)?;
        }
        site.ensure_tags(&mut post).await?;

        let mut context = self.context();
        context.insert("post", &PostView::from(post));
        Ok(ProviderResponse::html(self.render_template("post.html", &context)?))
    }
}

#[async_trait]
impl MainProvider for InfimumTheme {
    async fn render_listing(
        &self,
        cx: &RenderContext<'_>,
        page: u64,
        tag: Option<&str>,
    ) -> Result<ProviderResponse> {
        let site = cx.site();
        let public = if cx.is_privileged() { None } else { Some(true) };
        let filter = PostFilter::new()
            .with_tag(tag.map(str::to_string))
            .with_indexed(Some(true))
            .with_public(public);

        let page_size = self.config.page_size.max(1);
        let mut listing = site.list_posts(filter.clone(), page, page_size).await?;
        let max_page = listing.total_pages.max(1);
        let page = clamp_page(i64::try_from(page).unwrap_or(i64::MAX), max_page);
        if listing.posts.is_empty() && listing.total_pages > 0 {
            listing = site.list_posts(filter, page, page_size).await?;
        }

        let posts: Vec<PostView> = listing.posts.into_iter().map(PostView::from).collect();
        let mut context = self.context();
        context.insert("posts", &posts);
        context.insert("tag", &tag);
        context.insert("page", &page);
        context.insert("max_page", &max_page);
        context.insert("prev_page", &clamp_page(page as i64 - 1, max_page));
        context.insert("next_page", &clamp_page(page as i64 + 1, max_page));
        Ok(ProviderResponse::html(self.render_template("list.html", &context)?))
    }

    async fn render_not_found(
        &self,
        _cx: &RenderContext<'_>,
        not_found: &NotFoundContext,
    ) -> Result<ProviderResponse> {
        let mut context = self.context();
        context.insert("path", &not_found.path);
        let body = self.render_template("404.html", &context)?;
        Ok(ProviderResponse::html(body).with_status(404))
    }
}

pub struct InfimumPlugin {
    descriptor: PluginDescriptor,
    config: InfimumConfig,
    markdown: MarkdownOptions,
}

impl InfimumPlugin {
    pub fn new(config: InfimumConfig, markdown: MarkdownOptions) -> std::result::Result<Self, PluginError> {
        Ok(Self {
            descriptor: descriptor("infimum", include_str!("plugin.yaml"))?,
            config,
            markdown,
        })
    }
}

impl Plugin for InfimumPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn install(&self, site: &mut SiteBuilder) -> Result<()> {
        let theme = InfimumTheme::new(self.config.clone(), self.markdown.clone())?;
        site.register_main_provider("infimum", Arc::new(theme))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginsConfig;
    use crate::test_support::TestSite;
    use whisper_api::{PostStorage, Site};

    const PLUGINS: &[&str] = &["markdown", "file", "infimum"];

    async fn site_with_posts(t: &TestSite, count: usize) -> Site {
        for i in 0..count {
            let mut post = t.insert(&format!("post-{}", i), None, true).await;
            post.creation = 1_700_000_000 + i as i64;
            post.content = format!("*body {}*", i);
            post.set_tags(["all"]).unwrap();
            t.save(&mut post).await;
        }
        let mut config = PluginsConfig::default();
        config.infimum.page_size = 2;
        config.infimum.site_title = "Test & Co".to_string();
        t.site_with(PLUGINS, "infimum", &config)
    }

    #[tokio::test]
    async fn test_post_page_renders_markdown_and_tags() {
        let t = TestSite::new().await;
        let site = site_with_posts(&t, 1).await;
        let cx = RenderContext::new(&site, "", false);
        let post = site.find_post("post-0", false).await.unwrap().unwrap();

        let response = site.main().render(&cx, post).await.unwrap();
        let html = response.body_text();
        assert_eq!(response.status, 200);
        assert!(html.contains("<em>body 0</em>"));
        assert!(html.contains(r#"href="/tag/all/""#));
        assert!(html.contains("Test &amp; Co"));
    }

    #[tokio::test]
    async fn test_subpath_forwarded_to_file() {
        let t = TestSite::new().await;
        let site = site_with_posts(&t, 1).await;
        t.storage.save("post-0", "a.txt", b"attached").unwrap();
        let cx = RenderContext::new(&site, "a.txt", false);
        let post = site.find_post("post-0", false).await.unwrap().unwrap();

        let response = site.main().render(&cx, post).await.unwrap();
        assert_eq!(response.body, b"attached");
    }

    #[tokio::test]
    async fn test_listing_pages_and_clamping() {
        let t = TestSite::new().await;
        let site = site_with_posts(&t, 5).await;
        let cx = RenderContext::new(&site, "", false);

        let first = site.main().render_listing(&cx, 1, None).await.unwrap().body_text();
        assert!(first.contains("/post-4/") && first.contains("/post-3/"));
        assert!(!first.contains("/post-2/"));
        assert!(first.contains("1 / 3"));

        let last = site.main().render_listing(&cx, 1 << 32, None).await.unwrap().body_text();
        assert!(last.contains("/post-0/"));
        assert!(last.contains("3 / 3"));
        assert!(last.contains(r#"href="?page=2""#));
    }

    #[tokio::test]
    async fn test_listing_hides_private_posts() {
        let t = TestSite::new().await;
        let mut draft = t.insert("draft", None, false).await;
        draft.indexed = true;
        t.save(&mut draft).await;
        let site = t.site(PLUGINS, "infimum");

        let anonymous = RenderContext::new(&site, "", false);
        let body = site.main().render_listing(&anonymous, 1, None).await.unwrap().body_text();
        assert!(!body.contains("/draft/"));

        let admin = RenderContext::new(&site, "", true);
        let body = site.main().render_listing(&admin, 1, None).await.unwrap().body_text();
        assert!(body.contains("/draft/"));
        assert!(body.contains("(private)"));
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let t = TestSite::new().await;
        let site = t.site(PLUGINS, "infimum");
        let cx = RenderContext::new(&site, "", false);
        let response = site
            .main()
            .render_not_found(&cx, &NotFoundContext::new("/<nope>/", "post `nope`"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        // 路径经过HTML转义，斜杠也会被转义
        assert!(response.body_text().contains("&#x2F;&lt;nope&gt;&#x2F;"));
        assert!(!response.body_text().contains("<nope>"));
    }
}
