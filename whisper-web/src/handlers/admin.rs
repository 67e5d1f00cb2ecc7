use crate::{AppState, WebError};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;
use whisper_api::{EventPayload, ProviderUsage, Site};
use whisper_domain::{clamp_page, Post, PostFilter, MAX_PAGE};
use whisper_plugin::builtin::admin::events;

const TIME_FORMAT: &str = "%Y/%m/%d %H:%M";

/// 管理列表查询参数，`visible`和`index`取`0`或`1`
#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub visible: Option<u8>,
    pub index: Option<u8>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub provide: Option<String>,
    pub page: Option<i64>,
}

impl AdminListQuery {
    fn filter(&self) -> PostFilter {
        PostFilter::new()
            .with_tag(self.tag.clone())
            .with_public(self.visible.map(|v| v != 0))
            .with_indexed(self.index.map(|v| v != 0))
            .with_provider(self.provide.clone().filter(|p| !p.is_empty()))
            .with_search(self.search.clone().filter(|s| !s.is_empty()))
    }
}

/// 文章摘要
#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub provider: Option<String>,
    pub public: bool,
    pub indexed: bool,
    pub creation: i64,
    pub modified: i64,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug().to_string(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            provider: post.provider.clone(),
            public: post.public,
            indexed: post.indexed,
            creation: post.creation,
            modified: post.modified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse {
    pub posts: Vec<PostSummary>,
    pub page: u64,
    pub max_page: u64,
    pub prev_page: u64,
    pub next_page: u64,
    pub providers: Vec<ProviderUsage>,
}

/// 文章详情（编辑器使用）
#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content: String,
    pub tags: Vec<String>,
    pub meta: BTreeMap<String, String>,
    pub files: Vec<String>,
}

/// 编辑请求，缺省字段保持原值
#[derive(Debug, Default, Deserialize)]
pub struct EditPostRequest {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    /// 空字符串表示使用主provider
    pub provider: Option<String>,
    pub public: Option<bool>,
    pub indexed: Option<bool>,
    /// 本地时间，格式`%Y/%m/%d %H:%M`
    pub creation: Option<String>,
    /// 以逗号或换行分隔
    pub tags: Option<String>,
    pub meta: Option<BTreeMap<String, String>>,
}

impl EditPostRequest {
    fn apply(self, post: &mut Post) -> Result<(), WebError> {
        if let Some(slug) = self.slug.filter(|s| s != post.slug()) {
            post.set_slug(slug)?;
        }
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(excerpt) = self.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(provider) = self.provider {
            post.provider = Some(provider).filter(|p| !p.is_empty());
        }
        if let Some(public) = self.public {
            post.public = public;
        }
        if let Some(indexed) = self.indexed {
            post.indexed = indexed;
        }
        if let Some(creation) = self.creation {
            post.creation = parse_time(&creation)?;
        }
        if let Some(tags) = self.tags.filter(|t| !t.trim().is_empty()) {
            post.set_tags(split_tags(&tags))?;
        }
        if let Some(meta) = self.meta {
            post.set_meta(meta)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub slug: String,
}

fn parse_time(value: &str) -> Result<i64, WebError> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|e| WebError::BadRequest(format!("invalid creation time `{}`: {}", value, e)))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|time| time.timestamp())
        .ok_or_else(|| WebError::BadRequest(format!("invalid local time `{}`", value)))
}

fn split_tags(tags: &str) -> Vec<String> {
    tags.lines()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

async fn load_post(site: &Site, slug: &str) -> Result<Post, WebError> {
    site.find_post(slug, true)
        .await?
        .ok_or_else(|| whisper_api::Error::NotFound(format!("post `{}`", slug)).into())
}

async fn detail(site: &Site, mut post: Post) -> Result<PostDetail, WebError> {
    site.ensure_tags(&mut post).await?;
    site.ensure_meta(&mut post).await?;
    Ok(PostDetail {
        summary: PostSummary::from(&post),
        files: site.post_files(&post)?,
        tags: post.tags().map(|t| t.iter().cloned().collect()).unwrap_or_default(),
        meta: post.meta().cloned().unwrap_or_default(),
        content: post.content,
    })
}

/// 管理首页：文章列表和各provider的文章数
/// GET /admin/
pub async fn admin_home(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<AdminListResponse>, WebError> {
    let page = clamp_page(query.page.unwrap_or(1), MAX_PAGE);
    let listing = state
        .site
        .list_posts(query.filter(), page, state.admin.page_size.max(1))
        .await?;
    let max_page = listing.total_pages.max(1);
    let page_i64 = i64::try_from(page).unwrap_or(i64::MAX);
    let mut providers = state.site.repository().provider_usage().await?;
    providers.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(Json(AdminListResponse {
        posts: listing.posts.iter().map(PostSummary::from).collect(),
        page,
        max_page,
        prev_page: clamp_page(page_i64 - 1, max_page),
        next_page: clamp_page(page_i64.saturating_add(1), max_page),
        providers,
    }))
}

/// 文章详情
/// GET /admin/post/:slug/
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetail>, WebError> {
    let post = load_post(&state.site, &slug).await?;
    Ok(Json(detail(&state.site, post).await?))
}

/// 创建文章
/// POST /admin/post/
pub async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<Response, WebError> {
    state
        .site
        .events()
        .invoke(events::CREATE_POST, EventPayload::new().with("slug", request.slug.as_str()))?;
    let mut post = Post::new(request.slug)?;
    state.post_service.create(&mut post).await?;
    let detail = detail(&state.site, post).await?;
    Ok((StatusCode::CREATED, Json(detail)).into_response())
}

/// 编辑文章（包括改名）
/// POST /admin/post/:slug/
pub async fn edit_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<EditPostRequest>,
) -> Result<Json<PostDetail>, WebError> {
    let mut post = load_post(&state.site, &slug).await?;
    // 先加载快照，未变化的标签和元数据不会重写
    state.site.ensure_tags(&mut post).await?;
    state.site.ensure_meta(&mut post).await?;
    request.apply(&mut post)?;
    state.post_service.save(&mut post).await?;
    info!("Saved post {}", post.slug());
    Ok(Json(detail(&state.site, post).await?))
}

/// 上传或删除文章文件
/// POST /admin/post/:slug/files
///
/// multipart字段：`name`文件相对路径，`action`为`upload`或`delete`，上传时附带`file`。
pub async fn post_files(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, WebError> {
    let post = load_post(&state.site, &slug).await?;

    let (mut name, mut action, mut file) = (None, None, None);
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::BadRequest(format!("multipart: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| WebError::BadRequest(format!("multipart: {}", e)))?;
        match field_name.as_str() {
            "name" => name = Some(String::from_utf8_lossy(&bytes).into_owned()),
            "action" => action = Some(String::from_utf8_lossy(&bytes).into_owned()),
            "file" => file = Some(bytes),
            _ => {}
        }
    }
    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| WebError::BadRequest("missing file name".to_string()))?;

    let storage = state.site.storage();
    let payload = EventPayload::new()
        .with("slug", post.slug())
        .with("name", name.as_str());
    match action.as_deref() {
        Some("upload") => {
            let file = file.ok_or_else(|| WebError::BadRequest("missing file".to_string()))?;
            state.site.events().invoke(events::UPLOAD_FILE, payload)?;
            storage.save(post.original_slug(), &name, &file)?;
            info!("Uploaded {} to post {}", name, post.slug());
        }
        Some("delete") => {
            state.site.events().invoke(events::DELETE_FILE, payload)?;
            storage.delete_file(post.original_slug(), &name)?;
            info!("Deleted {} from post {}", name, post.slug());
        }
        _ => return Err(WebError::BadRequest("action must be upload or delete".to_string())),
    }
    Ok(Json(json!({ "files": state.site.post_files(&post)? })))
}

/// 删除文章
/// POST /admin/post/:slug/delete
pub async fn delete_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, WebError> {
    let post = load_post(&state.site, &slug).await?;
    state
        .site
        .events()
        .invoke(events::DELETE_POST, EventPayload::new().with("slug", slug.as_str()))?;
    state.post_service.delete(&post).await?;
    Ok(Json(json!({ "deleted": post.slug() })))
}
