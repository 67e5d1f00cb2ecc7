use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};
use whisper_api::{names, EventPayload, Result, Site};
use whisper_domain::{Post, ValidationError};

/// 文章服务：负责保存、重命名和删除的完整流程
#[async_trait]
pub trait PostService: Send + Sync {
    /// 创建新文章，slug已存在时失败
    async fn create(&self, post: &mut Post) -> Result<()>;

    /// 保存文章；slug变化时同时移动私有文件目录
    async fn save(&self, post: &mut Post) -> Result<()>;

    /// 删除文章及其私有文件目录，不可恢复
    async fn delete(&self, post: &Post) -> Result<()>;
}

/// 默认文章服务实现
pub struct DefaultPostService {
    site: Arc<Site>,
}

impl DefaultPostService {
    pub fn new(site: Arc<Site>) -> Self {
        Self { site }
    }

    async fn ensure_free(&self, slug: &str) -> Result<()> {
        if self.site.repository().find_post(slug, true).await?.is_some() {
            return Err(ValidationError::SlugTaken(slug.to_string()).into());
        }
        Ok(())
    }
}

fn post_payload(post: &Post) -> EventPayload {
    EventPayload::new()
        .with("slug", post.slug())
        .with("original_slug", post.original_slug())
        .with("provider", post.provider.clone())
        .with("public", post.public)
}

#[async_trait]
impl PostService for DefaultPostService {
    async fn create(&self, post: &mut Post) -> Result<()> {
        self.ensure_free(post.slug()).await?;
        self.save(post).await?;
        info!("Created post {}", post.slug());
        Ok(())
    }

    async fn save(&self, post: &mut Post) -> Result<()> {
        let site = self.site.as_ref();
        let renamed = post.is_renamed();
        if renamed {
            self.ensure_free(post.slug()).await?;
        }

        site.events().invoke(names::CORE_SAVE_POST, post_payload(post))?;
        if post.tags_dirty() {
            let tags: Vec<&String> = post.tags().into_iter().flatten().collect();
            site.events().invoke(
                names::CORE_SAVE_POST_TAGS,
                post_payload(post).with("tags", json!(tags)),
            )?;
        }
        if post.meta_dirty() {
            let meta = post.meta().map_or(Value::Null, |meta| json!(meta));
            site.events().invoke(
                names::CORE_SAVE_POST_META,
                post_payload(post).with("meta", meta),
            )?;
        }

        post.touch();
        let (from, to) = (post.original_slug().to_string(), post.slug().to_string());
        if renamed {
            site.storage().rename_dir(&from, &to)?;
        }
        if let Err(e) = site.repository().upsert_post(post).await {
            if renamed {
                if let Err(undo) = site.storage().rename_dir(&to, &from) {
                    error!("Failed to restore directory of post {}: {}", from, undo);
                }
            }
            return Err(e);
        }
        if renamed {
            site.events().invoke(
                names::CORE_CHANGE_POST_SLUG,
                EventPayload::new().with("from", from.as_str()).with("to", to.as_str()),
            )?;
            info!("Renamed post {} to {}", from, to);
        }
        post.mark_saved();
        Ok(())
    }

    async fn delete(&self, post: &Post) -> Result<()> {
        let site = self.site.as_ref();
        site.events().invoke(names::CORE_DELETE_POST, post_payload(post))?;
        site.repository().delete_post(post.original_slug()).await?;
        site.storage().remove_dir(post.original_slug())?;
        info!("Deleted post {}", post.original_slug());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestSite;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use whisper_api::{Error, PostStorage};

    fn counting(counter: &Arc<AtomicUsize>) -> impl Fn(EventPayload) -> std::result::Result<EventPayload, whisper_api::HandlerError> {
        let counter = counter.clone();
        move |p| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(p)
        }
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let t = TestSite::new().await;
        let site = t.build(|_| {});
        let service = DefaultPostService::new(site.clone());

        let mut post = Post::new("round-trip").unwrap();
        post.title = "Title".to_string();
        post.excerpt = "Excerpt".to_string();
        post.content = "Body".to_string();
        post.provider = Some("markdown".to_string());
        post.public = true;
        post.indexed = true;
        post.set_tags(["a", "b"]).unwrap();
        post.set_meta([("k", "v")]).unwrap();
        service.create(&mut post).await.unwrap();

        let mut found = site.find_post("round-trip", false).await.unwrap().unwrap();
        site.ensure_tags(&mut found).await.unwrap();
        site.ensure_meta(&mut found).await.unwrap();
        assert_eq!(found.title, "Title");
        assert_eq!(found.excerpt, "Excerpt");
        assert_eq!(found.content, "Body");
        assert_eq!(found.provider.as_deref(), Some("markdown"));
        assert!(found.public && found.indexed);
        assert_eq!(found.tags(), post.tags());
        assert_eq!(found.meta(), post.meta());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate() {
        let t = TestSite::new().await;
        t.insert("taken", None, true).await;
        let service = DefaultPostService::new(t.build(|_| {}));

        let mut post = Post::new("taken").unwrap();
        assert!(matches!(
            service.create(&mut post).await,
            Err(Error::Validation(ValidationError::SlugTaken(_)))
        ));
    }

    #[tokio::test]
    async fn test_rename_moves_directory() {
        let t = TestSite::new().await;
        let mut post = t.insert("a", None, true).await;
        t.storage.save("a", "note.txt", b"hi").unwrap();

        let changes = Arc::new(AtomicUsize::new(0));
        let site = t.build(|b| {
            b.on(names::CORE_CHANGE_POST_SLUG, counting(&changes));
        });
        let service = DefaultPostService::new(site.clone());

        post.set_slug("b").unwrap();
        service.save(&mut post).await.unwrap();

        assert!(site.find_post("a", true).await.unwrap().is_none());
        let found = site.find_post("b", true).await.unwrap().unwrap();
        assert_eq!(found.title, "A");
        assert_eq!(site.post_files(&found).unwrap(), vec!["note.txt"]);
        assert!(!t.storage.post_dir("a").exists());
        assert_eq!(post.original_slug(), "b");
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rename_to_taken_slug_fails() {
        let t = TestSite::new().await;
        let mut post = t.insert("a", None, true).await;
        t.insert("b", None, true).await;
        let service = DefaultPostService::new(t.build(|_| {}));

        post.set_slug("b").unwrap();
        assert!(service.save(&mut post).await.is_err());
        assert_eq!(post.original_slug(), "a");
    }

    #[tokio::test]
    async fn test_unchanged_tags_skip_tag_event() {
        let t = TestSite::new().await;
        let mut post = t.insert("quiet", None, true).await;
        let tag_saves = Arc::new(AtomicUsize::new(0));
        let site = t.build(|b| {
            b.on(names::CORE_SAVE_POST_TAGS, counting(&tag_saves));
        });
        let service = DefaultPostService::new(site.clone());

        site.ensure_tags(&mut post).await.unwrap();
        post.title = "edited".to_string();
        service.save(&mut post).await.unwrap();
        assert_eq!(tag_saves.load(Ordering::SeqCst), 0);

        post.set_tags(["new"]).unwrap();
        service.save(&mut post).await.unwrap();
        assert_eq!(tag_saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_post_and_files() {
        let t = TestSite::new().await;
        let post = t.insert("doomed", None, true).await;
        t.storage.save("doomed", "x.bin", b"x").unwrap();
        let site = t.build(|_| {});
        let service = DefaultPostService::new(site.clone());

        service.delete(&post).await.unwrap();
        assert!(site.find_post("doomed", true).await.unwrap().is_none());
        assert!(!t.storage.post_dir("doomed").exists());
    }
}
