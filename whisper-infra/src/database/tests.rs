use super::*;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use whisper_api::PostRepository;
use whisper_domain::{Post, PostFilter};
use whisper_migration::{Migrator, MigratorTrait};

async fn setup() -> SeaOrmPostRepository {
    let db: DatabaseConnection = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    SeaOrmPostRepository::new(Arc::new(db))
}

fn post(slug: &str, creation: i64, public: bool) -> Post {
    let mut post = Post::new(slug).unwrap();
    post.title = format!("Title of {}", slug);
    post.content = "content".to_string();
    post.creation = creation;
    post.modified = creation;
    post.public = public;
    post.indexed = public;
    post
}

async fn save(repo: &SeaOrmPostRepository, post: &mut Post) {
    repo.upsert_post(post).await.unwrap();
    post.mark_saved();
}

#[tokio::test]
async fn test_find_respects_visibility() {
    let repo = setup().await;
    save(&repo, &mut post("hidden", 1, false)).await;

    assert!(repo.find_post("hidden", false).await.unwrap().is_none());
    let found = repo.find_post("hidden", true).await.unwrap().unwrap();
    assert_eq!(found.slug(), "hidden");
    assert_eq!(found.title, "Title of hidden");
    assert!(!found.tags_loaded());
}

#[tokio::test]
async fn test_tags_and_meta_round_trip() {
    let repo = setup().await;
    let mut p = post("hello", 1, true);
    p.set_tags(["rust", "web"]).unwrap();
    p.set_meta([("markdown:main", "1")]).unwrap();
    save(&repo, &mut p).await;

    let mut found = repo.find_post("hello", false).await.unwrap().unwrap();
    repo.load_tags(&mut found).await.unwrap();
    repo.load_meta(&mut found).await.unwrap();
    let tags: Vec<&str> = found.tags().unwrap().iter().map(String::as_str).collect();
    assert_eq!(tags, vec!["rust", "web"]);
    assert_eq!(found.meta_value("markdown:main"), Some("1"));
    assert!(!found.tags_dirty());
}

#[tokio::test]
async fn test_clean_tags_are_not_rewritten() {
    let repo = setup().await;
    let mut p = post("hello", 1, true);
    p.set_tags(["rust"]).unwrap();
    save(&repo, &mut p).await;

    // 未加载标签的文章保存时不会清空已有标签
    let mut fresh = repo.find_post("hello", true).await.unwrap().unwrap();
    fresh.title = "changed".to_string();
    repo.upsert_post(&fresh).await.unwrap();

    repo.load_tags(&mut fresh).await.unwrap();
    assert_eq!(fresh.tags().unwrap().len(), 1);
    assert_eq!(fresh.title, "changed");
}

#[tokio::test]
async fn test_rename_moves_tags_and_meta() {
    let repo = setup().await;
    let mut p = post("old", 1, true);
    p.set_tags(["a"]).unwrap();
    p.set_meta([("k", "v")]).unwrap();
    save(&repo, &mut p).await;

    p.set_slug("new").unwrap();
    save(&repo, &mut p).await;

    assert!(repo.find_post("old", true).await.unwrap().is_none());
    let mut renamed = repo.find_post("new", true).await.unwrap().unwrap();
    repo.load_tags(&mut renamed).await.unwrap();
    repo.load_meta(&mut renamed).await.unwrap();
    assert!(renamed.tags().unwrap().contains("a"));
    assert_eq!(renamed.meta_value("k"), Some("v"));
}

#[tokio::test]
async fn test_list_filters_and_orders() {
    let repo = setup().await;
    for (i, slug) in ["first", "second", "third"].iter().enumerate() {
        let mut p = post(slug, i as i64 + 1, true);
        if *slug != "second" {
            p.set_tags(["odd"]).unwrap();
        }
        save(&repo, &mut p).await;
    }
    save(&repo, &mut post("draft", 10, false)).await;

    let filter = PostFilter::new().with_public(Some(true));
    let page = repo.list_posts(&filter, 1, 2).await.unwrap();
    let slugs: Vec<&str> = page.posts.iter().map(Post::slug).collect();
    assert_eq!(slugs, vec!["third", "second"]);
    assert_eq!(page.total_pages, 2);

    let page = repo.list_posts(&filter, 2, 2).await.unwrap();
    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].slug(), "first");

    let tagged = filter.clone().with_tag(Some("odd".to_string()));
    let page = repo.list_posts(&tagged, 1, 10).await.unwrap();
    let slugs: Vec<&str> = page.posts.iter().map(Post::slug).collect();
    assert_eq!(slugs, vec!["third", "first"]);

    let search = PostFilter::new().with_search(Some("of sec".to_string()));
    let page = repo.list_posts(&search, 1, 10).await.unwrap();
    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].slug(), "second");
}

#[tokio::test]
async fn test_list_beyond_last_page_is_empty() {
    let repo = setup().await;
    save(&repo, &mut post("only", 1, true)).await;
    let page = repo.list_posts(&PostFilter::new(), 5, 10).await.unwrap();
    assert!(page.posts.is_empty());
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_delete_removes_children() {
    let repo = setup().await;
    let mut p = post("gone", 1, true);
    p.set_tags(["t"]).unwrap();
    save(&repo, &mut p).await;

    repo.delete_post("gone").await.unwrap();
    assert!(repo.find_post("gone", true).await.unwrap().is_none());
    let page = repo
        .list_posts(&PostFilter::new().with_tag(Some("t".to_string())), 1, 10)
        .await
        .unwrap();
    assert!(page.posts.is_empty());
}

#[tokio::test]
async fn test_provider_usage() {
    let repo = setup().await;
    let mut a = post("a", 1, true);
    a.provider = Some("markdown".to_string());
    let mut b = post("b", 2, true);
    b.provider = Some("markdown".to_string());
    save(&repo, &mut a).await;
    save(&repo, &mut b).await;
    save(&repo, &mut post("c", 3, true)).await;

    let usage = repo.provider_usage().await.unwrap();
    assert_eq!(usage[0].name.as_deref(), Some("markdown"));
    assert_eq!(usage[0].count, 2);
    assert_eq!(usage[1].name, None);
    assert_eq!(usage[1].count, 1);
}
