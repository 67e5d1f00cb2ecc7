use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use whisper_domain::{Post, PostFilter, PostPage};

/// 每个provider名下的文章数量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUsage {
    pub name: Option<String>,
    pub count: u64,
}

/// 文章存储边界
///
/// 实现方负责存储结构，核心只要求slug唯一以及`Post`中列出的字段。
/// 每个请求使用实现方自己管理的连接，不在并发请求间共享事务。
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// 按slug查找；`include_private`为false时只返回公开文章
    async fn find_post(&self, slug: &str, include_private: bool) -> Result<Option<Post>>;

    /// 加载标签并记录快照
    async fn load_tags(&self, post: &mut Post) -> Result<()>;

    /// 加载元数据并记录快照
    async fn load_meta(&self, post: &mut Post) -> Result<()>;

    /// 分页列出文章，按创建时间倒序，页码从1开始
    async fn list_posts(&self, filter: &PostFilter, page: u64, page_size: u64) -> Result<PostPage>;

    /// 以原始slug为键写入文章。标签和元数据仅在变化时重写；
    /// slug变化时在同一事务中完成重命名
    async fn upsert_post(&self, post: &Post) -> Result<()>;

    /// 删除文章，标签和元数据随之删除
    async fn delete_post(&self, slug: &str) -> Result<()>;

    async fn provider_usage(&self) -> Result<Vec<ProviderUsage>>;
}

/// 文章私有文件存储，每篇文章对应一个以slug命名的目录
pub trait PostStorage: Send + Sync {
    fn post_dir(&self, slug: &str) -> PathBuf;

    /// 递归列出文章目录下的所有文件（相对路径，以`/`分隔）
    fn list_files(&self, slug: &str) -> Result<Vec<String>>;

    /// 解析文章目录下的文件路径，文件不存在或越出目录时返回`NotFound`
    fn resolve(&self, slug: &str, path: &str) -> Result<PathBuf>;

    fn read(&self, slug: &str, path: &str) -> Result<Vec<u8>>;

    fn save(&self, slug: &str, path: &str, content: &[u8]) -> Result<()>;

    fn delete_file(&self, slug: &str, path: &str) -> Result<()>;

    /// 重命名文章目录，原目录不存在时什么也不做
    fn rename_dir(&self, from: &str, to: &str) -> Result<()>;

    /// 递归删除文章目录，目录不存在时什么也不做
    fn remove_dir(&self, slug: &str) -> Result<()>;
}
