use super::loaded::Loaded;
use crate::error::ValidationError;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern is a valid regex")
    })
}

/// 检查slug格式：以短横线连接的[a-z0-9]片段
pub fn is_valid_slug(slug: &str) -> bool {
    slug_pattern().is_match(slug)
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(ValidationError::Slug(slug.to_string()))
    }
}

/// posts表中的一行，不含标签和元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub slug: String,
    pub provider: Option<String>,
    pub public: bool,
    pub indexed: bool,
    pub creation: i64,
    pub modified: i64,
    pub title: String,
    pub excerpt: String,
    pub content: String,
}

/// 文章实体
///
/// `slug`是唯一标识。重命名时仍以加载时的原始slug定位存储中的记录，
/// 保存成功后原始slug才更新为新值。
/// 标签和元数据按需加载，只有与加载时的快照不同时才会重写。
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    slug: String,
    original_slug: String,
    pub provider: Option<String>,
    pub public: bool,
    pub indexed: bool,
    pub creation: i64,
    pub modified: i64,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    tags: Loaded<BTreeSet<String>>,
    meta: Loaded<BTreeMap<String, String>>,
}

impl Post {
    /// 创建新文章，时间戳取当前时间
    pub fn new(slug: impl Into<String>) -> Result<Self, ValidationError> {
        let now = Utc::now().timestamp();
        Self::from_record(PostRecord {
            slug: slug.into(),
            provider: None,
            public: false,
            indexed: false,
            creation: now,
            modified: now,
            title: String::new(),
            excerpt: String::new(),
            content: String::new(),
        })
    }

    /// 从存储记录构造
    pub fn from_record(record: PostRecord) -> Result<Self, ValidationError> {
        validate_slug(&record.slug)?;
        let now = Utc::now().timestamp();
        Ok(Self {
            original_slug: record.slug.clone(),
            slug: record.slug,
            provider: record.provider,
            public: record.public,
            indexed: record.indexed,
            creation: if record.creation != 0 { record.creation } else { now },
            modified: if record.modified != 0 { record.modified } else { now },
            title: record.title,
            excerpt: record.excerpt,
            content: record.content,
            tags: Loaded::unloaded(),
            meta: Loaded::unloaded(),
        })
    }

    /// 转换为存储记录（使用当前slug）
    pub fn to_record(&self) -> PostRecord {
        PostRecord {
            slug: self.slug.clone(),
            provider: self.provider.clone(),
            public: self.public,
            indexed: self.indexed,
            creation: self.creation,
            modified: self.modified,
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// 存储中的标识
    pub fn original_slug(&self) -> &str {
        &self.original_slug
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) -> Result<(), ValidationError> {
        let slug = slug.into();
        validate_slug(&slug)?;
        self.slug = slug;
        Ok(())
    }

    pub fn is_renamed(&self) -> bool {
        self.slug != self.original_slug
    }

    /// 入口provider名称，未设置或为空时使用默认值
    pub fn provider_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.provider.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => default,
        }
    }

    pub fn tags(&self) -> Option<&BTreeSet<String>> {
        self.tags.get()
    }

    pub fn set_tags<I, S>(&mut self, tags: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        if tags.contains("") {
            return Err(ValidationError::EmptyTag);
        }
        self.tags.replace(tags);
        Ok(())
    }

    pub fn tags_loaded(&self) -> bool {
        self.tags.is_loaded()
    }

    pub fn tags_dirty(&self) -> bool {
        self.tags.is_dirty()
    }

    /// 由存储层调用，记录加载快照
    pub fn load_tags(&mut self, tags: BTreeSet<String>) {
        self.tags = Loaded::from_store(tags);
    }

    pub fn meta(&self) -> Option<&BTreeMap<String, String>> {
        self.meta.get()
    }

    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta.get().and_then(|meta| meta.get(key)).map(String::as_str)
    }

    pub fn set_meta<I, K, V>(&mut self, meta: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let meta: BTreeMap<String, String> = meta
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if meta.contains_key("") {
            return Err(ValidationError::EmptyMetaKey);
        }
        self.meta.replace(meta);
        Ok(())
    }

    pub fn meta_loaded(&self) -> bool {
        self.meta.is_loaded()
    }

    pub fn meta_dirty(&self) -> bool {
        self.meta.is_dirty()
    }

    pub fn load_meta(&mut self, meta: BTreeMap<String, String>) {
        self.meta = Loaded::from_store(meta);
    }

    /// 更新修改时间
    pub fn touch(&mut self) {
        self.modified = Utc::now().timestamp();
    }

    /// 保存成功后调用：快照和原始slug同步为当前值
    pub fn mark_saved(&mut self) {
        self.tags.commit();
        self.meta.commit();
        self.original_slug = self.slug.clone();
    }
}
