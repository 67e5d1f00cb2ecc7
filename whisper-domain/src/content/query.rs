use super::post::Post;

/// 列表页码上限
pub const MAX_PAGE: u64 = 1 << 32;

/// 将页码限制在`[1, max]`内，越界时截断而不是报错
pub fn clamp_page(page: i64, max: u64) -> u64 {
    let max = max.max(1);
    if page < 1 {
        1
    } else {
        (page as u64).min(max)
    }
}

/// 文章列表查询条件，`None`表示不过滤
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub tag: Option<String>,
    pub indexed: Option<bool>,
    pub public: Option<bool>,
    pub provider: Option<String>,
    pub search: Option<String>,
}

impl PostFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag.filter(|t| !t.is_empty());
        self
    }

    pub fn with_indexed(mut self, indexed: Option<bool>) -> Self {
        self.indexed = indexed;
        self
    }

    pub fn with_public(mut self, public: Option<bool>) -> Self {
        self.public = public;
        self
    }

    pub fn with_provider(mut self, provider: Option<String>) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search;
        self
    }

    /// 搜索词按空白拆分后以`%`连接，用于LIKE匹配
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|search| {
            let mut pattern = String::from("%");
            for word in search.split_whitespace() {
                pattern.push_str(word);
                pattern.push('%');
            }
            pattern
        })
    }
}

/// 一页文章及总页数
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total_pages: u64,
}

impl PostPage {
    /// 根据总数和每页大小计算总页数（向上取整）
    pub fn total_pages_for(count: u64, page_size: u64) -> u64 {
        if page_size == 0 {
            return 0;
        }
        count.div_ceil(page_size)
    }
}
