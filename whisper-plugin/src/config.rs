use serde::{Deserialize, Serialize};
use whisper_api::MAIN_ALIAS;

/// Markdown扩展开关
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub smart_punctuation: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
        }
    }
}

/// markdown插件配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// 渲染后转发的目标，可被文章元数据`markdown:main`覆盖
    pub main: String,
    #[serde(flatten)]
    pub options: MarkdownOptions,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            main: MAIN_ALIAS.to_string(),
            options: MarkdownOptions::default(),
        }
    }
}

/// file插件配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// 渲染文件列表的provider，可被文章元数据`file:main`覆盖
    pub main: String,
    /// 插入到文件列表前的HTML
    pub css: String,
    /// 插入到文件列表后的HTML
    pub js: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            main: MAIN_ALIAS.to_string(),
            css: String::new(),
            js: String::new(),
        }
    }
}

/// infimum主题配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfimumConfig {
    pub page_size: u64,
    pub site_title: String,
}

impl Default for InfimumConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            site_title: "Whisper".to_string(),
        }
    }
}

/// 所有内置插件的配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    pub markdown: MarkdownConfig,
    pub file: FileConfig,
    pub infimum: InfimumConfig,
}
