use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use whisper_plugin::PluginsConfig;
use whisper_web::AdminConfig;

/// 指定实例目录的环境变量
pub const INSTANCE_ENV: &str = "WHISPER_INSTANCE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub site: SiteConfig,
    /// `markdown`、`file`、`infimum`各插件的配置段
    #[serde(flatten)]
    pub plugins: PluginsConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 为空时使用实例目录下的SQLite数据库
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// 实例目录，存放数据库和文章文件
    pub instance_path: PathBuf,
    /// 主provider名称
    pub main: String,
    /// 按顺序加载的插件
    pub plugins: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            instance_path: PathBuf::from("instance"),
            main: "infimum".to_string(),
            plugins: ["markdown", "file", "infimum", "admin"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// 依次读取`./whisper.toml`、`$WHISPER_INSTANCE/whisper.toml`和`WHISPER__`前缀的环境变量
    pub fn load() -> Result<Self, config::ConfigError> {
        let instance = std::env::var_os(INSTANCE_ENV).map(PathBuf::from);
        let mut config = Self::load_from(Path::new("whisper.toml"), instance.as_deref())?;
        if let Some(instance) = instance {
            config.site.instance_path = instance;
        }
        Ok(config)
    }

    pub fn load_from(local: &Path, instance: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::File::from(local).required(false));
        if let Some(instance) = instance {
            builder = builder.add_source(config::File::from(instance.join("whisper.toml")).required(false));
        }
        builder
            .add_source(
                config::Environment::with_prefix("WHISPER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("site.plugins"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn database_url(&self) -> String {
        match &self.database.url {
            Some(url) => url.clone(),
            None => format!(
                "sqlite://{}?mode=rwc",
                self.site.instance_path.join("whisper.db").display()
            ),
        }
    }

    /// 文章私有文件的根目录
    pub fn posts_path(&self) -> PathBuf {
        self.site.instance_path.join("posts")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
