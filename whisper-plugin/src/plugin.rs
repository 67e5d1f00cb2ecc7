use crate::descriptor::PluginDescriptor;
use thiserror::Error;
use whisper_api::SiteBuilder;

/// 插件加载错误
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Unknown plugin `{0}`")]
    Unknown(String),

    #[error("Plugin `{0}` is already loaded")]
    AlreadyLoaded(String),

    #[error("Plugin `{plugin}` requires `{requires}` to be loaded first")]
    MissingRequirement { plugin: String, requires: String },

    #[error("Invalid descriptor of plugin `{plugin}`: {source}")]
    Descriptor {
        plugin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to install plugin `{plugin}`: {source}")]
    Install {
        plugin: String,
        #[source]
        source: whisper_api::Error,
    },
}

/// 插件trait
/// 所有插件必须实现此trait
pub trait Plugin: Send + Sync {
    /// 获取插件描述符
    fn descriptor(&self) -> &PluginDescriptor;

    /// 在启动阶段注册provider和事件处理器
    fn install(&self, site: &mut SiteBuilder) -> whisper_api::Result<()>;
}
