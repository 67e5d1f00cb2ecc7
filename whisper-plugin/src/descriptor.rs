use serde::{Deserialize, Serialize};

/// 插件描述符
/// 从插件元数据文件（plugin.yaml）中读取
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// 插件ID（唯一标识符，同时是配置中使用的名称）
    pub id: String,

    /// 插件版本（SemVer格式）
    pub version: String,

    /// 插件描述
    #[serde(default)]
    pub description: Option<String>,

    /// 必须先于本插件加载的插件ID
    #[serde(default)]
    pub requires: Vec<String>,
}

impl PluginDescriptor {
    /// 从YAML字符串解析插件描述符
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}
