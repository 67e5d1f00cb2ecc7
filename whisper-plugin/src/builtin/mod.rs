pub mod admin;
pub mod file;
pub mod infimum;
pub mod markdown;
pub mod stub;

use crate::config::PluginsConfig;
use crate::descriptor::PluginDescriptor;
use crate::plugin::{Plugin, PluginError};

/// 内置插件名称
pub const BUILTIN: &[&str] = &["markdown", "file", "infimum", "stub", "admin"];

/// 按名称创建内置插件
pub fn create(name: &str, config: &PluginsConfig) -> Result<Box<dyn Plugin>, PluginError> {
    let plugin: Box<dyn Plugin> = match name {
        "markdown" => Box::new(markdown::MarkdownPlugin::new(config.markdown.clone())?),
        "file" => Box::new(file::FilePlugin::new(config.file.clone())?),
        "infimum" => Box::new(infimum::InfimumPlugin::new(
            config.infimum.clone(),
            config.markdown.options.clone(),
        )?),
        "stub" => Box::new(stub::StubPlugin::new()?),
        "admin" => Box::new(admin::AdminPlugin::new()?),
        other => return Err(PluginError::Unknown(other.to_string())),
    };
    Ok(plugin)
}

/// 解析内嵌的plugin.yaml
pub(crate) fn descriptor(plugin: &str, yaml: &str) -> Result<PluginDescriptor, PluginError> {
    PluginDescriptor::from_yaml(yaml).map_err(|source| PluginError::Descriptor {
        plugin: plugin.to_string(),
        source,
    })
}
