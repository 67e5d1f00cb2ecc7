use crate::builtin;
use crate::config::PluginsConfig;
use crate::descriptor::PluginDescriptor;
use crate::plugin::{Plugin, PluginError};
use tracing::info;
use whisper_api::SiteBuilder;

/// 插件管理器
///
/// 按配置顺序加载插件，依赖的插件必须已经加载。
#[derive(Debug, Default)]
pub struct PluginManager {
    loaded: Vec<PluginDescriptor>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded.iter().any(|d| d.id == id)
    }

    /// 已加载插件的描述符（加载顺序）
    pub fn loaded(&self) -> &[PluginDescriptor] {
        &self.loaded
    }

    /// 加载单个插件
    pub fn load(&mut self, plugin: &dyn Plugin, site: &mut SiteBuilder) -> Result<(), PluginError> {
        let descriptor = plugin.descriptor();
        if self.is_loaded(&descriptor.id) {
            return Err(PluginError::AlreadyLoaded(descriptor.id.clone()));
        }
        if let Some(missing) = descriptor.requires.iter().find(|r| !self.is_loaded(r)) {
            return Err(PluginError::MissingRequirement {
                plugin: descriptor.id.clone(),
                requires: missing.clone(),
            });
        }
        plugin.install(site).map_err(|source| PluginError::Install {
            plugin: descriptor.id.clone(),
            source,
        })?;
        info!("Loaded plugin {} {}", descriptor.id, descriptor.version);
        self.loaded.push(descriptor.clone());
        Ok(())
    }

    /// 按名称顺序加载内置插件
    pub fn load_all(
        &mut self,
        names: &[String],
        config: &PluginsConfig,
        site: &mut SiteBuilder,
    ) -> Result<(), PluginError> {
        for name in names {
            let plugin = builtin::create(name, config)?;
            self.load(plugin.as_ref(), site)?;
        }
        Ok(())
    }
}
