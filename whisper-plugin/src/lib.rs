pub mod builtin;
pub mod config;
pub mod descriptor;
pub mod manager;
pub mod plugin;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::PluginsConfig;
pub use descriptor::PluginDescriptor;
pub use manager::PluginManager;
pub use plugin::{Plugin, PluginError};
