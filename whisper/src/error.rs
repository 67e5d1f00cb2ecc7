use thiserror::Error;

/// 启动阶段的错误
#[derive(Error, Debug)]
pub enum WhisperError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Plugin error: {0}")]
    Plugin(#[from] whisper_plugin::PluginError),

    #[error(transparent)]
    Core(#[from] whisper_api::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WhisperError>;
