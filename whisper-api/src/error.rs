use thiserror::Error;
use whisper_domain::ValidationError;

/// 核心错误分类
///
/// `NotFound`和`Validation`可在边界恢复（渲染404页面或返回400），
/// 其余都是配置或编程错误：中止当前请求、记录完整上下文，但不终止服务进程。
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Provider `{provider}` not found for post `{slug}`")]
    ProviderNotFound { provider: String, slug: String },

    #[error("Unknown auth method `{0}`")]
    UnknownAuthMethod(String),

    #[error("Event handler #{index} of `{event}` returned an invalid result: {reason}")]
    InvalidHandlerResult {
        event: String,
        index: usize,
        reason: String,
    },

    #[error("Auth method `{0}` is not implemented")]
    MethodNotImplemented(String),

    #[error("Provider forwarding exceeded {limit} hops at `{provider}`")]
    ForwardingLimit { provider: String, limit: usize },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// 是否为致命错误（映射为通用的服务器错误响应）
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::NotFound(_) | Error::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(err.to_string()),
            _ => Error::Storage(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
