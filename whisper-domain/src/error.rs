use thiserror::Error;

/// 实体构造或修改时的校验错误，校验失败的数据不会被持久化
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid slug `{0}`: must be dash-joined [a-z0-9]")]
    Slug(String),

    #[error("tag must not be empty")]
    EmptyTag,

    #[error("meta key must not be empty")]
    EmptyMetaKey,

    #[error("slug `{0}` is already taken")]
    SlugTaken(String),
}
