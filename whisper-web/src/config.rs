use serde::{Deserialize, Serialize};
use std::time::Duration;
use whisper_service::AuthConfig;

/// 管理后台配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// 管理列表每页文章数
    pub page_size: u64,
    /// 普通会话有效期（秒）
    pub session_ttl: u64,
    /// 勾选“信任此设备”后的会话有效期（秒）
    pub trusted_session_ttl: u64,
    pub auth: AuthConfig,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            session_ttl: 24 * 3600,
            trusted_session_ttl: 31 * 24 * 3600,
            auth: AuthConfig::default(),
        }
    }
}

impl AdminConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl)
    }

    pub fn trusted_session_ttl(&self) -> Duration {
        Duration::from_secs(self.trusted_session_ttl)
    }
}
