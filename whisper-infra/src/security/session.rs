use crate::cache::Cache;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use whisper_api::{Error, Result};

/// 登录会话
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub id: String,
    pub admin: bool,
    /// 登录时勾选了“信任此设备”
    pub trusted: bool,
    pub created_at: i64,
}

/// Session服务trait
#[async_trait]
pub trait SessionService: Send + Sync {
    /// 创建管理员会话，返回session id
    async fn create(&self, trusted: bool) -> Result<AdminSession>;

    async fn get(&self, session_id: &str) -> Result<Option<AdminSession>>;

    async fn delete(&self, session_id: &str) -> Result<()>;
}

/// 基于缓存的Session服务实现
pub struct MemorySessionService {
    cache: Arc<dyn Cache>,
    ttl: Duration,
    trusted_ttl: Duration,
    session_prefix: String,
}

impl MemorySessionService {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration, trusted_ttl: Duration) -> Self {
        Self {
            cache,
            ttl,
            trusted_ttl,
            session_prefix: "session:".to_string(),
        }
    }

    fn session_key(&self, session_id: &str) -> String {
        format!("{}{}", self.session_prefix, session_id)
    }
}

#[async_trait]
impl SessionService for MemorySessionService {
    async fn create(&self, trusted: bool) -> Result<AdminSession> {
        let session = AdminSession {
            id: Uuid::new_v4().to_string(),
            admin: true,
            trusted,
            created_at: Utc::now().timestamp(),
        };
        let json = serde_json::to_string(&session)
            .map_err(|e| Error::Storage(format!("Serialize session error: {}", e)))?;
        let ttl = if trusted { self.trusted_ttl } else { self.ttl };
        self.cache.set(&self.session_key(&session.id), &json, Some(ttl)).await;
        Ok(session)
    }

    async fn get(&self, session_id: &str) -> Result<Option<AdminSession>> {
        match self.cache.get(&self.session_key(session_id)).await {
            Some(json) => {
                let session = serde_json::from_str(&json)
                    .map_err(|e| Error::Storage(format!("Deserialize session error: {}", e)))?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.cache.delete(&self.session_key(session_id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn service() -> MemorySessionService {
        MemorySessionService::new(
            Arc::new(MemoryCache::default()),
            Duration::from_secs(60),
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let sessions = service();
        let session = sessions.create(true).await.unwrap();
        assert!(session.admin);

        let loaded = sessions.get(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded, session);

        sessions.delete(&session.id).await.unwrap();
        assert!(sessions.get(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        assert!(service().get("nope").await.unwrap().is_none());
    }
}
