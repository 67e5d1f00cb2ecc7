use crate::builtin::descriptor;
use crate::descriptor::PluginDescriptor;
use crate::plugin::{Plugin, PluginError};
use serde_json::Value;
use tracing::{info, warn};
use whisper_api::{names, EventPayload, Result, SiteBuilder};

/// 管理后台触发的事件
pub mod events {
    pub const AUTH: &str = "admin:auth";
    pub const DEAUTH: &str = "admin:deauth";
    pub const CHECK: &str = "admin:check";
    pub const CREATE_POST: &str = "admin:create_post";
    pub const DELETE_POST: &str = "admin:delete_post";
    pub const UPLOAD_FILE: &str = "admin:upload_file";
    pub const DELETE_FILE: &str = "admin:delete_file";
    pub const UNAUTHORIZED: &str = "admin:unauthorized";

    /// 需要审计日志的事件
    pub const AUDITED: &[&str] = &[
        AUTH,
        DEAUTH,
        CHECK,
        CREATE_POST,
        DELETE_POST,
        UPLOAD_FILE,
        DELETE_FILE,
    ];
}

/// `session_is_admin`的默认处理器：读取会话的`admin`字段
///
/// 已有处理器写入结果时不覆盖。
fn session_is_admin(mut payload: EventPayload) -> std::result::Result<EventPayload, whisper_api::HandlerError> {
    if payload.get_bool("is_admin").is_some() {
        return Ok(payload);
    }
    let is_admin = payload
        .get("session")
        .and_then(|session| session.get("admin"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    payload.insert("is_admin", is_admin);
    Ok(payload)
}

pub struct AdminPlugin {
    descriptor: PluginDescriptor,
}

impl AdminPlugin {
    pub fn new() -> std::result::Result<Self, PluginError> {
        Ok(Self {
            descriptor: descriptor("admin", include_str!("plugin.yaml"))?,
        })
    }
}

impl Plugin for AdminPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn install(&self, site: &mut SiteBuilder) -> Result<()> {
        site.on(names::SESSION_IS_ADMIN, session_is_admin);
        for event in events::AUDITED {
            site.on(*event, move |payload: EventPayload| {
                info!(event = *event, data = ?payload.data(), "Admin action");
                Ok(payload)
            });
        }
        site.on(events::UNAUTHORIZED, |payload: EventPayload| {
            warn!(path = payload.get_str("path").unwrap_or_default(), "Unauthorized admin access");
            Ok(payload)
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestSite;
    use serde_json::json;

    #[tokio::test]
    async fn test_session_is_admin_reads_session() {
        let t = TestSite::new().await;
        let site = t.site(&["stub", "admin"], "stub");
        let events = site.events();

        let admin = EventPayload::new().with("session", json!({"id": "s", "admin": true}));
        assert_eq!(events.invoke(names::SESSION_IS_ADMIN, admin).unwrap().get_bool("is_admin"), Some(true));

        let anonymous = EventPayload::new();
        assert_eq!(
            events.invoke(names::SESSION_IS_ADMIN, anonymous).unwrap().get_bool("is_admin"),
            Some(false)
        );
    }

    #[test]
    fn test_earlier_decision_is_kept() {
        let payload = EventPayload::new()
            .with("session", json!({"admin": true}))
            .with("is_admin", false);
        assert_eq!(session_is_admin(payload).unwrap().get_bool("is_admin"), Some(false));
    }

    #[tokio::test]
    async fn test_audit_handlers_pass_payload_through() {
        let t = TestSite::new().await;
        let site = t.site(&["stub", "admin"], "stub");
        for event in events::AUDITED {
            let result = site
                .events()
                .invoke(event, EventPayload::new().with("slug", "a"))
                .unwrap();
            assert_eq!(result.get_str("slug"), Some("a"));
        }
    }
}
