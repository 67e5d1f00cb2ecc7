use crate::config::AdminConfig;
use std::sync::Arc;
use whisper_api::{Result, Site};
use whisper_infra::SessionService;
use whisper_service::{AuthMethodRegistry, AuthPolicy, DefaultPostService, Dispatcher, PostService};

/// 应用状态
/// 包含所有需要的服务实例
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<Site>,
    pub dispatcher: Dispatcher,
    pub post_service: Arc<dyn PostService>,
    pub session_service: Arc<dyn SessionService>,
    pub auth_methods: Arc<AuthMethodRegistry>,
    pub auth_policy: Arc<AuthPolicy>,
    pub admin: Arc<AdminConfig>,
}

impl AppState {
    /// 组装应用状态，策略引用了未配置的方法时失败
    pub fn new(site: Arc<Site>, session_service: Arc<dyn SessionService>, admin: AdminConfig) -> Result<Self> {
        let auth_methods = AuthMethodRegistry::from_config(&admin.auth);
        let auth_policy = AuthPolicy::new(admin.auth.policy.clone());
        auth_policy.validate(&auth_methods)?;
        Ok(Self {
            dispatcher: Dispatcher::new(site.clone()),
            post_service: Arc::new(DefaultPostService::new(site.clone())),
            site,
            session_service,
            auth_methods: Arc::new(auth_methods),
            auth_policy: Arc::new(auth_policy),
            admin: Arc::new(admin),
        })
    }
}
