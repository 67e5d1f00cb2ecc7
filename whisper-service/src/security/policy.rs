use crate::security::methods::{CookieAuth, DummyAuth, PasswordAuth, UnimplementedAuth};
use crate::security::password_service::PasswordAlgorithm;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use whisper_api::{AuthMethod, AuthRequest, Error, Result};

/// 单个认证方法的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthMethodConfig {
    Password {
        hash: String,
        #[serde(default = "default_display")]
        display: String,
        #[serde(default)]
        algorithm: PasswordAlgorithm,
    },
    Cookie {
        key: String,
        value: String,
    },
    Dummy,
    Totp,
    Webauthn,
    Ip,
}

fn default_display() -> String {
    "Password".to_string()
}

impl AuthMethodConfig {
    pub fn build(&self) -> Arc<dyn AuthMethod> {
        match self {
            AuthMethodConfig::Password {
                hash,
                display,
                algorithm,
            } => Arc::new(PasswordAuth::new(hash.clone(), display.clone(), *algorithm)),
            AuthMethodConfig::Cookie { key, value } => Arc::new(CookieAuth::new(key.clone(), value.clone())),
            AuthMethodConfig::Dummy => Arc::new(DummyAuth),
            AuthMethodConfig::Totp => Arc::new(UnimplementedAuth::totp()),
            AuthMethodConfig::Webauthn => Arc::new(UnimplementedAuth::webauthn()),
            AuthMethodConfig::Ip => Arc::new(UnimplementedAuth::ip()),
        }
    }
}

/// 认证配置：方法表和策略
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub methods: IndexMap<String, AuthMethodConfig>,
    #[serde(default)]
    pub policy: Vec<Vec<String>>,
}

/// 按名称索引的认证方法，保持配置顺序（登录页按此顺序渲染）
#[derive(Clone, Default)]
pub struct AuthMethodRegistry {
    methods: IndexMap<String, Arc<dyn AuthMethod>>,
}

impl AuthMethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let mut registry = Self::new();
        for (name, method) in &config.methods {
            registry.register(name.clone(), method.build());
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, method: Arc<dyn AuthMethod>) {
        self.methods.insert(name.into(), method);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn AuthMethod>> {
        self.methods.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn AuthMethod>)> {
        self.methods.iter().map(|(name, method)| (name.as_str(), method))
    }

    fn require(&self, name: &str) -> Result<&Arc<dyn AuthMethod>> {
        self.methods
            .get(name)
            .ok_or_else(|| Error::UnknownAuthMethod(name.to_string()))
    }
}

/// 认证策略：AND组的OR
///
/// 按顺序求值，第一个所有方法都通过的组即为成功，其余组不再求值。
/// 组内从左到右求值，遇到失败即停止，因此`check`只能读取当前请求，不能有其他副作用。
/// 空策略总是失败，空组视为配置错误。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthPolicy {
    groups: Vec<Vec<String>>,
}

impl AuthPolicy {
    pub fn new(groups: Vec<Vec<String>>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    /// 检查策略引用的方法都已注册，且没有空组
    pub fn validate(&self, registry: &AuthMethodRegistry) -> Result<()> {
        if let Some(index) = self.groups.iter().position(Vec::is_empty) {
            return Err(Error::Config(format!("auth policy group #{} is empty", index)));
        }
        for name in self.groups.iter().flatten() {
            registry.require(name)?;
        }
        Ok(())
    }

    /// 对请求求值，未注册的方法名在求值前即报错
    pub fn authenticate(&self, registry: &AuthMethodRegistry, request: &AuthRequest) -> Result<bool> {
        self.validate(registry)?;
        for (index, group) in self.groups.iter().enumerate() {
            if self.group_satisfied(registry, group, request)? {
                debug!("Auth policy group #{} satisfied", index);
                return Ok(true);
            }
        }
        warn!("Auth policy not satisfied for {}", request.path);
        Ok(false)
    }

    fn group_satisfied(
        &self,
        registry: &AuthMethodRegistry,
        group: &[String],
        request: &AuthRequest,
    ) -> Result<bool> {
        for name in group {
            if !registry.require(name)?.check(request)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        result: bool,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(result: bool) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl AuthMethod for Fixed {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn render(&self, name: &str) -> Result<String> {
            Ok(name.to_string())
        }

        fn check(&self, _request: &AuthRequest) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result)
        }
    }

    fn policy(groups: &[&[&str]]) -> AuthPolicy {
        AuthPolicy::new(
            groups
                .iter()
                .map(|g| g.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn registry(pw: bool, cookie: bool, otp: bool) -> AuthMethodRegistry {
        let mut registry = AuthMethodRegistry::new();
        registry.register("pw", Fixed::new(pw));
        registry.register("cookie", Fixed::new(cookie));
        registry.register("otp", Fixed::new(otp));
        registry
    }

    #[test]
    fn test_and_group_requires_every_method() {
        let policy = policy(&[&["pw"], &["cookie", "otp"]]);
        let request = AuthRequest::default();

        assert!(!policy.authenticate(&registry(false, true, false), &request).unwrap());
        assert!(policy.authenticate(&registry(false, true, true), &request).unwrap());
        assert!(policy.authenticate(&registry(true, false, false), &request).unwrap());
    }

    #[test]
    fn test_first_satisfied_group_wins() {
        let later = Fixed::new(true);
        let mut registry = AuthMethodRegistry::new();
        registry.register("pw", Fixed::new(true));
        registry.register("cookie", later.clone());

        let policy = policy(&[&["pw"], &["cookie"]]);
        assert!(policy.authenticate(&registry, &AuthRequest::default()).unwrap());
        assert_eq!(later.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_policy_fails() {
        let request = AuthRequest::default();
        assert!(!AuthPolicy::default()
            .authenticate(&registry(true, true, true), &request)
            .unwrap());
    }

    #[test]
    fn test_empty_group_is_config_error() {
        let registry = registry(true, true, true);
        let empty = policy(&[&["pw"], &[]]);
        assert!(matches!(empty.validate(&registry), Err(Error::Config(_))));
        assert!(matches!(
            empty.authenticate(&registry, &AuthRequest::default()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_unknown_method_is_eager_error() {
        // 第一组已满足，但第二组引用了未注册的方法
        let policy = policy(&[&["pw"], &["ghost"]]);
        match policy.authenticate(&registry(true, true, true), &AuthRequest::default()) {
            Err(Error::UnknownAuthMethod(name)) => assert_eq!(name, "ghost"),
            other => panic!("unexpected result: {:?}", other.map_err(|e| e.to_string())),
        }
    }

    #[test]
    fn test_unimplemented_method_propagates() {
        let config = AuthConfig {
            methods: IndexMap::from([("otp".to_string(), AuthMethodConfig::Totp)]),
            policy: vec![vec!["otp".to_string()]],
        };
        let registry = AuthMethodRegistry::from_config(&config);
        let policy = AuthPolicy::new(config.policy.clone());
        assert!(matches!(
            policy.authenticate(&registry, &AuthRequest::default()),
            Err(Error::MethodNotImplemented(_))
        ));
    }

    #[test]
    fn test_method_config_deserialize() {
        let config: AuthConfig = serde_json::from_value(serde_json::json!({
            "methods": {
                "pw": {"type": "password", "hash": "abc"},
                "trusted": {"type": "cookie", "key": "k", "value": "v"},
                "any": {"type": "dummy"}
            },
            "policy": [["pw"], ["trusted", "any"]]
        }))
        .unwrap();

        assert_eq!(
            config.methods["pw"],
            AuthMethodConfig::Password {
                hash: "abc".to_string(),
                display: "Password".to_string(),
                algorithm: PasswordAlgorithm::Sha256,
            }
        );
        let names: Vec<&str> = config.methods.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["pw", "trusted", "any"]);
        assert_eq!(config.policy.len(), 2);
    }
}
