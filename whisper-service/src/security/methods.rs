use crate::security::password_service::{DefaultPasswordService, PasswordAlgorithm};
use rand::Rng;
use tera::escape_html;
use whisper_api::{AuthMethod, AuthRequest, Error, Result};

/// 对比表单中的密码与配置的哈希
pub struct PasswordAuth {
    hashed: String,
    display: String,
    field: String,
    hasher: DefaultPasswordService,
}

impl PasswordAuth {
    pub fn new(hashed: impl Into<String>, display: impl Into<String>, algorithm: PasswordAlgorithm) -> Self {
        let token: [u8; 8] = rand::thread_rng().gen();
        Self {
            hashed: hashed.into(),
            display: display.into(),
            field: format!("password_{}", hex::encode(token)),
            hasher: DefaultPasswordService::new(algorithm),
        }
    }

    /// 表单字段名，每个实例随机生成
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl AuthMethod for PasswordAuth {
    fn kind(&self) -> &'static str {
        "password"
    }

    fn render(&self, _name: &str) -> Result<String> {
        Ok(format!(
            "<h2>{}</h2>\n<input form=\"auth\" name=\"{}\" type=\"password\" autocomplete=\"on\">\n<hr>\n",
            escape_html(&self.display),
            self.field
        ))
    }

    fn check(&self, request: &AuthRequest) -> Result<bool> {
        let password = request.form_value(&self.field).unwrap_or_default();
        self.hasher.verify(password, &self.hashed)
    }
}

/// 请求携带指定的cookie时通过
pub struct CookieAuth {
    key: String,
    value: String,
}

impl CookieAuth {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl AuthMethod for CookieAuth {
    fn kind(&self) -> &'static str {
        "cookie"
    }

    /// 页面加载后预检，成功则自动提交
    fn render(&self, name: &str) -> Result<String> {
        let name = escape_html(name);
        Ok(format!(
            "<script>\nwindow.addEventListener('load', async function() {{\n    let response = await fetch('/admin/auth/check/{name}/', {{ method: 'POST' }})\n    if (response.ok) try_auth('{name}')\n}})\n</script>\n"
        ))
    }

    fn check(&self, request: &AuthRequest) -> Result<bool> {
        Ok(request.get_cookie(&self.key).as_deref() == Some(self.value.as_str()))
    }
}

/// 总是通过
pub struct DummyAuth;

impl AuthMethod for DummyAuth {
    fn kind(&self) -> &'static str {
        "dummy"
    }

    fn render(&self, name: &str) -> Result<String> {
        Ok(format!(
            "<script>\nwindow.addEventListener('load', async function() {{\n    try_auth('{}')\n}})\n</script>\n",
            escape_html(name)
        ))
    }

    fn check(&self, _request: &AuthRequest) -> Result<bool> {
        Ok(true)
    }
}

/// 尚未实现的方法，任何调用都返回`MethodNotImplemented`
pub struct UnimplementedAuth {
    kind: &'static str,
}

impl UnimplementedAuth {
    pub fn totp() -> Self {
        Self { kind: "totp" }
    }

    pub fn webauthn() -> Self {
        Self { kind: "webauthn" }
    }

    pub fn ip() -> Self {
        Self { kind: "ip" }
    }
}

impl AuthMethod for UnimplementedAuth {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn render(&self, _name: &str) -> Result<String> {
        Err(Error::MethodNotImplemented(self.kind.to_string()))
    }

    fn check(&self, _request: &AuthRequest) -> Result<bool> {
        Err(Error::MethodNotImplemented(self.kind.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_field_is_random() {
        let a = PasswordAuth::new("x", "Password", PasswordAlgorithm::Sha256);
        let b = PasswordAuth::new("x", "Password", PasswordAlgorithm::Sha256);
        assert_ne!(a.field(), b.field());
        assert!(a.field().starts_with("password_"));
        assert_eq!(a.field().len(), "password_".len() + 16);
    }

    #[test]
    fn test_password_check() {
        let hashed = DefaultPasswordService::new(PasswordAlgorithm::Sha256)
            .hash("hunter2")
            .unwrap();
        let auth = PasswordAuth::new(hashed, "<Password>", PasswordAlgorithm::Sha256);

        let mut request = AuthRequest::default();
        assert!(!auth.check(&request).unwrap());
        request.form.insert(auth.field().to_string(), "hunter2".to_string());
        assert!(auth.check(&request).unwrap());

        let html = auth.render("pw").unwrap();
        assert!(html.contains("&lt;Password&gt;"));
        assert!(html.contains(auth.field()));
    }

    #[test]
    fn test_cookie_check() {
        let auth = CookieAuth::new("trusted", "s3cret");
        let mut request = AuthRequest::default();
        assert!(!auth.check(&request).unwrap());
        request
            .headers
            .insert("cookie".to_string(), "trusted=s3cret".to_string());
        assert!(auth.check(&request).unwrap());
        assert!(auth.render("cookie").unwrap().contains("/admin/auth/check/cookie/"));
    }

    #[test]
    fn test_unimplemented_methods_fail_loudly() {
        for auth in [UnimplementedAuth::totp(), UnimplementedAuth::webauthn(), UnimplementedAuth::ip()] {
            assert!(matches!(
                auth.check(&AuthRequest::default()),
                Err(Error::MethodNotImplemented(_))
            ));
            assert!(auth.render("x").is_err());
        }
    }
}
