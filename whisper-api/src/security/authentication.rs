use crate::error::Result;
use std::collections::HashMap;

/// 认证请求信息
/// 包含从HTTP请求中提取的、认证方法需要读取的字段
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub form: HashMap<String, String>,
    pub remote_addr: Option<String>,
}

impl AuthRequest {
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }

    pub fn get_cookie(&self, name: &str) -> Option<String> {
        // Cookie头格式：Cookie: name1=value1; name2=value2
        self.headers.get("cookie").and_then(|cookie_header| {
            cookie_header.split(';').find_map(|pair| {
                let (key, value) = pair.split_once('=')?;
                if key.trim() == name {
                    Some(value.trim().to_string())
                } else {
                    None
                }
            })
        })
    }

    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }
}

/// 认证方法
///
/// 每次请求无状态。`check`只能读取当前请求自身的字段，不能有其他副作用：
/// 策略求值会短路，某些方法可能不会被调用。
/// 尚未实现的方法必须返回`MethodNotImplemented`，不能静默失败。
pub trait AuthMethod: Send + Sync {
    /// 方法类型名，用于日志
    fn kind(&self) -> &'static str;

    /// 登录页面上该方法的HTML片段
    fn render(&self, name: &str) -> Result<String>;

    /// 当前请求是否满足该方法
    fn check(&self, request: &AuthRequest) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_cookie(cookie: &str) -> AuthRequest {
        let mut request = AuthRequest::default();
        request.headers.insert("cookie".to_string(), cookie.to_string());
        request
    }

    #[test]
    fn test_get_cookie() {
        let request = request_with_cookie("a=1; trusted=abc==; b=2");
        assert_eq!(request.get_cookie("a"), Some("1".to_string()));
        // 值中的`=`保持原样
        assert_eq!(request.get_cookie("trusted"), Some("abc==".to_string()));
        assert_eq!(request.get_cookie("missing"), None);
    }

    #[test]
    fn test_form_value() {
        let mut request = AuthRequest::default();
        request.form.insert("password_x".to_string(), "secret".to_string());
        assert_eq!(request.form_value("password_x"), Some("secret"));
        assert_eq!(request.form_value("other"), None);
    }
}
