pub mod middleware;

pub use middleware::{admin_guard, session_middleware, Viewer};

use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};
use std::time::Duration;

/// 携带会话id的cookie名称
pub const SESSION_COOKIE: &str = "whisper_session";

/// 从Cookie头中读取会话id
pub fn session_id(cookie_header: &str) -> Option<String> {
    Cookie::split_parse(cookie_header)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|id| !id.is_empty())
}

/// 登录成功后下发的会话cookie，`max_age`为`None`时为浏览器会话cookie
pub fn session_cookie(id: &str, max_age: Option<Duration>) -> String {
    let mut builder = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    if let Some(max_age) = max_age {
        let seconds = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        builder = builder.max_age(CookieDuration::seconds(seconds));
    }
    builder.build().to_string()
}

/// 清除会话cookie
pub fn clear_session_cookie() -> String {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::ZERO)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_header() {
        assert_eq!(
            session_id("theme=dark; whisper_session=abc-123"),
            Some("abc-123".to_string())
        );
        assert_eq!(session_id("theme=dark"), None);
        assert_eq!(session_id("whisper_session="), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc", None);
        assert!(cookie.starts_with("whisper_session=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Max-Age"));

        let trusted = session_cookie("abc", Some(Duration::from_secs(60)));
        assert!(trusted.contains("Max-Age=60"));

        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
