use crate::response::Rendered;
use crate::security::Viewer;
use crate::{AppState, WebError};
use axum::extract::{Query, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use whisper_service::DispatchRequest;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// 解析页码参数，非数字时为第1页，超出范围的数字交给分发器截断
pub fn parse_page(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim) else {
        return 1;
    };
    match raw.parse::<i64>() {
        Ok(page) => page,
        Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => i64::MAX,
        Err(_) if raw.len() > 1 && raw.starts_with('-') && raw[1..].bytes().all(|b| b.is_ascii_digit()) => {
            i64::MIN
        }
        Err(_) => 1,
    }
}

/// 将公开路径解析为分发请求
///
/// - `/` 首页列表
/// - `/tag/<tag>/` 标签列表
/// - `/<slug>/` 和 `/<slug>/<subpath>` 文章
pub fn parse_path(path: &str, page: i64) -> DispatchRequest {
    let unknown = || DispatchRequest::Unknown {
        path: path.to_string(),
    };
    let Ok(decoded) = percent_decode_str(path).decode_utf8() else {
        return unknown();
    };
    let Some(rest) = decoded.strip_prefix('/') else {
        return unknown();
    };
    if rest.is_empty() {
        return DispatchRequest::Listing { page, tag: None };
    }
    if let Some(tag) = rest.strip_prefix("tag/").and_then(|t| t.strip_suffix('/')) {
        if !tag.is_empty() && !tag.contains('/') {
            return DispatchRequest::Listing {
                page,
                tag: Some(tag.to_string()),
            };
        }
    }
    match rest.split_once('/') {
        Some((slug, subpath)) if !slug.is_empty() => DispatchRequest::Post {
            slug: slug.to_string(),
            subpath: subpath.to_string(),
        },
        _ => unknown(),
    }
}

/// 公开页面入口（兜底路由）
pub async fn site_page(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Response {
    let path = uri.path();
    let request = parse_path(path, parse_page(query.page.as_deref()));
    match state.dispatcher.dispatch(request, path, viewer.is_admin).await {
        Ok(response) => Rendered(response).into_response(),
        Err(e) => WebError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, subpath: &str) -> DispatchRequest {
        DispatchRequest::Post {
            slug: slug.to_string(),
            subpath: subpath.to_string(),
        }
    }

    #[test]
    fn test_parse_path() {
        assert_eq!(parse_path("/", 2), DispatchRequest::Listing { page: 2, tag: None });
        assert_eq!(
            parse_path("/tag/rust/", 1),
            DispatchRequest::Listing {
                page: 1,
                tag: Some("rust".to_string())
            }
        );
        assert_eq!(parse_path("/hello/", 1), post("hello", ""));
        assert_eq!(parse_path("/hello/img/a.png", 1), post("hello", "img/a.png"));
        // 不符合标签路由时按文章处理
        assert_eq!(parse_path("/tag/", 1), post("tag", ""));
        assert_eq!(parse_path("/tag/a/b", 1), post("tag", "a/b"));
        assert!(matches!(parse_path("/hello", 1), DispatchRequest::Unknown { .. }));
    }

    #[test]
    fn test_parse_path_decodes() {
        assert_eq!(
            parse_path("/tag/%E4%B8%AD%E6%96%87/", 1),
            DispatchRequest::Listing {
                page: 1,
                tag: Some("中文".to_string())
            }
        );
        assert_eq!(parse_path("/post/a%20b.txt", 1), post("post", "a b.txt"));
        assert!(matches!(parse_path("/%FF/", 1), DispatchRequest::Unknown { .. }));
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some("-4")), -4);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("99999999999999999999999")), i64::MAX);
        assert_eq!(parse_page(Some("-99999999999999999999999")), i64::MIN);
    }
}
