use crate::security::{clear_session_cookie, session_cookie, Viewer};
use crate::{AppState, WebError};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};
use tracing::{info, warn};
use whisper_api::{AuthRequest, EventPayload};
use whisper_plugin::builtin::admin::events;

const LOGIN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Log in</title>
  <script>
    function try_auth(name) {
      document.getElementById('auth').submit()
    }
  </script>
</head>
<body>
  <form id="auth" method="post" action="/admin/auth/">
    {% for method in methods %}
    <div class="method" data-name="{{ method.name }}">{{ method.html | safe }}</div>
    {% endfor %}
    <label><input type="checkbox" name="trust" value="on"> Trust this device</label>
    <button type="submit">Log in</button>
  </form>
  <p>Any of:</p>
  <ul>
    {% for group in policy %}
    <li>{{ group | join(sep=" + ") }}</li>
    {% endfor %}
  </ul>
</body>
</html>
"#;

#[derive(Serialize)]
struct RenderedMethod {
    name: String,
    html: String,
}

/// 从HTTP请求构建认证请求
pub(crate) fn auth_request(method: &Method, uri: &Uri, headers: &HeaderMap, form: HashMap<String, String>) -> AuthRequest {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    AuthRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers,
        form,
        remote_addr: None,
    }
}

/// 登录页
/// GET /admin/auth/
pub async fn auth_page(State(state): State<AppState>) -> Result<Response, WebError> {
    let mut methods = Vec::new();
    for (name, method) in state.auth_methods.iter() {
        methods.push(RenderedMethod {
            name: name.to_string(),
            html: method.render(name)?,
        });
    }
    let mut context = Context::new();
    context.insert("methods", &methods);
    context.insert("policy", state.auth_policy.groups());
    let html = Tera::one_off(LOGIN_TEMPLATE, &context, true)
        .map_err(|e| whisper_api::Error::Render(format!("login page: {}", e)))?;
    Ok(Html(html).into_response())
}

/// 执行认证
/// POST /admin/auth/
pub async fn authenticate(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, WebError> {
    let trusted = form.get("trust").is_some_and(|v| !v.is_empty());
    let request = auth_request(&method, &uri, &headers, form);
    state.site.events().emit(events::AUTH)?;

    if !state.auth_policy.authenticate(&state.auth_methods, &request)? {
        warn!("Admin log in failed");
        return Ok(Redirect::to("/admin/auth/").into_response());
    }

    let session = state.session_service.create(trusted).await?;
    info!("Admin logged in (trusted: {})", trusted);
    let max_age = trusted.then(|| state.admin.trusted_session_ttl());
    Ok((
        [(header::SET_COOKIE, session_cookie(&session.id, max_age))],
        Redirect::to("/admin/"),
    )
        .into_response())
}

/// 提交前预检单个认证方法
/// POST /admin/auth/check/:name/
pub async fn auth_check(
    State(state): State<AppState>,
    Path(name): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<StatusCode, WebError> {
    state
        .site
        .events()
        .invoke(events::CHECK, EventPayload::new().with("name", name.as_str()))?;
    let Some(auth) = state.auth_methods.get(&name) else {
        return Ok(StatusCode::BAD_REQUEST);
    };
    let request = auth_request(&method, &uri, &headers, HashMap::new());
    if auth.check(&request)? {
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::FORBIDDEN)
    }
}

/// 退出登录
/// POST /admin/deauth/
pub async fn deauth(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<Response, WebError> {
    state.site.events().emit(events::DEAUTH)?;
    if let Some(session) = &viewer.session {
        state.session_service.delete(&session.id).await?;
    }
    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/admin/auth/"),
    )
        .into_response())
}
