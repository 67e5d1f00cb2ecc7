use crate::security::session_id;
use crate::{AppState, WebError};
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, warn};
use whisper_api::{names, EventPayload};
use whisper_infra::AdminSession;
use whisper_plugin::builtin::admin::events;

/// 当前访问者
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub session: Option<AdminSession>,
    /// 是否可以查看私有文章和访问管理后台
    pub is_admin: bool,
}

/// 会话中间件
/// 从cookie加载会话，经`session_is_admin`事件判定身份后注入请求扩展
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let id = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(session_id);

    let session = match id {
        Some(id) => match state.session_service.get(&id).await {
            Ok(session) => session,
            Err(e) => return WebError::from(e).into_response(),
        },
        None => None,
    };

    let session_value = match &session {
        Some(session) => serde_json::to_value(session).unwrap_or_default(),
        None => serde_json::Value::Null,
    };
    let payload = match state
        .site
        .events()
        .invoke(names::SESSION_IS_ADMIN, EventPayload::new().with("session", session_value))
    {
        Ok(payload) => payload,
        Err(e) => return WebError::from(e).into_response(),
    };
    let is_admin = payload
        .get_bool("is_admin")
        .unwrap_or_else(|| session.as_ref().is_some_and(|s| s.admin));

    request.extensions_mut().insert(Viewer { session, is_admin });
    next.run(request).await
}

/// 管理后台守卫
/// 未登录时触发`admin:unauthorized`并重定向到登录页
pub async fn admin_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let is_admin = request
        .extensions()
        .get::<Viewer>()
        .is_some_and(|viewer| viewer.is_admin);
    if is_admin {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    warn!("Unauthorized access to {}", path);
    if let Err(e) = state
        .site
        .events()
        .invoke(events::UNAUTHORIZED, EventPayload::new().with("path", path))
    {
        return WebError::from(e).into_response();
    }
    debug!("Redirecting to login page");
    Redirect::to("/admin/auth/").into_response()
}
