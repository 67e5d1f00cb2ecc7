use crate::handlers;
use crate::security::{admin_guard, session_middleware};
use crate::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// 显式路由只有管理后台，其余路径都交给分发器。
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/auth/", get(handlers::auth_page).post(handlers::authenticate))
        .route("/admin/auth/check/:name/", post(handlers::auth_check))
        .merge(admin_routes(state.clone()))
        .fallback(handlers::site_page)
        // 中间件的执行顺序与添加顺序相反：trace -> session -> handler
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 需要管理员会话的路由
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/", get(handlers::admin_home))
        .route("/admin/deauth/", post(handlers::deauth))
        .route("/admin/post/", post(handlers::create_post))
        .route("/admin/post/:slug/", get(handlers::get_post).post(handlers::edit_post))
        .route("/admin/post/:slug/files", post(handlers::post_files))
        .route("/admin/post/:slug/delete", post(handlers::delete_post))
        .route_layer(from_fn_with_state(state, admin_guard))
}
