//! API 路由模块

mod deployment;
mod extract;
mod generate;
mod health;

pub use deployment::deployment_routes;
pub use generate::generate_routes;
pub use health::health_routes;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

/// `/api/*` 的 CORS 配置：仅允许白名单来源、GET/POST/OPTIONS 以及 Content-Type 头
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// 预检请求返回 204
///
/// CorsLayer 对 OPTIONS 直接返回 200 空响应，这里统一改为 204。
async fn preflight_no_content(req: Request, next: Next) -> Response {
    let is_options = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// 创建所有 API 路由
pub fn create_api_routes(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(generate_routes())
        .merge(deployment_routes())
        .layer(cors_layer(&state.config.allowed_origins));

    Router::new()
        .merge(health_routes())
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(preflight_no_content)),
        )
        .with_state(state)
}
