//! 健康检查端点

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::models::HealthResponse;
use crate::state::AppState;

/// 健康检查处理器
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        mode: state.mode().as_str(),
    })
}

/// 创建健康检查路由
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}
