//! 代码生成端点

use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

use super::extract::JsonBody;
use crate::error::AppResult;
use crate::models::{GenerateCodeRequest, GenerateCodeResponse};
use crate::state::AppState;

/// 根据想法生成 React 组件
async fn generate_code(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<GenerateCodeRequest>,
) -> AppResult<Json<GenerateCodeResponse>> {
    let response = state.relay.generate_code(&req.idea).await?;
    Ok(Json(response))
}

/// 创建代码生成路由
pub fn generate_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/generate-code", post(generate_code))
}
