//! 部署校验与部署后总结端点

use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

use super::extract::JsonBody;
use crate::error::AppResult;
use crate::models::{CodeRequest, SummaryResponse, ValidationResponse};
use crate::state::AppState;

/// 校验代码能否部署
async fn validate_deployment(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CodeRequest>,
) -> AppResult<Json<ValidationResponse>> {
    let validation = state.relay.validate_deployment(&req.code).await?;
    Ok(Json(ValidationResponse {
        success: true,
        validation,
    }))
}

/// 生成部署后总结
async fn post_deploy_summary(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CodeRequest>,
) -> AppResult<Json<SummaryResponse>> {
    let summary = state.relay.post_deploy_summary(&req.code).await?;
    Ok(Json(SummaryResponse {
        success: true,
        summary,
    }))
}

/// 创建部署相关路由
pub fn deployment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/validate-deployment", post(validate_deployment))
        .route("/api/post-deploy-summary", post(post_deploy_summary))
}
