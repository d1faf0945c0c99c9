//! Idea Relay - Rust Backend
//!
//! 使用 axum 框架构建的中继服务：把用户的想法转发给 LLM 补全服务，返回生成的前端代码、
//! 部署校验结果或部署后总结。未配置密钥时以 mock 模式运行。

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod llm;
mod models;
mod services;
mod state;
mod utils;

use api::create_api_routes;
use config::{AppConfig, RelayMode};
use state::create_shared_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在时忽略
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "idea_relay=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Idea Relay backend...");

    let config = AppConfig::load().context("failed to load configuration")?;
    let addr = config.bind_addr();

    let state = create_shared_state(config).context("failed to initialize application state")?;

    match state.mode() {
        RelayMode::Mock => warn!("Running in MOCK MODE - no API key configured, serving fixture data"),
        RelayMode::Production => info!("Running in PRODUCTION MODE"),
    }

    let app = create_api_routes(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on: http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
