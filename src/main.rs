// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use migration::{Migrator, MigratorTrait};
use scriptmint::config::settings::Settings;
use scriptmint::infrastructure::database::connection;
use scriptmint::infrastructure::metrics;
use scriptmint::infrastructure::services::llm_text_generator::LlmTextGenerator;
use scriptmint::presentation::routes::{self, AppServices};
use scriptmint::utils::telemetry;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting scriptmint...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    metrics::init_metrics(&settings.metrics);

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    if settings.database.run_migrations {
        info!("Running database migrations...");
        Migrator::up(db.as_ref(), None).await?;
        info!("Database migrations applied");
    }

    // 4. Text generator
    let llm = &settings.llm;
    if llm.api_key.is_none() {
        warn!("LLM API key not configured, generation requests will fail and be refunded");
    }
    let text_generator = Arc::new(LlmTextGenerator::new(
        llm.api_key.clone(),
        llm.model.clone(),
        llm.api_base_url.clone(),
        llm.timeout(),
    )?);

    // 5. Wire services and start HTTP server
    let services = AppServices::build(settings.clone(), db, text_generator);
    let app = routes::routes(services);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
