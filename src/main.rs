// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Extension;
use std::sync::Arc;
use threadsift::config::settings::Settings;
use threadsift::domain::services::crawl_service::CrawlService;
use threadsift::engines::reqwest_engine::ReqwestFetcher;
use threadsift::engines::traits::PageFetcher;
use threadsift::infrastructure::directory_cache::DirectoryCache;
use threadsift::infrastructure::metrics::init_metrics;
use threadsift::presentation::handlers::query_handler::SharedCrawlService;
use threadsift::presentation::routes;
use threadsift::utils::telemetry;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting threadsift...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    init_metrics(&settings.metrics);

    // 3. Shared fetcher and directory cache
    let fetcher: Arc<dyn PageFetcher> = Arc::new(ReqwestFetcher::new(&settings.crawl)?);
    let directories = Arc::new(DirectoryCache::from_settings(&settings.forum));
    info!(
        engine = fetcher.name(),
        years = ?directories.years(),
        "Crawl service initialized"
    );
    let service: SharedCrawlService = Arc::new(CrawlService::new(
        fetcher,
        directories,
        settings.crawl.clone(),
    ));

    // 4. Start HTTP server
    let shutdown = CancellationToken::new();
    let app = routes::routes()
        .layer(Extension(service))
        .layer(Extension(shutdown.clone()));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

/// 等待 Ctrl-C，然后取消所有进行中的查询
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, cancelling in-flight queries");
    shutdown.cancel();
}
