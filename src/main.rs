use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use habit_coach::config::AppConfig;
use habit_coach::plan::PlanService;
use habit_coach::server::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let service = Arc::new(
        PlanService::from_config(&config).context("Failed to build upstream clients")?,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    eprintln!("🌱 Habit Coach v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", service.model_name());
    eprintln!(
        "   API token: {}",
        if config.github_models.api_token.is_some() {
            "configured"
        } else {
            "MISSING (requests will fail until GITHUB_MODELS_API_TOKEN is set)"
        }
    );
    eprintln!("   Scripture API: {}", config.external_apis.bible_api);
    eprintln!("   Quote API: {}", config.external_apis.quote_api);
    eprintln!("   Listening: http://{}\n", addr);

    if config.github_models.api_token.is_none() {
        tracing::warn!("GitHub Models API token is not configured");
    }

    let app = build_router(service, &config.server.web_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Habit Coach server started");
    axum::serve(listener, app).await?;

    Ok(())
}
