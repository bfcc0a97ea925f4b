use anyhow::Context;
use clap::Parser;
use projd_http::config::ServerConfig;
use projd_http::{AppState, logging, router};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = ServerConfig::parse();

    // Logging before any other side effects
    logging::init_logging(&cfg.log_level, cfg.log_format)?;

    let state = AppState::from_config(&cfg)
        .with_context(|| format!("opening project root {}", cfg.project_root.display()))?;
    info!(
        root = %state.root().path().display(),
        prefix = state.public_prefix(),
        static_dir = %cfg.static_dir.display(),
        "serving projects"
    );

    let app = router(state, &cfg.static_dir);
    let listener = tokio::net::TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("binding {}", cfg.bind))?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
