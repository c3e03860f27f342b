//! `parlor serve`: run the HTTP server until Ctrl+C or SIGTERM.

use crate::http::router::build_router;
use crate::state::AppState;

pub async fn run(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!();
    println!(
        "  {} Parlor listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!(
        "  {} {} via {}",
        console::style("◆").dim(),
        console::style(&state.config.model.model).green(),
        console::style(&state.config.model.base_url).dim()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    tracing::info!(%addr, "Server started");

    let shutdown = state.shutdown.clone();
    let db_pool = state.db_pool.clone();
    let router = build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // End in-flight streams so connections can drain.
            shutdown.cancel();
        })
        .await?;

    db_pool.close().await;
    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
