// PropwealthNext - Web Server
// Serves the dashboard page and JSON API with Axum

use anyhow::{Context, Result};
use propwealth_dashboard::web::{router, AppState};
use propwealth_dashboard::{Dashboard, DashboardConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🌐 PropwealthNext - Investment Dashboard Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Optional config file as the first argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DashboardConfig::load(config_path.as_deref())?;

    if !config.data_path.exists() {
        // Not fatal here: each render pass reports the failure to the user
        eprintln!("⚠️  Data file not found at {:?}", config.data_path);
    }
    info!(
        data = %config.data_path.display(),
        sheet = %config.sheet_name,
        users = config.users.len(),
        "configuration loaded"
    );

    let bind = config.bind_addr.clone();
    let state = AppState::new(Dashboard::new(config));

    // Load the dataset before the first request so no handler pays for it
    let dashboard = Arc::clone(&state.dashboard);
    match tokio::task::spawn_blocking(move || dashboard.dataset()).await? {
        Ok(dataset) => println!("📂 Loaded {} suburb rows", dataset.len()),
        Err(e) => warn!("dataset not preloaded: {}", e),
    }

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;

    println!("\n🚀 Server running on http://{}", bind);
    println!("   API: http://{}/api/suburbs", bind);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
