mod app;
mod config;
mod routes;
mod services;
mod state;

use meridian_shared::LayerConfig;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let manifest_path = config::layers_manifest_path();
    let configs = match load_manifest(&manifest_path) {
        Ok(configs) => configs,
        Err(e) => {
            tracing::error!(error = %e, path = %manifest_path, "failed to load layer manifest");
            return;
        }
    };
    tracing::info!(layers = configs.len(), "Layer manifest loaded from {manifest_path}");

    let state = AppState::new(configs);

    // Spawn background services
    tokio::spawn(services::layer_loader::run(state.clone()));

    let app = app::build_app(state);

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("Meridian server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

fn load_manifest(path: &str) -> Result<Vec<LayerConfig>, String> {
    let raw = std::fs::read(path).map_err(|e| format!("read manifest: {e}"))?;
    let configs: Vec<LayerConfig> =
        serde_json::from_slice(&raw).map_err(|e| format!("decode manifest: {e}"))?;
    if configs.is_empty() {
        return Err("manifest lists no layers".to_string());
    }
    Ok(configs)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::load_manifest;

    #[test]
    fn load_manifest_reads_the_repo_default() {
        let configs = load_manifest("../config/layers.json").expect("repo manifest");
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].id, "counties");
        assert_eq!(configs[1].id, "unemployment");
    }

    #[test]
    fn load_manifest_reports_missing_files() {
        let error = load_manifest("no/such/manifest.json").expect_err("missing file");
        assert!(error.starts_with("read manifest:"));
    }

    #[test]
    fn load_manifest_rejects_empty_manifests() {
        let dir = std::env::temp_dir().join("meridian-manifest-test");
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("empty.json");
        std::fs::write(&path, "[]").expect("write manifest");

        let error = load_manifest(path.to_str().expect("utf-8 path")).expect_err("empty manifest");
        assert_eq!(error, "manifest lists no layers");
    }
}
