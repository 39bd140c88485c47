use spotsense::{api, config, registry, service::IntelligenceService};
use std::net::SocketAddr;
use std::sync::Arc;

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt().with_target(false).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        "spotsense starting"
    );
    let config = config::load_default()?;

    let registry_path = config.registry_path();
    let registry = match registry::load_from_path(registry_path) {
        Ok(registry) => {
            tracing::info!(
                path = %registry_path.display(),
                cameras = registry.cameras.len(),
                alternatives = registry.alternatives.len(),
                "Registry loaded"
            );
            registry
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load registry, using built-in defaults");
            registry::Registry::builtin()
        }
    };

    let service = Arc::new(IntelligenceService::new(
        Arc::new(registry),
        config.engine_settings(),
    ));

    let app = api::router(Arc::clone(&service));
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
