//! Binary entrypoint for the catalog server.
//!
//! Configuration comes from environment variables; see
//! [`catalog_server::config`] for the full list.

use catalog_server::config::ServerConfig;
use catalog_server::router::{build_broadcast_router, build_router};
use catalog_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{}", err);
            std::process::exit(2);
        }
    };

    let state = AppState::new(&config);

    if let Some(addr) = config.broadcast_addr() {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .expect("failed to bind broadcast listener");
        tracing::info!("broadcast channel listening on ws://{}", addr);
        let app = build_broadcast_router(state.clone());
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!("broadcast listener stopped: {}", err);
            }
        });
    }

    let app = build_router(state, config.static_dir.as_deref());

    let addr = config.http_addr();
    tracing::info!(
        "catalog server starting on {} (data file {})",
        addr,
        config.data_path.display()
    );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
