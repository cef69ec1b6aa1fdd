use cabforge::prelude::*;
use cabforge::{DEFAULT_BIND_ADDR, DEFAULT_PATH};

#[tokio::main]
async fn main() -> Result<(), CabforgeError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let bind = std::env::var("CABFORGE_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned());
    let path = std::env::var("CABFORGE_PATH").unwrap_or_else(|_| DEFAULT_PATH.to_owned());

    let server = CabforgeServer::builder()
        .bind(&bind)
        .path(&path)
        .build()
        .await?;

    match server.local_addr() {
        Ok(addr) => tracing::info!(%addr, %path, "listening"),
        Err(e) => tracing::warn!(error = %e, "could not read local address"),
    }

    server
        .run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("interrupt received, shutting down"),
                Err(e) => {
                    tracing::warn!(error = %e, "could not listen for interrupt");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
}
