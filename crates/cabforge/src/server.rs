//! `CabforgeServer` builder and server loop.
//!
//! This is the entry point for running a Cabforge game server. It ties
//! together all the layers: transport → protocol → session/world → engine.

use std::future::Future;
use std::sync::Arc;

use cabforge_session::SessionConfig;
use cabforge_transport::{Transport, TransportError, WebSocketTransport};
use cabforge_world::WorldConfig;

use crate::CabforgeError;
use crate::engine::GameEngine;
use crate::handler::handle_connection;

/// Address the server binds to unless told otherwise.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// WebSocket path the game is served on unless told otherwise.
pub const DEFAULT_PATH: &str = "/game";

/// Builder for configuring and starting a Cabforge server.
///
/// # Example
///
/// ```rust,no_run
/// use cabforge::prelude::*;
///
/// # async fn start() -> Result<(), CabforgeError> {
/// let server = CabforgeServer::builder()
///     .bind("0.0.0.0:8080")
///     .path("/game")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct CabforgeServerBuilder {
    bind_addr: String,
    path: String,
    session_config: SessionConfig,
    world_config: WorldConfig,
}

impl CabforgeServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            path: DEFAULT_PATH.to_string(),
            session_config: SessionConfig::default(),
            world_config: WorldConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the WebSocket path clients must connect to.
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the world configuration (catalog, spawn defaults).
    pub fn world_config(mut self, config: WorldConfig) -> Self {
        self.world_config = config;
        self
    }

    /// Binds the listener and builds the engine.
    pub async fn build(self) -> Result<CabforgeServer, CabforgeError> {
        let transport = WebSocketTransport::bind(&self.bind_addr, &self.path).await?;
        let engine = Arc::new(GameEngine::new(self.session_config, self.world_config));

        Ok(CabforgeServer { transport, engine })
    }
}

impl Default for CabforgeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Cabforge game server.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// accepting connections.
pub struct CabforgeServer {
    transport: WebSocketTransport,
    engine: Arc<GameEngine>,
}

impl CabforgeServer {
    /// Creates a new builder.
    pub fn builder() -> CabforgeServerBuilder {
        CabforgeServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The engine shared by every connection task.
    pub fn engine(&self) -> &Arc<GameEngine> {
        &self.engine
    }

    /// Runs the server accept loop until the process is terminated.
    ///
    /// See [`run_until`](Self::run_until).
    pub async fn run(self) -> Result<(), CabforgeError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the server accept loop until `signal` completes.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// A failed accept (including a handshake on the wrong path) is
    /// logged and the loop continues. When `signal` fires the transport
    /// is shut down and this returns `Ok(())`; the listener closes when
    /// the server is dropped. Connections already accepted keep running
    /// until their clients leave.
    pub async fn run_until(
        mut self,
        signal: impl Future<Output = ()>,
    ) -> Result<(), CabforgeError> {
        tracing::info!(path = self.transport.path(), "Cabforge server running");
        tokio::pin!(signal);
        let mut stopping = false;

        loop {
            tokio::select! {
                () = &mut signal, if !stopping => {
                    stopping = true;
                    self.transport.shutdown().await?;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let engine = Arc::clone(&self.engine);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, engine).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(TransportError::Shutdown) => {
                        tracing::info!("Cabforge server stopped accepting");
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
            }
        }
    }
}
