//! `Server` builder and run loop: the process composition root.
//!
//! The registry is an explicit, constructed instance owned here and
//! injected into the router: nothing in the codebase reaches for an
//! ambient singleton, which is what keeps the whole stack constructible
//! inside a test.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use parlor_session::SessionRegistry;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::ServerError;
use crate::routes;

/// Shared state handed to every handler.
///
/// The single mutex around the registry is the linearization point for
/// session creation and lookup. It guards only the code → handle map;
/// per-session work happens behind each session's own mailbox, with the
/// lock already released.
pub struct AppState {
    pub registry: Mutex<SessionRegistry>,
}

impl AppState {
    /// Creates fresh state with an empty registry.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(SessionRegistry::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for configuring and starting a Parlor server.
pub struct ServerBuilder {
    bind_addr: String,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and assembles the router.
    pub async fn build(self) -> Result<Server, ServerError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let state = Arc::new(AppState::new());
        let app = routes::router(state);
        Ok(Server { listener, app })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, ready-to-run Parlor server.
pub struct Server {
    listener: TcpListener,
    app: Router,
}

impl Server {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to. Useful when
    /// binding to port 0 in tests.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until ctrl-c.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("parlor server running");
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Sessions are in-memory only, so there is nothing to flush; a clean
    // stop just lets in-flight responses finish.
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
