//! A json-server compatible fake backend.
//!
//! Serves products, brands and categories from an in-memory [`Store`] with
//! the same query conventions the storefront client speaks. Used for local
//! development (`shopfront mock-server`) and as the peer in integration tests.
mod routes;
mod store;

pub use routes::AppState;
pub use store::{Listing, Record, Store};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use log::info;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::error::{Result, ShopError};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route(
            "/products",
            get(routes::list_products).post(routes::create_product),
        )
        .route(
            "/products/{id}",
            get(routes::get_product).patch(routes::patch_product),
        )
        .route("/brands", get(routes::list_brands))
        .route("/categories", get(routes::list_categories))
        .with_state(state)
}

pub struct MockServer {
    listener: TcpListener,
    state: AppState,
}

impl MockServer {
    /// Bind to `addr`. Port 0 picks a free port; see [`MockServer::local_addr`].
    pub async fn bind(addr: &str, store: Store) -> Result<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| ShopError::Error(format!("Invalid address '{}': {}", addr, e)))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ShopError::Error(format!("Failed to bind to {}: {}", addr, e)))?;

        Ok(MockServer {
            listener,
            state: AppState::new(store),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn store(&self) -> Arc<RwLock<Store>> {
        self.state.store.clone()
    }

    /// Serve until SIGINT or SIGTERM.
    pub async fn serve(self) -> Result<()> {
        let addr = self.local_addr()?;
        let app = create_router(self.state);

        info!("Mock backend listening on http://{}", addr);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ShopError::Error(format!("Server error: {}", e)))?;

        info!("Mock backend stopped");
        Ok(())
    }

    /// Serve on a background task. The server stops when the handle is dropped.
    pub fn spawn(self) -> Result<MockHandle> {
        let addr = self.local_addr()?;
        let store = self.store();
        let app = create_router(self.state);
        let listener = self.listener;

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("Mock backend error: {}", e);
            }
        });

        Ok(MockHandle { addr, store, task })
    }
}

pub struct MockHandle {
    addr: SocketAddr,
    store: Arc<RwLock<Store>>,
    task: JoinHandle<()>,
}

impl MockHandle {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn store(&self) -> &Arc<RwLock<Store>> {
        &self.store
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Waits for a shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received SIGINT (Ctrl+C)");
        },
        _ = terminate => {
            log::info!("Received SIGTERM");
        },
    }
}
