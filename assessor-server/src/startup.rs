//! Server startup and shutdown logic

use anyhow::{Context, Result};
use assessor_config::AssessorConfig;
use assessor_resilience::RetryPolicy;
use assessor_storage::{ConnectionLifecycle, MongoConnector, StorageHandle, StoreConnector};
use axum::Router;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::{
    app::{create_app, AppConfig},
    context::AppContext,
};

/// Server application struct
pub struct Server {
    config: AssessorConfig,
    storage: StorageHandle,
}

impl Server {
    pub fn new(config: AssessorConfig) -> Self {
        Self {
            config,
            storage: StorageHandle::new(),
        }
    }

    /// Handle on the storage link this server publishes to handlers
    pub fn storage(&self) -> StorageHandle {
        self.storage.clone()
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Router {
        let context = AppContext::new(self.storage.clone())
            .with_payload_size(self.config.database.payload_size);
        create_app(context, AppConfig::from(&self.config.server))
    }

    /// Bind the configured address, connect to MongoDB in the background and
    /// serve until SIGINT/SIGTERM
    pub async fn start(self) -> Result<()> {
        let addr = self.config.server.listen_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        let connector = Arc::new(MongoConnector::new(self.config.database.clone()));
        self.run(listener, connector, shutdown_signal()).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    ///
    /// The connection routine is spawned after the listener is accepting, so
    /// probes answer while storage is still coming up.
    pub async fn run<F>(
        self,
        listener: TcpListener,
        connector: Arc<dyn StoreConnector>,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        tracing::info!("Assessor server listening on {}", local_addr);
        self.log_config_summary();

        let app = self.build_app();
        let drain_timeout = self.config.server.shutdown_timeout;

        let policy = RetryPolicy::fixed(
            self.config.database.max_connect_attempts,
            self.config.database.connect_retry_delay(),
        );
        let connect_task =
            ConnectionLifecycle::new(self.storage.clone(), connector, policy).spawn()?;

        let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
        let graceful = async move {
            shutdown.await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = signalled_tx.send(());
        };

        let mut serve_task = tokio::spawn(
            axum::serve(listener, app)
                .with_graceful_shutdown(graceful)
                .into_future(),
        );

        tokio::select! {
            result = &mut serve_task => result??,
            _ = signalled_rx => match tokio::time::timeout(drain_timeout, &mut serve_task).await {
                Ok(result) => result??,
                Err(_) => {
                    tracing::warn!(
                        "In-flight requests still running after {:?}, aborting",
                        drain_timeout
                    );
                    serve_task.abort();
                }
            },
        }

        connect_task.abort();
        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Log configuration summary
    fn log_config_summary(&self) {
        let enabled = |flag: bool| if flag { "Enabled" } else { "Disabled" };

        tracing::info!("=== Assessor Server Configuration ===");
        tracing::info!("Bind Address: {}", self.config.server.listen_address());
        tracing::info!(
            "Database: {} (db {}, collection {})",
            assessor_storage::mongo::redact_uri(&self.config.database.uri),
            self.config.database.resolved_database_name(),
            self.config.database.collection
        );
        tracing::info!(
            "Connect retries: {} x {}ms",
            self.config.database.max_connect_attempts,
            self.config.database.connect_retry_delay_ms
        );
        tracing::info!("Payload size: {}", self.config.database.payload_size);
        tracing::info!("Request ID: {}", enabled(self.config.server.enable_request_id));
        tracing::info!("Tracing: {}", enabled(self.config.server.enable_tracing));
        tracing::info!("=====================================");
    }
}

/// Graceful shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessor_storage::testing::{InMemoryRecordStore, ScriptedConnector};
    use assessor_storage::ConnectionState;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_connects_and_shuts_down() {
        let mut config = AssessorConfig::default();
        config.database.connect_retry_delay_ms = 10;

        let server = Server::new(config);
        let storage = server.storage();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let connector = Arc::new(ScriptedConnector::new(Arc::new(InMemoryRecordStore::new()), 2));

        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.run(listener, connector.clone(), async move {
            let _ = stop_rx.await;
        }));

        for _ in 0..200 {
            if storage.is_connected() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(storage.state(), ConnectionState::Connected);
        assert_eq!(connector.attempts(), 3);

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
