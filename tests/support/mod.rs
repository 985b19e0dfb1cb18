//! Shared helpers: run a real assessor server on an ephemeral port

use assessor_config::AssessorConfig;
use assessor_server::Server;
use assessor_storage::{StorageHandle, StoreConnector};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub addr: SocketAddr,
    pub storage: StorageHandle,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    pub async fn start(
        config: AssessorConfig,
        connector: Arc<dyn StoreConnector>,
    ) -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = Server::new(config);
        let storage = server.storage();
        let (stop, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run(listener, connector, async move {
            let _ = stop_rx.await;
        }));

        Ok(Self {
            addr,
            storage,
            stop: Some(stop),
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Poll until storage is connected or `within` elapses
    pub async fn wait_until_connected(&self, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        while tokio::time::Instant::now() < deadline {
            if self.storage.is_connected() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.storage.is_connected()
    }

    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.handle.await?
    }
}

/// Default configuration with a short connect retry delay
pub fn fast_retry_config(attempts: u32, delay_ms: u64) -> AssessorConfig {
    let mut config = AssessorConfig::default();
    config.database.max_connect_attempts = attempts;
    config.database.connect_retry_delay_ms = delay_ms;
    config.server.shutdown_timeout = Duration::from_secs(5);
    config
}
