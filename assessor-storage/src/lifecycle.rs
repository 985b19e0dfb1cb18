//! Startup connection lifecycle
//!
//! The listener comes up before storage does. A single background task tries
//! to connect with a fixed retry policy and publishes the store through a
//! [`StorageHandle`]; handlers read the handle's state on every request and
//! fail fast while it is not [`ConnectionState::Connected`].

use assessor_resilience::{RetryExecutor, RetryPolicy};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{RecordStore, StorageError, StorageResult, StoreConnector};

/// Connectivity of the shared storage link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    /// Retries exhausted; terminal for the lifetime of the handle
    Failed = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Failed,
            _ => ConnectionState::Disconnected,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

struct Shared {
    state: AtomicU8,
    store: OnceLock<Arc<dyn RecordStore>>,
}

/// Cloneable view of the shared storage link, injected into every handler
#[derive(Clone)]
pub struct StorageHandle {
    inner: Arc<Shared>,
}

impl StorageHandle {
    /// A handle with no connection yet
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Shared {
                state: AtomicU8::new(ConnectionState::Disconnected as u8),
                store: OnceLock::new(),
            }),
        }
    }

    /// A handle that is already connected to `store`
    pub fn connected(store: Arc<dyn RecordStore>) -> Self {
        let handle = Self::new();
        handle.publish(store);
        handle
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// The shared store, only once connected
    pub fn store(&self) -> Option<Arc<dyn RecordStore>> {
        if self.is_connected() {
            self.inner.store.get().cloned()
        } else {
            None
        }
    }

    /// Like [`store`](Self::store) but as a `Result` for `?` in handlers
    pub fn require_store(&self) -> StorageResult<Arc<dyn RecordStore>> {
        self.store().ok_or(StorageError::NotConnected)
    }

    /// Claim the one-shot right to connect
    fn begin(&self) -> StorageResult<()> {
        self.inner
            .state
            .compare_exchange(
                ConnectionState::Disconnected as u8,
                ConnectionState::Connecting as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|_| StorageError::AlreadyStarted)
    }

    fn publish(&self, store: Arc<dyn RecordStore>) {
        // The store is set before the state flips, so a reader that sees
        // Connected always finds it.
        let _ = self.inner.store.set(store);
        self.inner.state.store(ConnectionState::Connected as u8, Ordering::Release);
    }

    fn fail(&self) {
        self.inner.state.store(ConnectionState::Failed as u8, Ordering::Release);
    }
}

impl Default for StorageHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageHandle").field("state", &self.state()).finish()
    }
}

/// Something worth reporting while connecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    AttemptFailed { attempt: u32, total: u32, reason: String },
    Connected { attempt: u32 },
    Exhausted { attempts: u32, reason: String },
}

/// Receives connection lifecycle events
pub trait ConnectionObserver: Send + Sync {
    fn on_event(&self, event: &ConnectionEvent);
}

/// Default observer: writes every event to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ConnectionObserver for TracingObserver {
    fn on_event(&self, event: &ConnectionEvent) {
        match event {
            ConnectionEvent::AttemptFailed { attempt, total, reason } => {
                warn!(
                    attempt,
                    total,
                    error = %reason,
                    "storage connection attempt {}/{} failed: {}",
                    attempt,
                    total,
                    reason
                );
            }
            ConnectionEvent::Connected { attempt } => {
                info!(attempt, "storage connected on attempt {}", attempt);
            }
            ConnectionEvent::Exhausted { attempts, reason } => {
                error!(
                    attempts,
                    error = %reason,
                    "storage unreachable after {} attempts",
                    attempts
                );
            }
        }
    }
}

/// The one-shot background connection routine
pub struct ConnectionLifecycle {
    handle: StorageHandle,
    connector: Arc<dyn StoreConnector>,
    policy: RetryPolicy,
    observer: Arc<dyn ConnectionObserver>,
}

impl ConnectionLifecycle {
    pub fn new(
        handle: StorageHandle,
        connector: Arc<dyn StoreConnector>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            handle,
            connector,
            policy,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default tracing observer
    pub fn with_observer(mut self, observer: Arc<dyn ConnectionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Connect on the current task.
    ///
    /// Fails with [`StorageError::AlreadyStarted`] if this handle has
    /// already been through a connection routine.
    pub async fn run(self) -> StorageResult<()> {
        self.handle.begin()?;
        self.connect_with_retry().await
    }

    /// Claim the handle now and connect on a background task.
    ///
    /// The claim is synchronous, so a second call fails immediately rather
    /// than racing the first task.
    pub fn spawn(self) -> StorageResult<JoinHandle<StorageResult<()>>> {
        self.handle.begin()?;
        Ok(tokio::spawn(self.connect_with_retry()))
    }

    async fn connect_with_retry(self) -> StorageResult<()> {
        let total = self.policy.max_attempts;
        let executor = RetryExecutor::new(self.policy.clone());

        info!(
            target_uri = %self.connector.describe(),
            max_attempts = total,
            "connecting to storage in the background"
        );

        let result = executor
            .execute_with_context(|attempt| {
                let connector = self.connector.clone();
                let observer = self.observer.clone();
                async move {
                    match connector.connect().await {
                        Ok(store) => Ok((attempt, store)),
                        Err(e) => {
                            observer.on_event(&ConnectionEvent::AttemptFailed {
                                attempt,
                                total,
                                reason: e.to_string(),
                            });
                            Err(e)
                        }
                    }
                }
            })
            .await;

        match result {
            Ok((attempt, store)) => {
                self.handle.publish(store);
                self.observer.on_event(&ConnectionEvent::Connected { attempt });
                Ok(())
            }
            Err(retry_error) => {
                let attempts = retry_error.attempts().unwrap_or(total);
                let reason = retry_error.into_inner().to_string();
                self.handle.fail();
                self.observer.on_event(&ConnectionEvent::Exhausted {
                    attempts,
                    reason: reason.clone(),
                });
                Err(StorageError::ConnectionFailed(format!(
                    "storage unreachable after {} attempts: {}",
                    attempts, reason
                )))
            }
        }
    }
}
