/// memoized lookup: get-or-compute by key.
///
/// The service fronts a provider (the slow computation) with a key/value
/// backend.  A get checks the backend first; on a miss the provider runs once
/// and the result is stored under the key.  All requests funnel through the
/// worker loop, so concurrent misses on the same key are parked on a waiter
/// list and share the single computation -- the provider never runs twice for
/// one key.  A provider failure answers every parked caller with
/// `ComputationFailed` and stores nothing.
///
/// There is no expiry here; an entry lives until it is removed through the
/// backend.
///
use std::sync::Arc;

use anyhow::Result;
use async_channel::{bounded, Receiver, Sender};
use async_trait::async_trait;
use domain_keys::keys::RouteKey;
use hashbrown::HashMap;
use log::*;
use service_uptime::uptime::Uptime;

use crate::errors::CacheError;
use crate::store::Supervisor;
use crate::worker::{JsonString, WorkerState, WorkerStatus, OK};

/// the computation to memoize, e.g., a database read or remote api call
#[async_trait]
pub trait Provider: Send + Sync {
    async fn compute(&self, key: &str) -> Result<String>;
}

/// the key/value collaborator that holds computed results
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Option<String>>;
    async fn store(&self, key: &str, value: &str) -> Result<()>;
}

/// the store supervisor is the standard backend
#[async_trait]
impl Backend for Supervisor {
    async fn fetch(&self, key: &str) -> Result<Option<String>> {
        self.get(key).await
    }

    async fn store(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, value).await?;

        Ok(())
    }
}

type Responder = Sender<Result<String, CacheError>>;

#[derive(Debug, Clone)]
pub enum Command {
    Fetch(String, Responder),
    // internal: a provider task finished; Err carries the failure reason
    Complete(String, Result<String, String>),
    Status(Sender<JsonString>),
    Shutdown,
}

// the handler loop; loop_tx lets spawned provider tasks report completions
pub async fn handler(
    id: String,
    rx: Receiver<Command>,
    loop_tx: Sender<Command>,
    provider: Arc<dyn Provider>,
    backend: Arc<dyn Backend>,
) -> Result<()> {
    let uptime = Uptime::new();
    let mut state = WorkerState::Idle;
    let mut error_count = 0;

    // keys with a computation in flight and the callers parked on them
    let mut pending: HashMap<String, Vec<Responder>> = HashMap::new();

    while let Ok(cmd) = rx.recv().await {
        debug!("recv cmd: {:?}", cmd);
        match cmd {
            Command::Fetch(key, tx) => {
                let hit = match backend.fetch(&key).await {
                    Ok(found) => found,
                    Err(e) => {
                        // treat a broken backend read as a miss and recompute
                        error_count += 1;
                        error!("backend fetch failed for {}: {:?}", key, e);
                        None
                    }
                };

                if let Some(value) = hit {
                    info!("hit: {}", key);
                    if tx.send(Ok(value)).await.is_err() {
                        error_count += 1;
                        error!("error returning value for key: {}", key);
                    }
                    continue;
                }

                if let Some(waiters) = pending.get_mut(&key) {
                    // already computing this key; park the caller
                    info!("parked on in-flight key: {}", key);
                    waiters.push(tx);
                    continue;
                }

                info!("miss, computing: {}", key);
                pending.insert(key.clone(), vec![tx]);
                state = WorkerState::Busy;

                let provider = Arc::clone(&provider);
                let loop_tx = loop_tx.clone();
                async_std::task::spawn(async move {
                    let result = provider.compute(&key).await.map_err(|e| e.to_string());
                    if loop_tx.send(Command::Complete(key, result)).await.is_err() {
                        error!("memo loop closed before completion");
                    }
                });
            }
            Command::Complete(key, result) => {
                let waiters = pending.remove(&key).unwrap_or_default();
                if pending.is_empty() {
                    state = WorkerState::Idle;
                }

                match result {
                    Ok(value) => {
                        if let Err(e) = backend.store(&key, &value).await {
                            // the value is still good; the next get recomputes
                            error_count += 1;
                            error!("backend store failed for {}: {:?}", key, e);
                        }

                        for tx in waiters {
                            if tx.send(Ok(value.clone())).await.is_err() {
                                error_count += 1;
                            }
                        }
                    }
                    Err(reason) => {
                        warn!("provider failed for {}: {}", key, reason);
                        let err = CacheError::ComputationFailed {
                            key: key.clone(),
                            reason,
                        };

                        for tx in waiters {
                            if tx.send(Err(err.clone())).await.is_err() {
                                error_count += 1;
                            }
                        }
                    }
                }
            }
            Command::Status(tx) => {
                let status = WorkerStatus::new(
                    id.to_string(),
                    OK.to_string(),
                    state.clone(),
                    uptime.to_string(),
                    error_count,
                );

                let msg = match serde_json::to_string(&status) {
                    Ok(js) => js,
                    Err(e) => {
                        format!(r#"{}"status":"json parse error: {:?}"{}"#, "{", e, "}\n")
                    }
                };

                if tx.send(msg).await.is_err() {
                    error_count += 1;
                    error!("error returning status to channel: {:?}", tx);
                }
            }
            Command::Shutdown => {
                state = WorkerState::Shutdown;
                info!("memo worker id: {}, state: {:?}", id, state);
                break;
            }
        }
    }

    rx.close();

    Ok(())
}

/// client handle for the memoized lookup worker
#[derive(Debug, Clone)]
pub struct MemoCache {
    id: String,
    request_tx: Sender<Command>,
}

impl MemoCache {
    /// create and start the memo worker over the given provider and backend
    pub async fn new(provider: Arc<dyn Provider>, backend: Arc<dyn Backend>) -> MemoCache {
        let id = RouteKey::create();
        let wid = id.clone();

        info!("starting up memo worker, id: {}", id);

        let (request_tx, request_rx) = bounded(250);
        let loop_tx = request_tx.clone();

        async_std::task::spawn(async move {
            match handler(id.clone(), request_rx, loop_tx, provider, backend).await {
                Ok(()) => info!("memo handler exit for worker id: {}", id),
                Err(e) => error!("memo worker exit with error: {:?}", e),
            }
        });

        MemoCache {
            id: wid,
            request_tx,
        }
    }

    /// return the worker's id
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    /// return the memoized value for key, computing it on first access
    pub async fn get(&self, key: &str) -> Result<String, CacheError> {
        let closed = || CacheError::ChannelClosed("memo".to_string());

        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Fetch(key.to_string(), responder))
            .await
            .map_err(|_| closed())?;

        rx.recv().await.map_err(|_| closed())?
    }

    /// request the worker's status
    pub async fn status(&self) -> Result<WorkerStatus> {
        let (responder, rx) = bounded(10);
        self.request_tx.send(Command::Status(responder)).await?;
        let js = rx.recv().await?;

        Ok(serde_json::from_str(&js)?)
    }

    pub async fn shutdown(&self) -> Result<(), CacheError> {
        self.request_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| CacheError::ChannelClosed("memo".to_string()))
    }
}
