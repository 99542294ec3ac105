use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::{anyhow, Result};
use log::*;

use super::worker::{Command, Worker};
use crate::worker::{WorkerState, WorkerStatus, DOWN};

/// supervises a pool of store workers; routes each key to its worker by hash
#[derive(Debug, Clone)]
pub struct Supervisor {
    pub pool_size: usize,
    pub workers: Vec<Worker>,
}

impl Supervisor {
    /// create the pool and start each worker
    pub async fn new(pool_size: usize) -> Result<Supervisor> {
        if pool_size == 0 {
            return Err(anyhow!("pool size must be at least 1"));
        }

        let mut workers = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            workers.push(Worker::new().await);
        }

        info!("supervisor created with {} workers", pool_size);

        Ok(Supervisor { pool_size, workers })
    }

    // a key always routes to the same worker
    fn worker_for(&self, key: &str) -> &Worker {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % self.pool_size;

        &self.workers[idx]
    }

    /// set the value for key; returns the prior value if there was one
    pub async fn set(&self, key: &str, value: &str) -> Result<Option<String>> {
        let worker = self.worker_for(key);
        let (responder, rx) = async_channel::bounded(10);

        worker
            .request_channel()
            .send(Command::Set(key.to_string(), value.to_string(), responder))
            .await?;

        Ok(rx.recv().await?)
    }

    /// get the value for key
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let worker = self.worker_for(key);
        let (responder, rx) = async_channel::bounded(10);

        worker
            .request_channel()
            .send(Command::Get(key.to_string(), responder))
            .await?;

        Ok(rx.recv().await?)
    }

    /// remove the key; returns the removed value if there was one
    pub async fn remove(&self, key: &str) -> Result<Option<String>> {
        let worker = self.worker_for(key);
        let (responder, rx) = async_channel::bounded(10);

        worker
            .request_channel()
            .send(Command::Remove(key.to_string(), responder))
            .await?;

        Ok(rx.recv().await?)
    }

    /// return all keys across the pool
    pub async fn keys(&self) -> Result<Vec<String>> {
        let mut list = vec![];
        for worker in self.workers.iter() {
            let (responder, rx) = async_channel::bounded(10);
            worker
                .request_channel()
                .send(Command::Keys(responder))
                .await?;
            list.extend(rx.recv().await?);
        }

        Ok(list)
    }

    /// return the total number of entries across the pool
    pub async fn len(&self) -> usize {
        let mut total = 0;
        for worker in self.workers.iter() {
            let (responder, rx) = async_channel::bounded(10);
            let request = worker.request_channel().send(Command::Len(responder)).await;
            if request.is_err() {
                warn!("len request failed for worker: {}", worker.id());
                continue;
            }

            if let Ok(sz) = rx.recv().await {
                total += sz;
            }
        }

        total
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// collect the status of each worker; a worker that does not respond is
    /// reported as down rather than failing the whole sweep
    pub async fn status(&self) -> Vec<WorkerStatus> {
        let mut list = Vec::with_capacity(self.pool_size);
        for worker in self.workers.iter() {
            list.push(self.worker_status(worker).await);
        }

        list
    }

    async fn worker_status(&self, worker: &Worker) -> WorkerStatus {
        let down = || {
            WorkerStatus::new(
                worker.id(),
                DOWN.to_string(),
                WorkerState::Broken,
                worker.get_uptime(),
                0,
            )
        };

        let (responder, rx) = async_channel::bounded(10);
        if worker
            .request_channel()
            .send(Command::Status(responder))
            .await
            .is_err()
        {
            return down();
        }

        match rx.recv().await {
            Ok(js) => match serde_json::from_str(&js) {
                Ok(status) => status,
                Err(e) => {
                    error!("bad status json from worker {}: {:?}", worker.id(), e);
                    down()
                }
            },
            Err(_) => down(),
        }
    }

    /// ping a random worker; true if it responds to a status request
    pub async fn ping(&self) -> bool {
        let idx = fastrand::usize(..self.pool_size);
        let worker = &self.workers[idx];

        let (responder, rx) = async_channel::bounded(10);
        if worker
            .request_channel()
            .send(Command::Status(responder))
            .await
            .is_err()
        {
            return false;
        }

        rx.recv().await.is_ok()
    }

    /// send shutdown to each worker in the pool
    pub async fn shutdown(&self) -> Result<()> {
        for worker in self.workers.iter() {
            worker.request_channel().send(Command::Shutdown).await?;
        }

        info!("supervisor shutdown complete");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new() {
        async_std::task::block_on(async move {
            let pool_size = 4usize;
            let supervisor = Supervisor::new(pool_size)
                .await
                .expect("should create the supervisor");
            assert_eq!(supervisor.workers.len(), pool_size);
            assert_eq!(supervisor.pool_size, pool_size);

            assert!(supervisor.shutdown().await.is_ok());
        });
    }

    #[test]
    fn zero_pool_size() {
        async_std::task::block_on(async move {
            assert!(Supervisor::new(0).await.is_err());
        });
    }

    #[test]
    fn routing_is_stable() {
        async_std::task::block_on(async move {
            let supervisor = Supervisor::new(8)
                .await
                .expect("should create the supervisor");

            for key in ["alpha", "bravo", "charlie", "delta"] {
                let first = supervisor.worker_for(key).id();
                let second = supervisor.worker_for(key).id();
                assert_eq!(first, second);
            }

            assert!(supervisor.shutdown().await.is_ok());
        });
    }
}
