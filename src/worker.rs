/// worker support structs
///
use serde::{Deserialize, Serialize};

pub type JsonString = String;

/// the standard healthy status string
pub const OK: &str = "ok";
/// reported when a worker has stopped responding
pub const DOWN: &str = "down";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    #[default]
    Idle,
    Busy,
    Broken,
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub worker_id: String,
    pub status: String,
    pub state: WorkerState,
    pub uptime: String,
    pub error_count: u16,
}

impl WorkerStatus {
    pub fn new(
        worker_id: String,
        status: String,
        state: WorkerState,
        uptime: String,
        error_count: u16,
    ) -> WorkerStatus {
        WorkerStatus {
            worker_id,
            status,
            state,
            uptime,
            error_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        let status = WorkerStatus::new(
            "W1brqVdpRwOkkRRMvdnO".to_string(),
            OK.to_string(),
            WorkerState::Idle,
            "0 days, 00:00:00".to_string(),
            0,
        );

        let js = serde_json::to_string(&status).unwrap();
        println!("{}", js);
        let parsed: WorkerStatus = serde_json::from_str(&js).unwrap();
        assert_eq!(parsed.status, OK);
        assert_eq!(parsed.state, WorkerState::Idle);
        assert_eq!(parsed.error_count, 0);
    }

    #[test]
    fn bounded_tests() {
        async_std::task::block_on(async move {
            let (s, r) = async_channel::bounded(2);
            assert_eq!(r.is_empty(), true);
            assert_eq!(s.send(10).await, Ok(()));
            assert_eq!(s.send(12).await, Ok(()));

            assert_eq!(r.is_full(), true);
            assert_eq!(r.recv().await, Ok(10));
            assert_eq!(r.recv().await, Ok(12));
            assert_eq!(r.is_empty(), true);

            // if you try sending more than the buffer allows here, the
            // process will just wait until there is room in the queue
            assert_eq!(s.send(14).await, Ok(()));
            assert_eq!(r.recv().await, Ok(14));

            assert_eq!(s.close(), true);
            assert_eq!(s.is_closed(), true);

            // closing the sender shuts down the receiver as well
            assert_eq!(r.is_closed(), true);

            match r.recv().await {
                Ok(_) => assert!(false, "should not work here"),
                Err(e) => {
                    println!("error: {:?}", e);
                    assert!(true);
                }
            }
        });
    }
}
