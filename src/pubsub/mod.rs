/// publish/subscribe worker with pattern topics.
///
/// A subscription is the receiving half of an async channel.  Subscribers
/// register a glob pattern (`*` any run, `?` one char) matched against topic
/// names; a publish delivers the message to every matching subscriber and
/// reports the delivery count.  Delivery never blocks the worker loop: a full
/// subscriber channel drops that delivery and a closed one prunes the
/// subscriber.
///
use anyhow::Result;
use async_channel::{bounded, Receiver, Sender, TrySendError};
use domain_keys::keys::RouteKey;
use log::*;
use serde::{Deserialize, Serialize};
use service_uptime::uptime::Uptime;

use crate::worker::{JsonString, WorkerState, WorkerStatus, OK};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    pub payload: String,
}

impl Message {
    pub fn new(topic: &str, payload: &str) -> Message {
        Message {
            topic: topic.to_string(),
            payload: payload.to_string(),
        }
    }
}

/// glob match of a pattern against a topic name; `*` matches any run of
/// characters including none, `?` matches exactly one
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = topic.chars().collect();

    let mut pi = 0;
    let mut ti = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            // remember the star; try matching none first
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if let Some(sp) = star {
            // backtrack: let the star eat one more char
            pi = sp + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }

    pi == p.len()
}

#[derive(Debug, Clone)]
struct Subscriber {
    id: String,
    pattern: String,
    tx: Sender<Message>,
}

#[derive(Debug, Clone)]
pub enum Command {
    Subscribe(String, Sender<Message>, Sender<String>),
    Unsubscribe(String, Sender<bool>),
    Publish(Message, Sender<usize>),
    Count(Sender<usize>),
    Status(Sender<JsonString>),
    Shutdown,
}

// the handler loop
pub async fn handler(id: String, rx: Receiver<Command>) -> Result<()> {
    let uptime = Uptime::new();
    let mut state = WorkerState::Idle;
    let mut error_count = 0;

    let mut subscribers: Vec<Subscriber> = vec![];

    while let Ok(cmd) = rx.recv().await {
        debug!("recv cmd: {:?}", cmd);
        match cmd {
            Command::Subscribe(pattern, tx, responder) => {
                let sub_id = RouteKey::create();
                info!("subscribe {} pattern: {}", sub_id, pattern);

                subscribers.push(Subscriber {
                    id: sub_id.clone(),
                    pattern,
                    tx,
                });

                if responder.send(sub_id).await.is_err() {
                    error_count += 1;
                    error!("error returning subscription id");
                    subscribers.pop();
                }
            }
            Command::Unsubscribe(sub_id, responder) => {
                let before = subscribers.len();
                subscribers.retain(|sub| sub.id != sub_id);
                let removed = subscribers.len() < before;

                info!("unsubscribe {}, removed: {}", sub_id, removed);
                if responder.send(removed).await.is_err() {
                    error_count += 1;
                }
            }
            Command::Publish(message, responder) => {
                info!("publish to {}: {}", message.topic, message.payload);

                let mut delivered = 0;
                let mut closed: Vec<String> = vec![];

                for sub in subscribers.iter() {
                    if !topic_matches(&sub.pattern, &message.topic) {
                        continue;
                    }

                    match sub.tx.try_send(message.clone()) {
                        Ok(()) => delivered += 1,
                        Err(TrySendError::Full(_)) => {
                            // the subscriber is not draining; drop this delivery
                            error_count += 1;
                            warn!("subscriber {} is full, message dropped", sub.id);
                        }
                        Err(TrySendError::Closed(_)) => {
                            closed.push(sub.id.clone());
                        }
                    }
                }

                if !closed.is_empty() {
                    info!("pruning {} closed subscribers", closed.len());
                    subscribers.retain(|sub| !closed.contains(&sub.id));
                }

                if responder.send(delivered).await.is_err() {
                    error_count += 1;
                    error!("error returning publish count");
                }
            }
            Command::Count(responder) => {
                let _r = responder.send(subscribers.len()).await;
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
                info!("pubsub worker id: {}, state: {:?}", id, state);
                break;
            }
        }
    }

    rx.close();

    Ok(())
}

/// client handle for the pub/sub worker
#[derive(Debug, Clone)]
pub struct PubSub {
    id: String,
    request_tx: Sender<Command>,
}

impl PubSub {
    /// create and start a new pub/sub worker
    pub async fn new() -> PubSub {
        let id = RouteKey::create();
        let wid = id.clone();

        info!("starting up pubsub worker, id: {}", id);

        let (request_tx, request_rx) = bounded(250);

        async_std::task::spawn(async move {
            match handler(id.clone(), request_rx).await {
                Ok(()) => info!("pubsub handler exit for worker id: {}", id),
                Err(e) => error!("pubsub worker exit with error: {:?}", e),
            }
        });

        PubSub {
            id: wid,
            request_tx,
        }
    }

    /// return the worker's id
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    /// register a pattern subscription; returns the subscription id and the
    /// message receiver
    pub async fn subscribe(&self, pattern: &str) -> Result<(String, Receiver<Message>)> {
        let (message_tx, message_rx) = bounded(250);
        let (responder, rx) = bounded(10);

        self.request_tx
            .send(Command::Subscribe(pattern.to_string(), message_tx, responder))
            .await?;

        let sub_id = rx.recv().await?;

        Ok((sub_id, message_rx))
    }

    /// drop the subscription; true if it was registered
    pub async fn unsubscribe(&self, sub_id: &str) -> Result<bool> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Unsubscribe(sub_id.to_string(), responder))
            .await?;

        Ok(rx.recv().await?)
    }

    /// publish the payload to the topic; returns the delivery count
    pub async fn publish(&self, topic: &str, payload: &str) -> Result<usize> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Publish(Message::new(topic, payload), responder))
            .await?;

        Ok(rx.recv().await?)
    }

    /// return the number of live subscriptions
    pub async fn subscriber_count(&self) -> Result<usize> {
        let (responder, rx) = bounded(10);
        self.request_tx.send(Command::Count(responder)).await?;

        Ok(rx.recv().await?)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.request_tx.send(Command::Shutdown).await?;

        Ok(())
    }
}
