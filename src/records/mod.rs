/// audited record store worker.
///
/// Customer records carry create/modify stamps filled in by an auditor, and
/// every save appends a numbered revision snapshot, so the full history of a
/// record can be read back: who changed it, when, and what it looked like.
///
use anyhow::Result;
use async_channel::{bounded, Receiver, Sender};
use chrono::{DateTime, Utc};
use domain_keys::keys::RouteKey;
use hashbrown::HashMap;
use log::*;
use serde::{Deserialize, Serialize};
use service_uptime::uptime::Uptime;

use crate::worker::{JsonString, WorkerState, WorkerStatus, OK};

/// who and when, stamped on each record at save time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub creator: String,
    pub modifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub sku: String,
}

impl Order {
    /// a new unsaved order line; the id is assigned on save
    pub fn new(sku: &str) -> Order {
        Order {
            order_id: String::new(),
            sku: sku.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub first_name: String,
    pub last_name: String,
    pub orders: Vec<Order>,
    pub audit: Option<AuditStamp>,
}

impl Customer {
    /// a new unsaved customer; id and audit stamps are assigned on save
    pub fn new(first_name: &str, last_name: &str) -> Customer {
        Customer {
            customer_id: String::new(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            orders: vec![],
            audit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMetadata {
    pub revision: u32,
    pub modified: DateTime<Utc>,
    pub modifier: String,
}

/// a point-in-time snapshot of a customer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub metadata: RevisionMetadata,
    pub entity: Customer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub sku: String,
    pub count: usize,
}

/// resolves the user stamped into audit fields
#[derive(Debug, Clone)]
pub struct Auditor {
    user: String,
}

impl Auditor {
    pub fn new(user: &str) -> Auditor {
        Auditor {
            user: user.to_string(),
        }
    }

    /// resolve the auditor from the USER environment variable
    pub fn from_env() -> Auditor {
        let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
        Auditor { user }
    }

    pub fn current_user(&self) -> String {
        self.user.to_string()
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Save(Customer, Sender<Customer>),
    Find(String, Sender<Option<Customer>>),
    FindAll(Sender<Vec<Customer>>),
    FindByName(String, String, Sender<Vec<Customer>>),
    Revisions(String, Sender<Vec<Revision>>),
    OrderSummary(Sender<Vec<OrderSummary>>),
    DeleteAll(Sender<usize>),
    Len(Sender<usize>),
    Status(Sender<JsonString>),
    Shutdown,
}

// the handler loop
pub async fn handler(id: String, rx: Receiver<Command>, auditor: Auditor) -> Result<()> {
    let uptime = Uptime::new();
    let mut state = WorkerState::Idle;
    let mut error_count = 0;

    let mut customers: HashMap<String, Customer> = HashMap::new();
    let mut revisions: HashMap<String, Vec<Revision>> = HashMap::new();

    while let Ok(cmd) = rx.recv().await {
        debug!("recv cmd: {:?}", cmd);
        match cmd {
            Command::Save(customer, tx) => {
                let mut customer = customer;
                let now = Utc::now();
                let user = auditor.current_user();

                if customer.customer_id.is_empty() {
                    customer.customer_id = RouteKey::create();
                }

                for order in customer.orders.iter_mut() {
                    if order.order_id.is_empty() {
                        order.order_id = RouteKey::create();
                    }
                }

                // first save stamps created/creator; later saves keep them
                customer.audit = Some(match customers.get(&customer.customer_id) {
                    Some(Customer {
                        audit: Some(prior), ..
                    }) => AuditStamp {
                        created: prior.created,
                        creator: prior.creator.to_string(),
                        modified: now,
                        modifier: user.to_string(),
                    },
                    _ => AuditStamp {
                        created: now,
                        modified: now,
                        creator: user.to_string(),
                        modifier: user.to_string(),
                    },
                });

                let history = revisions.entry(customer.customer_id.clone()).or_default();
                let revision = Revision {
                    metadata: RevisionMetadata {
                        revision: history.len() as u32 + 1,
                        modified: now,
                        modifier: user,
                    },
                    entity: customer.clone(),
                };
                history.push(revision);

                info!(
                    "saved customer {} revision {}",
                    customer.customer_id,
                    history.len()
                );
                customers.insert(customer.customer_id.clone(), customer.clone());

                if tx.send(customer).await.is_err() {
                    error_count += 1;
                    error!("error returning saved customer");
                }
            }
            Command::Find(customer_id, tx) => {
                let found = customers.get(&customer_id).cloned();
                if tx.send(found).await.is_err() {
                    error_count += 1;
                    error!("error returning customer");
                }
            }
            Command::FindAll(tx) => {
                let list: Vec<Customer> = customers.values().cloned().collect();
                if tx.send(list).await.is_err() {
                    error_count += 1;
                    error!("error returning customer list");
                }
            }
            Command::FindByName(first, last, tx) => {
                let list: Vec<Customer> = customers
                    .values()
                    .filter(|c| c.first_name == first && c.last_name == last)
                    .cloned()
                    .collect();
                if tx.send(list).await.is_err() {
                    error_count += 1;
                    error!("error returning customers by name");
                }
            }
            Command::Revisions(customer_id, tx) => {
                let history = revisions.get(&customer_id).cloned().unwrap_or_default();
                if tx.send(history).await.is_err() {
                    error_count += 1;
                    error!("error returning revisions");
                }
            }
            Command::OrderSummary(tx) => {
                let mut counts: HashMap<String, usize> = HashMap::new();
                for customer in customers.values() {
                    for order in customer.orders.iter() {
                        *counts.entry(order.sku.clone()).or_insert(0) += 1;
                    }
                }

                let mut summary: Vec<OrderSummary> = counts
                    .into_iter()
                    .map(|(sku, count)| OrderSummary { sku, count })
                    .collect();
                summary.sort_by(|a, b| a.sku.cmp(&b.sku));

                if tx.send(summary).await.is_err() {
                    error_count += 1;
                    error!("error returning order summary");
                }
            }
            Command::DeleteAll(tx) => {
                let removed = customers.len();
                customers.clear();
                revisions.clear();

                info!("deleted {} customers", removed);
                if tx.send(removed).await.is_err() {
                    error_count += 1;
                }
            }
            Command::Len(tx) => {
                let _r = tx.send(customers.len()).await;
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
                info!("records worker id: {}, state: {:?}", id, state);
                break;
            }
        }
    }

    rx.close();

    Ok(())
}

/// client handle for the audited record store
#[derive(Debug, Clone)]
pub struct RecordStore {
    id: String,
    request_tx: Sender<Command>,
}

impl RecordStore {
    /// create and start the record store worker with the given auditor
    pub async fn new(auditor: Auditor) -> RecordStore {
        let id = RouteKey::create();
        let wid = id.clone();

        info!("starting up records worker, id: {}", id);

        let (request_tx, request_rx) = bounded(250);

        async_std::task::spawn(async move {
            match handler(id.clone(), request_rx, auditor).await {
                Ok(()) => info!("records handler exit for worker id: {}", id),
                Err(e) => error!("records worker exit with error: {:?}", e),
            }
        });

        RecordStore {
            id: wid,
            request_tx,
        }
    }

    /// return the worker's id
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    /// save the customer; assigns ids and audit stamps and appends a revision
    pub async fn save(&self, customer: Customer) -> Result<Customer> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Save(customer, responder))
            .await?;

        Ok(rx.recv().await?)
    }

    pub async fn find(&self, customer_id: &str) -> Result<Option<Customer>> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Find(customer_id.to_string(), responder))
            .await?;

        Ok(rx.recv().await?)
    }

    pub async fn find_all(&self) -> Result<Vec<Customer>> {
        let (responder, rx) = bounded(10);
        self.request_tx.send(Command::FindAll(responder)).await?;

        Ok(rx.recv().await?)
    }

    pub async fn find_by_name(&self, first: &str, last: &str) -> Result<Vec<Customer>> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::FindByName(
                first.to_string(),
                last.to_string(),
                responder,
            ))
            .await?;

        Ok(rx.recv().await?)
    }

    /// return the customer's revision history, oldest first
    pub async fn revisions(&self, customer_id: &str) -> Result<Vec<Revision>> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Revisions(customer_id.to_string(), responder))
            .await?;

        Ok(rx.recv().await?)
    }

    /// count of orders grouped by sku, sorted by sku
    pub async fn order_summary(&self) -> Result<Vec<OrderSummary>> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::OrderSummary(responder))
            .await?;

        Ok(rx.recv().await?)
    }

    /// remove all customers and their revision history
    pub async fn delete_all(&self) -> Result<usize> {
        let (responder, rx) = bounded(10);
        self.request_tx.send(Command::DeleteAll(responder)).await?;

        Ok(rx.recv().await?)
    }

    pub async fn len(&self) -> Result<usize> {
        let (responder, rx) = bounded(10);
        self.request_tx.send(Command::Len(responder)).await?;

        Ok(rx.recv().await?)
    }

    pub async fn status(&self) -> Result<WorkerStatus> {
        let (responder, rx) = bounded(10);
        self.request_tx.send(Command::Status(responder)).await?;
        let js = rx.recv().await?;

        Ok(serde_json::from_str(&js)?)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.request_tx.send(Command::Shutdown).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_assigns_ids_and_stamps() {
        async_std::task::block_on(async move {
            let store = RecordStore::new(Auditor::new("tester")).await;

            let mut customer = Customer::new("Dave", "Syer");
            customer.orders.push(Order::new("sku_0"));

            let saved = store.save(customer).await.unwrap();
            assert_eq!(saved.customer_id.len(), 16);
            assert_eq!(saved.orders[0].order_id.len(), 16);

            let audit = saved.audit.as_ref().expect("audit stamp should be set");
            assert_eq!(audit.creator, "tester");
            assert_eq!(audit.modifier, "tester");
            assert_eq!(audit.created, audit.modified);

            assert!(store.shutdown().await.is_ok());
        });
    }

    #[test]
    fn resave_keeps_created_and_bumps_revision() {
        async_std::task::block_on(async move {
            let store = RecordStore::new(Auditor::new("tester")).await;

            let saved = store.save(Customer::new("Dave", "Syer")).await.unwrap();
            let created = saved.audit.as_ref().unwrap().created;

            let mut renamed = saved.clone();
            renamed.first_name = "David".to_string();
            let resaved = store.save(renamed).await.unwrap();

            assert_eq!(resaved.customer_id, saved.customer_id);
            assert_eq!(resaved.audit.as_ref().unwrap().created, created);

            let history = store.revisions(&saved.customer_id).await.unwrap();
            assert_eq!(history.len(), 2);
            assert_eq!(history[0].metadata.revision, 1);
            assert_eq!(history[0].entity.first_name, "Dave");
            assert_eq!(history[1].metadata.revision, 2);
            assert_eq!(history[1].entity.first_name, "David");

            assert!(store.shutdown().await.is_ok());
        });
    }

    #[test]
    fn auditor_from_env() {
        let auditor = Auditor::from_env();
        assert!(!auditor.current_user().is_empty());
    }
}
