/// geospatial index worker: named sets of members with lon/lat positions and
/// radius queries in kilometers.  distances use the haversine great-circle
/// formula; radius results come back nearest first.
///
use anyhow::Result;
use async_channel::{bounded, Receiver, Sender};
use domain_keys::keys::RouteKey;
use hashbrown::HashMap;
use log::*;
use serde::{Deserialize, Serialize};
use service_uptime::uptime::Uptime;

use crate::worker::{JsonString, WorkerState, WorkerStatus, OK};

/// mean earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> GeoPoint {
        GeoPoint {
            longitude,
            latitude,
        }
    }

    /// great-circle distance to the other point in kilometers
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

/// a member returned from a radius query with its distance from the center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    pub member: String,
    pub point: GeoPoint,
    pub distance_km: f64,
}

#[derive(Debug, Clone)]
pub enum Command {
    Add(String, String, GeoPoint, Sender<Option<GeoPoint>>),
    Position(String, String, Sender<Option<GeoPoint>>),
    Remove(String, String, Sender<Option<GeoPoint>>),
    Radius(String, GeoPoint, f64, Sender<Vec<GeoLocation>>),
    Len(String, Sender<usize>),
    Status(Sender<JsonString>),
    Shutdown,
}

// the handler loop
pub async fn handler(id: String, rx: Receiver<Command>) -> Result<()> {
    let uptime = Uptime::new();
    let mut state = WorkerState::Idle;
    let mut error_count = 0;

    // set name -> member -> position
    let mut sets: HashMap<String, HashMap<String, GeoPoint>> = HashMap::new();

    while let Ok(cmd) = rx.recv().await {
        debug!("recv cmd: {:?}", cmd);
        match cmd {
            Command::Add(set, member, point, tx) => {
                info!("geo add {} -> {} @ {:?}", set, member, point);
                let prior = sets.entry(set).or_default().insert(member, point);
                if tx.send(prior).await.is_err() {
                    error_count += 1;
                    error!("error returning add response");
                }
            }
            Command::Position(set, member, tx) => {
                let point = sets.get(&set).and_then(|members| members.get(&member)).copied();
                if tx.send(point).await.is_err() {
                    error_count += 1;
                    error!("error returning position response");
                }
            }
            Command::Remove(set, member, tx) => {
                info!("geo remove {} -> {}", set, member);
                let prior = sets.get_mut(&set).and_then(|members| members.remove(&member));
                if tx.send(prior).await.is_err() {
                    error_count += 1;
                    error!("error returning remove response");
                }
            }
            Command::Radius(set, center, radius_km, tx) => {
                info!("geo radius {} @ {:?} within {} km", set, center, radius_km);

                let mut found: Vec<GeoLocation> = sets
                    .get(&set)
                    .map(|members| {
                        members
                            .iter()
                            .filter_map(|(member, point)| {
                                let distance_km = center.distance_km(point);
                                if distance_km <= radius_km {
                                    Some(GeoLocation {
                                        member: member.to_string(),
                                        point: *point,
                                        distance_km,
                                    })
                                } else {
                                    None
                                }
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                // nearest first
                found.sort_by(|a, b| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                if tx.send(found).await.is_err() {
                    error_count += 1;
                    error!("error returning radius response");
                }
            }
            Command::Len(set, tx) => {
                let sz = sets.get(&set).map(|members| members.len()).unwrap_or(0);
                let _r = tx.send(sz).await;
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
                info!("geo worker id: {}, state: {:?}", id, state);
                break;
            }
        }
    }

    rx.close();

    Ok(())
}

/// client handle for the geo index worker
#[derive(Debug, Clone)]
pub struct GeoIndex {
    id: String,
    request_tx: Sender<Command>,
}

impl GeoIndex {
    /// create and start a new geo index worker
    pub async fn new() -> GeoIndex {
        let id = RouteKey::create();
        let wid = id.clone();

        info!("starting up geo worker, id: {}", id);

        let (request_tx, request_rx) = bounded(250);

        async_std::task::spawn(async move {
            match handler(id.clone(), request_rx).await {
                Ok(()) => info!("geo handler exit for worker id: {}", id),
                Err(e) => error!("geo worker exit with error: {:?}", e),
            }
        });

        GeoIndex {
            id: wid,
            request_tx,
        }
    }

    /// return the worker's id
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    /// add a member to the named set; returns the prior position if any
    pub async fn add(
        &self,
        set: &str,
        member: &str,
        point: GeoPoint,
    ) -> Result<Option<GeoPoint>> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Add(
                set.to_string(),
                member.to_string(),
                point,
                responder,
            ))
            .await?;

        Ok(rx.recv().await?)
    }

    /// return the member's position, if it is in the set
    pub async fn position(&self, set: &str, member: &str) -> Result<Option<GeoPoint>> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Position(
                set.to_string(),
                member.to_string(),
                responder,
            ))
            .await?;

        Ok(rx.recv().await?)
    }

    /// remove the member from the set; returns its position if it was there
    pub async fn remove(&self, set: &str, member: &str) -> Result<Option<GeoPoint>> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Remove(
                set.to_string(),
                member.to_string(),
                responder,
            ))
            .await?;

        Ok(rx.recv().await?)
    }

    /// return the members within radius_km of center, nearest first
    pub async fn radius(
        &self,
        set: &str,
        center: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<GeoLocation>> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Radius(set.to_string(), center, radius_km, responder))
            .await?;

        Ok(rx.recv().await?)
    }

    /// return the number of members in the set
    pub async fn len(&self, set: &str) -> Result<usize> {
        let (responder, rx) = bounded(10);
        self.request_tx
            .send(Command::Len(set.to_string(), responder))
            .await?;

        Ok(rx.recv().await?)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.request_tx.send(Command::Shutdown).await?;

        Ok(())
    }
}
