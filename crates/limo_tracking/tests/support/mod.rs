#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use limo_core::geo::Coordinate;
use limo_core::routing::{RouteProvider, RouteResult};
use limo_core::test_helpers::{test_polyline, LOGAN_AIRPORT};
use limo_tracking::{
    ActiveRide, LocationError, LocationSample, LocationSource, LocationStream, RideStatus,
    RideTrackingEngine, SocketChannel, TrackingConfig,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Let spawned session tasks run without moving the clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Location service driven by the test.
pub struct ManualLocationSource {
    deny: AtomicBool,
    senders: Mutex<Vec<mpsc::Sender<LocationSample>>>,
    epoch: Instant,
}

impl Default for ManualLocationSource {
    fn default() -> Self {
        Self {
            deny: AtomicBool::new(false),
            senders: Mutex::new(Vec::new()),
            epoch: Instant::now(),
        }
    }
}

impl ManualLocationSource {
    pub fn denying() -> Self {
        let source = Self::default();
        source.deny.store(true, Ordering::SeqCst);
        source
    }

    pub fn subscriptions(&self) -> usize {
        self.senders.lock().expect("senders").len()
    }

    pub fn latest(&self) -> Option<mpsc::Sender<LocationSample>> {
        self.senders.lock().expect("senders").last().cloned()
    }

    /// True when the given subscription has been dropped by the engine.
    pub fn is_closed(&self, index: usize) -> bool {
        self.senders.lock().expect("senders")[index].is_closed()
    }

    /// Deliver a fix on the newest subscription and let the engine process it.
    pub async fn push(&self, coordinate: Coordinate) -> bool {
        let Some(sender) = self.latest() else {
            return false;
        };
        let timestamp_ms = self.epoch.elapsed().as_millis() as u64;
        let delivered = sender
            .send(LocationSample::new(coordinate, timestamp_ms))
            .await
            .is_ok();
        settle().await;
        delivered
    }
}

#[async_trait]
impl LocationSource for ManualLocationSource {
    async fn subscribe(&self) -> Result<LocationStream, LocationError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(LocationError::PermissionDenied);
        }
        let (tx, rx) = mpsc::channel(64);
        self.senders.lock().expect("senders").push(tx);
        Ok(rx)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Location { ride_id: String, lat: f64, lon: f64 },
    Status { ride_id: String, status: RideStatus },
}

#[derive(Default)]
pub struct RecordingSocket {
    events: Mutex<Vec<SocketEvent>>,
}

impl RecordingSocket {
    pub fn events(&self) -> Vec<SocketEvent> {
        self.events.lock().expect("events").clone()
    }

    pub fn location_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, SocketEvent::Location { .. }))
            .count()
    }

    pub fn last_location(&self) -> Option<Coordinate> {
        self.events().iter().rev().find_map(|event| match event {
            SocketEvent::Location { lat, lon, .. } => Some(Coordinate::new(*lat, *lon)),
            SocketEvent::Status { .. } => None,
        })
    }
}

impl SocketChannel for RecordingSocket {
    fn emit_location_update(&self, ride_id: &str, lat: f64, lon: f64) {
        self.events.lock().expect("events").push(SocketEvent::Location {
            ride_id: ride_id.to_string(),
            lat,
            lon,
        });
    }

    fn emit_status_update(&self, ride_id: &str, status: RideStatus) {
        self.events.lock().expect("events").push(SocketEvent::Status {
            ride_id: ride_id.to_string(),
            status,
        });
    }
}

/// Returns whatever route the test configured; `None` simulates an outage.
#[derive(Default)]
pub struct ScriptedRouteProvider {
    response: Mutex<Option<RouteResult>>,
    requests: Mutex<Vec<(Coordinate, Coordinate)>>,
    calls: AtomicUsize,
}

impl ScriptedRouteProvider {
    pub fn returning(route: RouteResult) -> Self {
        let provider = Self::default();
        provider.set_response(Some(route));
        provider
    }

    pub fn set_response(&self, route: Option<RouteResult>) {
        *self.response.lock().expect("response") = route;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_destination(&self) -> Option<Coordinate> {
        self.requests
            .lock()
            .expect("requests")
            .last()
            .map(|(_, destination)| *destination)
    }
}

#[async_trait]
impl RouteProvider for ScriptedRouteProvider {
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> Option<RouteResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests")
            .push((origin, destination));
        self.response.lock().expect("response").clone()
    }
}

/// The fixture street as a road route: 1 km, about three minutes.
pub fn street_route() -> RouteResult {
    RouteResult {
        polyline: test_polyline(),
        distance_m: 1_000.0,
        duration_secs: 180.0,
    }
}

/// Ride whose pickup is the east end of the fixture street.
pub fn test_ride(ride_id: &str) -> ActiveRide {
    let street = test_polyline();
    ActiveRide {
        ride_id: ride_id.to_string(),
        status: RideStatus::EnRoutePickup,
        pickup: street[street.len() - 1],
        pickup_address: "Pickup, Boston, MA".to_string(),
        dropoff: LOGAN_AIRPORT,
        dropoff_address: "Logan Airport, Boston, MA".to_string(),
    }
}

pub struct Harness {
    pub engine: Arc<RideTrackingEngine>,
    pub source: Arc<ManualLocationSource>,
    pub socket: Arc<RecordingSocket>,
    pub routes: Arc<ScriptedRouteProvider>,
}

impl Harness {
    pub fn new(config: TrackingConfig) -> Self {
        Self::with_parts(
            config,
            ManualLocationSource::default(),
            ScriptedRouteProvider::returning(street_route()),
        )
    }

    pub fn with_parts(
        config: TrackingConfig,
        source: ManualLocationSource,
        routes: ScriptedRouteProvider,
    ) -> Self {
        init_tracing();
        let source = Arc::new(source);
        let socket = Arc::new(RecordingSocket::default());
        let routes = Arc::new(routes);
        let engine = Arc::new(RideTrackingEngine::new(
            config,
            source.clone(),
            socket.clone(),
            routes.clone(),
        ));
        Self {
            engine,
            source,
            socket,
            routes,
        }
    }
}

/// Keep-alive far out of the way so only fixes drive emissions.
pub fn config_without_keep_alive() -> TrackingConfig {
    TrackingConfig {
        keep_alive_interval_ms: Duration::from_secs(3_600).as_millis() as u64,
        ..Default::default()
    }
}
