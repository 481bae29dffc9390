//! Replay a synthetic, noisy GPS trace through the tracking engine.
//!
//! The driver heads east to the pickup, waits, then drives toward Logan.
//! Time is paused so the whole ride replays instantly.
//!
//! Run with: cargo run -p limo_tracking --example replay_trace [config.json]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use limo_core::geo::Coordinate;
use limo_core::routing::{build_route_provider, RouteProvider, RouteProviderKind};
use limo_core::test_helpers::{test_polyline, LOGAN_AIRPORT};
use limo_tracking::{
    ActiveRide, LocationError, LocationSample, LocationSource, LocationStream, RideStatus,
    RideTrackingEngine, SocketChannel, TrackingConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

const GPS_NOISE_M: f64 = 4.0;
const SPEED_MPS: f64 = 8.0;

#[derive(Default)]
struct ReplaySource {
    sender: Mutex<Option<mpsc::Sender<LocationSample>>>,
}

impl ReplaySource {
    fn sender(&self) -> Option<mpsc::Sender<LocationSample>> {
        self.sender.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl LocationSource for ReplaySource {
    async fn subscribe(&self) -> Result<LocationStream, LocationError> {
        let (tx, rx) = mpsc::channel(32);
        if let Ok(mut slot) = self.sender.lock() {
            *slot = Some(tx);
        }
        Ok(rx)
    }
}

#[derive(Default)]
struct CountingSocket {
    locations: AtomicUsize,
    statuses: AtomicUsize,
}

impl SocketChannel for CountingSocket {
    fn emit_location_update(&self, ride_id: &str, lat: f64, lon: f64) {
        self.locations.fetch_add(1, Ordering::Relaxed);
        info!(%ride_id, lat, lon, "location_update");
    }

    fn emit_status_update(&self, ride_id: &str, status: RideStatus) {
        self.statuses.fetch_add(1, Ordering::Relaxed);
        info!(%ride_id, %status, "status_update");
    }
}

/// Points every `SPEED_MPS` metres from `from` to `to`, with GPS jitter.
fn leg(rng: &mut StdRng, from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
    let steps = (from.distance_m(to) / SPEED_MPS).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let point = Coordinate::new(
                from.lat + (to.lat - from.lat) * t,
                from.lon + (to.lon - from.lon) * t,
            );
            point.offset_m(
                rng.gen_range(-GPS_NOISE_M..GPS_NOISE_M),
                rng.gen_range(-GPS_NOISE_M..GPS_NOISE_M),
            )
        })
        .collect()
}

async fn drive(engine: &RideTrackingEngine, source: &ReplaySource, fixes: &[Coordinate]) {
    let epoch = Instant::now();
    for fix in fixes {
        let Some(sender) = source.sender() else {
            return;
        };
        let timestamp_ms = epoch.elapsed().as_millis() as u64;
        if sender.send(LocationSample::new(*fix, timestamp_ms)).await.is_err() {
            return;
        }
        sleep(Duration::from_secs(1)).await;
        let state = engine.snapshot();
        if state.pickup_arrival_detected && state.status() == Some(RideStatus::EnRoutePickup) {
            info!("pickup geofence entered");
            engine.confirm_status(RideStatus::OnLocation).await;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tokio::time::pause();

    let config = match std::env::args().nth(1) {
        Some(path) => match TrackingConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("invalid tracking config {path}: {err}");
                std::process::exit(1);
            }
        },
        None => TrackingConfig::default(),
    };

    let street = test_polyline();
    let pickup = street[street.len() - 1];
    let ride = ActiveRide {
        ride_id: "replay-1".to_string(),
        status: RideStatus::EnRoutePickup,
        pickup,
        pickup_address: "Pickup, Boston, MA".to_string(),
        dropoff: LOGAN_AIRPORT,
        dropoff_address: "Logan Airport, Boston, MA".to_string(),
    };

    let source = Arc::new(ReplaySource::default());
    let socket = Arc::new(CountingSocket::default());
    let routes: Arc<dyn RouteProvider> =
        Arc::from(build_route_provider(&RouteProviderKind::default()));
    let engine = RideTrackingEngine::new(config, source.clone(), socket.clone(), routes);

    if !engine.start_tracking(ride).await {
        eprintln!("tracking did not start");
        return;
    }

    let mut rng = StdRng::seed_from_u64(42);
    let to_pickup = leg(&mut rng, street[0], pickup);
    drive(&engine, &source, &to_pickup).await;

    engine.confirm_status(RideStatus::EnRouteDropoff).await;
    let to_dropoff = leg(&mut rng, pickup, LOGAN_AIRPORT);
    drive(&engine, &source, &to_dropoff).await;

    let state = engine.snapshot();
    println!("--- Replay ({} fixes) ---", to_pickup.len() + to_dropoff.len());
    println!("Location updates sent: {}", socket.locations.load(Ordering::Relaxed));
    println!("Status updates sent: {}", socket.statuses.load(Ordering::Relaxed));
    println!("Dropoff arrival detected: {}", state.dropoff_arrival_detected);
    println!(
        "Last ETA: {} ({})",
        state.eta_text.as_deref().unwrap_or("-"),
        state.distance_text.as_deref().unwrap_or("-")
    );

    engine.apply_status("replay-1", RideStatus::Ended).await;
}
