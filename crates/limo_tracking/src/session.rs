//! A tracking session owns the location loop and both periodic tasks.
//!
//! Tasks share a [`SessionContext`]. Bookkeeping (throttles, cooldown) sits
//! behind a std mutex that is never held across an `.await`; the observable
//! state goes through the engine's `watch` sender.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use limo_core::geo::{snap_to_polyline, Coordinate};
use limo_core::routing::{straight_line_at, RouteProvider};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::TrackingConfig;
use crate::format::{format_distance, format_eta};
use crate::geofence::{detect_arrival, Arrival};
use crate::ports::{LocationStream, SocketChannel};
use crate::state::{LocationSample, RideTrackingState, SnappedLocation};
use crate::throttle::{EmissionThrottle, RouteRefreshThrottle};

/// Handles shared by every session of one engine.
#[derive(Clone)]
pub(crate) struct Collaborators {
    pub config: TrackingConfig,
    pub socket: Arc<dyn SocketChannel>,
    pub routes: Arc<dyn RouteProvider>,
    pub state: Arc<watch::Sender<RideTrackingState>>,
}

struct SessionBook {
    emission: EmissionThrottle,
    route: RouteRefreshThrottle,
    suppress_until: Option<Instant>,
}

pub(crate) struct SessionContext {
    ride_id: String,
    io: Collaborators,
    epoch: Instant,
    book: Mutex<SessionBook>,
    refresh: Notify,
}

impl SessionContext {
    fn new(ride_id: String, io: Collaborators, suppress_until: Option<Instant>) -> Self {
        let config = &io.config;
        let book = SessionBook {
            emission: EmissionThrottle::new(
                config.emission_min_interval_ms,
                config.emission_min_distance_m,
            ),
            route: RouteRefreshThrottle::new(
                config.route_refresh_interval_ms,
                config.route_refresh_distance_m,
            ),
            suppress_until,
        };
        Self {
            ride_id,
            io,
            epoch: Instant::now(),
            book: Mutex::new(book),
            refresh: Notify::new(),
        }
    }

    fn book(&self) -> MutexGuard<'_, SessionBook> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn suppressed(book: &SessionBook) -> bool {
        book.suppress_until
            .is_some_and(|until| Instant::now() < until)
    }

    fn emit(&self, book: &mut SessionBook, now_ms: u64, position: Coordinate) {
        self.io
            .socket
            .emit_location_update(&self.ride_id, position.lat, position.lon);
        book.emission.record(now_ms, position);
        debug!(ride_id = %self.ride_id, lat = position.lat, lon = position.lon, "emitted location");
    }

    /// Snap, publish, maybe emit, maybe wake the route task.
    fn on_sample(&self, sample: LocationSample) {
        let raw = sample.coordinate();
        let max_snap_m = self.io.config.max_snap_distance_m;
        let mut snapped = SnappedLocation::raw(raw);
        let mut accepted = false;

        self.io.state.send_modify(|state| {
            if state.ride_id() != Some(self.ride_id.as_str()) {
                return;
            }
            accepted = true;
            if let Some(snap) = snap_to_polyline(raw, &state.active_route_polyline, max_snap_m) {
                snapped = SnappedLocation {
                    coordinate: snap.coordinate,
                    snap_offset_m: Some(snap.offset_m),
                };
            }
            state.raw_location = Some(sample);
            state.snapped_location = Some(snapped);

            let arrival = state
                .active_ride
                .as_ref()
                .and_then(|ride| detect_arrival(ride, raw, &self.io.config));
            match arrival {
                Some(Arrival::Pickup) if !state.pickup_arrival_detected => {
                    info!(ride_id = %self.ride_id, "pickup arrival detected");
                    state.pickup_arrival_detected = true;
                }
                Some(Arrival::Dropoff) if !state.dropoff_arrival_detected => {
                    info!(ride_id = %self.ride_id, "dropoff arrival detected");
                    state.dropoff_arrival_detected = true;
                }
                _ => {}
            }
        });

        if !accepted {
            return;
        }
        let position = snapped.coordinate;
        let now_ms = self.now_ms();
        let mut book = self.book();
        if !Self::suppressed(&book) && book.emission.should_emit(now_ms, position) {
            self.emit(&mut book, now_ms, position);
        }
        if book.route.is_due(now_ms, position) {
            self.refresh.notify_one();
        }
    }

    /// Repeat the last position if nothing was emitted for a full interval.
    ///
    /// Returns how long to wait before the next check, measured from the
    /// most recent emission so a fresh fix pushes the repeat back.
    fn keep_alive(&self) -> Duration {
        let interval_ms = self.io.config.keep_alive_interval_ms.max(1);
        let full = Duration::from_millis(interval_ms);
        let Some(position) = self.io.state.borrow().current_position() else {
            return full;
        };
        let now_ms = self.now_ms();
        let mut book = self.book();
        if Self::suppressed(&book) {
            return full;
        }
        match book.emission.idle_ms(now_ms) {
            Some(idle) if idle < interval_ms => Duration::from_millis(interval_ms - idle),
            _ => {
                self.emit(&mut book, now_ms, position);
                full
            }
        }
    }

    async fn refresh_route(&self) {
        let (origin, target) = {
            let state = self.io.state.borrow();
            let target = state
                .active_ride
                .as_ref()
                .filter(|ride| ride.ride_id == self.ride_id)
                .and_then(|ride| ride.target_coordinate());
            match (state.current_position(), target) {
                (Some(origin), Some(target)) => (origin, target),
                _ => return,
            }
        };

        {
            let now_ms = self.now_ms();
            let mut book = self.book();
            if !book.route.is_due(now_ms, origin) {
                return;
            }
            book.route.record(now_ms, origin);
        }

        let route = self.io.routes.route(origin, target).await;
        self.io.state.send_modify(|state| {
            // The leg may have changed while the request was in flight.
            let still_current = state
                .active_ride
                .as_ref()
                .and_then(|ride| ride.target_coordinate())
                == Some(target);
            if !still_current {
                return;
            }
            match route {
                Some(route) => {
                    debug!(ride_id = %self.ride_id, distance_m = route.distance_m, "route refreshed");
                    state.distance_text = Some(format_distance(route.distance_m));
                    state.eta_text = Some(format_eta(route.duration_secs));
                    state.route_is_estimate = false;
                    if route.polyline.len() >= 2 {
                        state.active_route_polyline = route.polyline;
                    }
                }
                None => {
                    let estimate =
                        straight_line_at(origin, target, self.io.config.fallback_speed_mps);
                    debug!(
                        ride_id = %self.ride_id,
                        distance_m = estimate.distance_m,
                        "no route, using straight-line estimate"
                    );
                    state.distance_text = Some(format_distance(estimate.distance_m));
                    state.eta_text = Some(format_eta(estimate.duration_secs));
                    state.route_is_estimate = true;
                }
            }
        });
    }

    pub(crate) fn reset_route(&self) {
        self.book().route.reset();
        self.refresh.notify_one();
    }
}

/// Running tasks for one ride. Dropping a session aborts its tasks;
/// [`TrackingSession::shutdown`] also waits for them to finish.
pub struct TrackingSession {
    ctx: Arc<SessionContext>,
    tasks: Vec<JoinHandle<()>>,
}

impl TrackingSession {
    pub(crate) fn spawn(
        ride_id: String,
        io: Collaborators,
        locations: LocationStream,
        suppress_until: Option<Instant>,
    ) -> Self {
        let ctx = Arc::new(SessionContext::new(ride_id, io, suppress_until));
        let tasks = vec![
            tokio::spawn(location_loop(Arc::clone(&ctx), locations)),
            tokio::spawn(keep_alive_loop(Arc::clone(&ctx))),
            tokio::spawn(route_refresh_loop(Arc::clone(&ctx))),
        ];
        info!(ride_id = %ctx.ride_id, "tracking session started");
        Self { ctx, tasks }
    }

    pub fn ride_id(&self) -> &str {
        &self.ctx.ride_id
    }

    /// Clear the route throttle and request a route now.
    pub fn request_route_refresh(&self) {
        self.ctx.reset_route();
    }

    /// Abort every task and wait until none of them can run again.
    pub async fn shutdown(mut self) {
        for task in &self.tasks {
            task.abort();
        }
        for task in self.tasks.drain(..) {
            // Cancellation is the expected outcome.
            let _ = task.await;
        }
        info!(ride_id = %self.ctx.ride_id, "tracking session stopped");
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn location_loop(ctx: Arc<SessionContext>, mut locations: LocationStream) {
    while let Some(sample) = locations.recv().await {
        ctx.on_sample(sample);
    }
    debug!(ride_id = %ctx.ride_id, "location stream closed");
}

async fn keep_alive_loop(ctx: Arc<SessionContext>) {
    let mut wait = ctx.io.config.keep_alive_interval();
    loop {
        time::sleep(wait).await;
        wait = ctx.keep_alive();
    }
}

async fn route_refresh_loop(ctx: Arc<SessionContext>) {
    let mut ticker = time::interval(ctx.io.config.route_refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = ctx.refresh.notified() => {}
        }
        ctx.refresh_route().await;
    }
}
