//! Driver-side ride tracking.
//!
//! [`RideTrackingEngine`] owns at most one [`TrackingSession`]. Every public
//! operation takes the engine lock, so start/stop/chat transitions are
//! serialized and a replaced session is fully shut down before its successor
//! subscribes.

use std::sync::Arc;

use limo_core::routing::RouteProvider;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::TrackingConfig;
use crate::ports::{LocationError, LocationSource, SocketChannel};
use crate::session::{Collaborators, TrackingSession};
use crate::state::{ActiveRide, RideStatus, RideTrackingState};

#[derive(Default)]
struct EngineInner {
    session: Option<TrackingSession>,
    chat_paused: bool,
}

pub struct RideTrackingEngine {
    io: Collaborators,
    locations: Arc<dyn LocationSource>,
    inner: Mutex<EngineInner>,
}

impl RideTrackingEngine {
    pub fn new(
        config: TrackingConfig,
        locations: Arc<dyn LocationSource>,
        socket: Arc<dyn SocketChannel>,
        routes: Arc<dyn RouteProvider>,
    ) -> Self {
        let (state, _) = watch::channel(RideTrackingState::default());
        Self {
            io: Collaborators {
                config,
                socket,
                routes,
                state: Arc::new(state),
            },
            locations,
            inner: Mutex::new(EngineInner::default()),
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.io.config
    }

    pub fn subscribe_state(&self) -> watch::Receiver<RideTrackingState> {
        self.io.state.subscribe()
    }

    pub fn snapshot(&self) -> RideTrackingState {
        self.io.state.borrow().clone()
    }

    pub async fn is_tracking(&self) -> bool {
        self.inner.lock().await.session.is_some()
    }

    /// Make `ride` the active ride and start following the driver.
    ///
    /// Any previous session is shut down first. Returns `false` when no
    /// subscription was opened: location permission was refused, the ride
    /// already ended, or chat mode is on (tracking then starts on resume).
    pub async fn start_tracking(&self, ride: ActiveRide) -> bool {
        let mut inner = self.inner.lock().await;
        if let Some(previous) = inner.session.take() {
            previous.shutdown().await;
        }

        let ride_id = ride.ride_id.clone();
        if ride.status == RideStatus::Ended {
            debug!(%ride_id, "ride already ended, not tracking");
            self.io.state.send_replace(RideTrackingState::default());
            return false;
        }
        self.io.state.send_replace(RideTrackingState::for_ride(ride));

        if inner.chat_paused {
            info!(%ride_id, "chat mode active, tracking deferred");
            return false;
        }
        inner.session = self.open_session(ride_id, None).await;
        inner.session.is_some()
    }

    /// Stop following the driver but keep the ride on screen.
    pub async fn stop_tracking(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(session) = inner.session.take() {
            session.shutdown().await;
        }
    }

    /// Stop tracking and forget the ride.
    pub async fn dismiss(&self) {
        self.stop_tracking().await;
        self.io.state.send_replace(RideTrackingState::default());
    }

    /// Pause everything while the driver is in a chat screen.
    pub async fn enter_chat_mode(&self) {
        let mut inner = self.inner.lock().await;
        inner.chat_paused = true;
        if let Some(session) = inner.session.take() {
            session.shutdown().await;
        }
        debug!("chat mode entered");
    }

    /// Leave chat mode and resubscribe. Emissions stay off for the cooldown.
    pub async fn resume_after_chat(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.chat_paused {
            return inner.session.is_some();
        }
        inner.chat_paused = false;

        let ride_id = {
            let state = self.io.state.borrow();
            match state.active_ride.as_ref() {
                Some(ride) if ride.status != RideStatus::Ended => ride.ride_id.clone(),
                _ => return false,
            }
        };
        let suppress_until = Instant::now() + self.io.config.chat_resume_cooldown();
        inner.session = self.open_session(ride_id, Some(suppress_until)).await;
        inner.session.is_some()
    }

    /// Status pushed by dispatch. Unknown rides are ignored.
    pub async fn apply_status(&self, ride_id: &str, status: RideStatus) {
        if self.io.state.borrow().ride_id() != Some(ride_id) {
            debug!(%ride_id, %status, "status for inactive ride ignored");
            return;
        }
        if status == RideStatus::Ended {
            info!(%ride_id, "ride ended");
            self.dismiss().await;
            return;
        }

        let mut target_changed = false;
        self.io.state.send_modify(|state| {
            if let Some(ride) = state.active_ride.as_mut() {
                target_changed = ride.status.route_target() != status.route_target();
                ride.status = status;
            }
            if target_changed {
                state.clear_route();
            }
        });
        debug!(%ride_id, %status, target_changed, "status applied");

        if target_changed {
            let inner = self.inner.lock().await;
            if let Some(session) = inner.session.as_ref() {
                session.request_route_refresh();
            }
        }
    }

    /// Driver confirmed a status change: tell dispatch, then apply it locally.
    pub async fn confirm_status(&self, status: RideStatus) {
        let Some(ride_id) = self.io.state.borrow().ride_id().map(str::to_owned) else {
            warn!(%status, "no active ride to confirm status for");
            return;
        };
        self.io.socket.emit_status_update(&ride_id, status);
        self.apply_status(&ride_id, status).await;
    }

    async fn open_session(
        &self,
        ride_id: String,
        suppress_until: Option<Instant>,
    ) -> Option<TrackingSession> {
        match self.locations.subscribe().await {
            Ok(stream) => Some(TrackingSession::spawn(
                ride_id,
                self.io.clone(),
                stream,
                suppress_until,
            )),
            Err(LocationError::PermissionDenied) => {
                warn!(%ride_id, "location permission denied, tracking not started");
                None
            }
            Err(err) => {
                warn!(%ride_id, error = %err, "location subscription failed");
                None
            }
        }
    }
}
