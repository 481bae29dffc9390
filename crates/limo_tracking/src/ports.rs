//! Collaborators the tracking engine talks to: the platform location service
//! and the outbound dispatch socket.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::state::{LocationSample, RideStatus};

/// Fixes arrive in order; the stream ends when the receiver is dropped or the
/// platform stops the service.
pub type LocationStream = mpsc::Receiver<LocationSample>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location service unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Start a fresh subscription. Dropping the returned stream ends it.
    async fn subscribe(&self) -> Result<LocationStream, LocationError>;
}

/// Fire-and-forget socket emitter; nothing is acknowledged.
pub trait SocketChannel: Send + Sync {
    fn emit_location_update(&self, ride_id: &str, lat: f64, lon: f64);
    fn emit_status_update(&self, ride_id: &str, status: RideStatus);
}
