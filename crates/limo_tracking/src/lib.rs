pub mod config;
pub mod engine;
pub mod format;
pub mod geofence;
pub mod ports;
pub mod session;
pub mod state;
pub mod throttle;

pub use config::{ConfigError, TrackingConfig};
pub use engine::RideTrackingEngine;
pub use ports::{LocationError, LocationSource, LocationStream, SocketChannel};
pub use state::{ActiveRide, LocationSample, RideStatus, RideTrackingState, SnappedLocation};
