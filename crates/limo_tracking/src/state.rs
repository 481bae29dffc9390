//! Observable ride tracking state.

use std::fmt;

use limo_core::geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Ride status as pushed by the dispatch socket. The engine never advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    #[serde(rename = "en_route_pu")]
    EnRoutePickup,
    OnLocation,
    #[serde(rename = "en_route_do")]
    EnRouteDropoff,
    Ended,
}

impl RideStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RideStatus::EnRoutePickup => "en_route_pu",
            RideStatus::OnLocation => "on_location",
            RideStatus::EnRouteDropoff => "en_route_do",
            RideStatus::Ended => "ended",
        }
    }

    pub fn from_wire(raw: &str) -> Option<RideStatus> {
        match raw.trim() {
            "en_route_pu" => Some(RideStatus::EnRoutePickup),
            "on_location" => Some(RideStatus::OnLocation),
            "en_route_do" => Some(RideStatus::EnRouteDropoff),
            "ended" => Some(RideStatus::Ended),
            _ => None,
        }
    }

    /// Which endpoint the driver is heading to. `None` once the ride ended.
    pub fn route_target(self) -> Option<RouteTarget> {
        match self {
            RideStatus::EnRoutePickup => Some(RouteTarget::Pickup),
            RideStatus::OnLocation | RideStatus::EnRouteDropoff => Some(RouteTarget::Dropoff),
            RideStatus::Ended => None,
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    Pickup,
    Dropoff,
}

/// The ride currently assigned to this driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRide {
    pub ride_id: String,
    pub status: RideStatus,
    pub pickup: Coordinate,
    pub pickup_address: String,
    pub dropoff: Coordinate,
    pub dropoff_address: String,
}

impl ActiveRide {
    pub fn target_coordinate(&self) -> Option<Coordinate> {
        self.status.route_target().map(|target| match target {
            RouteTarget::Pickup => self.pickup,
            RouteTarget::Dropoff => self.dropoff,
        })
    }
}

/// One fix from the platform location service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    pub lat: f64,
    pub lon: f64,
    pub timestamp_ms: u64,
    /// Horizontal accuracy in metres, when reported.
    pub accuracy: Option<f64>,
}

impl LocationSample {
    pub fn new(coordinate: Coordinate, timestamp_ms: u64) -> Self {
        Self {
            lat: coordinate.lat,
            lon: coordinate.lon,
            timestamp_ms,
            accuracy: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Position shown on the map: on the route when close enough, raw otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnappedLocation {
    pub coordinate: Coordinate,
    /// Distance from the raw fix to the route, when snapped.
    pub snap_offset_m: Option<f64>,
}

impl SnappedLocation {
    pub fn raw(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            snap_offset_m: None,
        }
    }

    pub fn is_snapped(&self) -> bool {
        self.snap_offset_m.is_some()
    }
}

/// Everything the map screen renders. Published through a `watch` channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideTrackingState {
    pub active_ride: Option<ActiveRide>,
    pub raw_location: Option<LocationSample>,
    pub snapped_location: Option<SnappedLocation>,
    pub active_route_polyline: Vec<Coordinate>,
    pub eta_text: Option<String>,
    pub distance_text: Option<String>,
    /// ETA and distance came from the straight-line fallback.
    pub route_is_estimate: bool,
    pub pickup_arrival_detected: bool,
    pub dropoff_arrival_detected: bool,
}

impl RideTrackingState {
    pub fn for_ride(ride: ActiveRide) -> Self {
        Self {
            active_ride: Some(ride),
            ..Default::default()
        }
    }

    pub fn ride_id(&self) -> Option<&str> {
        self.active_ride.as_ref().map(|ride| ride.ride_id.as_str())
    }

    pub fn status(&self) -> Option<RideStatus> {
        self.active_ride.as_ref().map(|ride| ride.status)
    }

    /// Latest position to route or emit from: snapped if available, else raw.
    pub fn current_position(&self) -> Option<Coordinate> {
        self.snapped_location
            .map(|snapped| snapped.coordinate)
            .or_else(|| self.raw_location.map(|raw| raw.coordinate()))
    }

    /// Forget the route of the previous leg.
    pub(crate) fn clear_route(&mut self) {
        self.active_route_polyline.clear();
        self.eta_text = None;
        self.distance_text = None;
        self.route_is_estimate = false;
    }
}
