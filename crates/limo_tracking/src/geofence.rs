//! Pickup and dropoff arrival checks.

use limo_core::geo::Coordinate;

use crate::config::TrackingConfig;
use crate::state::{ActiveRide, RideStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    Pickup,
    Dropoff,
}

/// Arrival implied by a raw fix for the ride's current status.
///
/// Advisory only: the caller surfaces it, status changes come from the driver.
pub fn detect_arrival(
    ride: &ActiveRide,
    position: Coordinate,
    config: &TrackingConfig,
) -> Option<Arrival> {
    match ride.status {
        RideStatus::EnRoutePickup
            if position.distance_m(ride.pickup) <= config.pickup_arrival_radius_m =>
        {
            Some(Arrival::Pickup)
        }
        RideStatus::EnRouteDropoff
            if position.distance_m(ride.dropoff) <= config.dropoff_arrival_radius_m =>
        {
            Some(Arrival::Dropoff)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ride(status: RideStatus) -> ActiveRide {
        ActiveRide {
            ride_id: "ride-1".to_string(),
            status,
            pickup: Coordinate::new(42.3551, -71.0656),
            pickup_address: "Boston Common".to_string(),
            dropoff: Coordinate::new(42.3656, -71.0096),
            dropoff_address: "Logan".to_string(),
        }
    }

    #[test]
    fn pickup_radius_applies_only_en_route_to_pickup() {
        let config = TrackingConfig::default();
        let near_pickup = ride(RideStatus::EnRoutePickup).pickup.offset_m(90.0, 0.0);

        assert_eq!(
            detect_arrival(&ride(RideStatus::EnRoutePickup), near_pickup, &config),
            Some(Arrival::Pickup)
        );
        assert_eq!(
            detect_arrival(&ride(RideStatus::OnLocation), near_pickup, &config),
            None
        );
    }

    #[test]
    fn dropoff_radius_is_tighter() {
        let config = TrackingConfig::default();
        let dropoff = ride(RideStatus::EnRouteDropoff).dropoff;

        assert_eq!(
            detect_arrival(
                &ride(RideStatus::EnRouteDropoff),
                dropoff.offset_m(0.0, 45.0),
                &config
            ),
            Some(Arrival::Dropoff)
        );
        assert_eq!(
            detect_arrival(
                &ride(RideStatus::EnRouteDropoff),
                dropoff.offset_m(0.0, 70.0),
                &config
            ),
            None
        );
    }
}
