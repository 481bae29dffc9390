//! Server-side booking records and the user's pending edits.
//!
//! A [`BookingSnapshot`] is deserialized from the booking API and never
//! modified. Everything the driver changes on the finalize screen lives in a
//! [`UserEditSet`] and is merged only when a request is built.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::rates::RateSchedule;

/// One end of a transfer as stored on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegSnapshot {
    pub address: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub country: Option<String>,
    pub airport_name: Option<String>,
    pub airline_name: Option<String>,
    pub flight_number: Option<String>,
    pub cruise_port: Option<String>,
    pub cruise_ship: Option<String>,
}

/// Partial changes to a leg. `None` keeps the snapshot value.
pub type LegEdit = LegSnapshot;

impl LegSnapshot {
    /// Field-wise merge preferring `edit`.
    pub fn merged_with(&self, edit: &LegEdit) -> LegSnapshot {
        fn pick<T: Clone>(edit: &Option<T>, base: &Option<T>) -> Option<T> {
            edit.clone().or_else(|| base.clone())
        }
        LegSnapshot {
            address: pick(&edit.address, &self.address),
            coordinate: edit.coordinate.or(self.coordinate),
            country: pick(&edit.country, &self.country),
            airport_name: pick(&edit.airport_name, &self.airport_name),
            airline_name: pick(&edit.airline_name, &self.airline_name),
            flight_number: pick(&edit.flight_number, &self.flight_number),
            cruise_port: pick(&edit.cruise_port, &self.cruise_port),
            cruise_ship: pick(&edit.cruise_ship, &self.cruise_ship),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PassengerInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub count: Option<u32>,
    pub luggage_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleInfo {
    pub id: Option<String>,
    pub vehicle_type: Option<String>,
    pub plate: Option<String>,
}

/// An intermediate stop between pickup and dropoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtraStop {
    pub address: String,
    pub coordinate: Option<Coordinate>,
    pub rate: Option<f64>,
    pub instructions: Option<String>,
}

/// Road distance and duration computed by a routing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub distance_m: f64,
    pub duration_secs: f64,
}

/// Immutable reservation record as fetched from the booking API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingSnapshot {
    pub reservation_id: Option<String>,
    pub service_type: Option<String>,
    pub transfer_type: Option<String>,
    pub pickup: LegSnapshot,
    pub dropoff: LegSnapshot,
    pub pickup_date: Option<String>,
    pub pickup_time: Option<String>,
    pub number_of_hours: Option<u32>,
    pub number_of_vehicles: Option<u32>,
    pub passenger: PassengerInfo,
    pub vehicle: VehicleInfo,
    pub account_type: Option<String>,
    pub created_by: Option<i64>,
    pub affiliate_id: Option<String>,
    pub reservation_type: Option<String>,
    pub distance_meters: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub status: Option<String>,
    pub special_instructions: Option<String>,
    pub extra_stops: Vec<ExtraStop>,
    pub rates: RateSchedule,
}

/// Everything the driver changed on top of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserEditSet {
    pub service_type: Option<String>,
    pub transfer_type: Option<String>,
    pub pickup: LegEdit,
    pub dropoff: LegEdit,
    pub pickup_date: Option<String>,
    pub pickup_time: Option<String>,
    pub number_of_hours: Option<u32>,
    pub number_of_vehicles: Option<u32>,
    pub passenger: PassengerInfo,
    pub vehicle_id: Option<String>,
    pub special_instructions: Option<String>,
    /// Replaces the snapshot's stops when present.
    pub extra_stops: Option<Vec<ExtraStop>>,
    pub dynamic_rates: IndexMap<String, String>,
    pub tax_is_percent: HashMap<String, bool>,
    /// Pickup or dropoff moved; distance and duration must come from `recalculated_route`.
    pub has_location_changed: bool,
    pub recalculated_route: Option<RouteEstimate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leg_merge_prefers_edits_and_keeps_the_rest() {
        let base = LegSnapshot {
            address: Some("1 Old Rd".to_string()),
            coordinate: Some(Coordinate::new(1.0, 2.0)),
            flight_number: Some("B6 101".to_string()),
            ..Default::default()
        };
        let edit = LegEdit {
            address: Some("2 New Rd".to_string()),
            ..Default::default()
        };

        let merged = base.merged_with(&edit);
        assert_eq!(merged.address.as_deref(), Some("2 New Rd"));
        assert_eq!(merged.coordinate, Some(Coordinate::new(1.0, 2.0)));
        assert_eq!(merged.flight_number.as_deref(), Some("B6 101"));
    }

    #[test]
    fn snapshot_deserializes_with_missing_sections() {
        let snapshot: BookingSnapshot =
            serde_json::from_str(r#"{"reservationId":"R-1","pickup":{"address":"A"}}"#)
                .expect("snapshot");
        assert_eq!(snapshot.reservation_id.as_deref(), Some("R-1"));
        assert_eq!(snapshot.pickup.address.as_deref(), Some("A"));
        assert!(snapshot.extra_stops.is_empty());
        assert!(snapshot.rates.all_inclusive_rates.is_empty());
    }
}
