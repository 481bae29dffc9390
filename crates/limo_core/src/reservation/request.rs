use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::transfer::{LegKind, TransferType};
use crate::rates::ServiceType;

/// Fully-populated body for the reservation edit/finalize endpoint.
///
/// Every field has a concrete value; ids that could not be resolved are
/// serialized as explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationEditRequest {
    pub reservation_id: String,
    pub service_type: ServiceType,
    pub transfer_type: TransferType,
    pub number_of_hours: u32,
    pub number_of_vehicles: u32,
    pub pickup_date: String,
    pub pickup_time: String,
    pub pickup: LegPayload,
    pub dropoff: LegPayload,
    pub extra_stops: Vec<ExtraStopPayload>,
    pub passenger: PassengerPayload,
    pub vehicle_id: String,
    pub account_type: String,
    pub affiliate_id: String,
    pub reservation_type: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub special_instructions: String,
    pub rates: RatePayload,
    /// Non-fatal problems found while building; not part of the wire body.
    #[serde(skip)]
    pub warnings: Vec<PayloadWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegPayload {
    pub kind: LegKind,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub airport_id: Option<String>,
    pub airport_name: String,
    pub airline_id: Option<String>,
    pub airline_name: String,
    pub flight_number: String,
    pub cruise_port: String,
    pub cruise_ship: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtraStopPayload {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rate: f64,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassengerPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub count: u32,
    pub luggage_count: u32,
}

/// A schedule line as submitted: the effective value after user overrides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateLinePayload {
    pub label: String,
    pub base_rate: f64,
    pub multiple: f64,
    pub percentage: f64,
    pub amount: f64,
    #[serde(rename = "type")]
    pub rate_type: String,
    pub is_percent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatePayload {
    pub all_inclusive_rates: IndexMap<String, RateLinePayload>,
    pub taxes: IndexMap<String, RateLinePayload>,
    pub amenities: IndexMap<String, RateLinePayload>,
    pub misc: IndexMap<String, RateLinePayload>,
    pub base_rate: f64,
    pub sub_total: f64,
    pub grand_total: f64,
    pub admin_share_percentage: f64,
    pub admin_share: f64,
    pub deducted_admin_share: f64,
    pub affiliate_share: f64,
    pub stripe_fee: f64,
    pub extra_gratuity_share: f64,
    pub travel_agent_share: f64,
    pub farmout_share: f64,
}

/// Non-fatal findings; the caller decides which ones block submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadWarning {
    /// A display name matched no reference entry and was sent as a placeholder.
    UnresolvedLookup {
        field: &'static str,
        display_name: String,
    },
    /// A free-text label did not map onto a known value; a default was used.
    UnrecognizedLabel { field: &'static str, label: String },
    /// Locations changed but no recalculated route was supplied.
    RouteNotRecalculated,
}

impl fmt::Display for PayloadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadWarning::UnresolvedLookup {
                field,
                display_name,
            } => write!(f, "{field}: no reference entry matches \"{display_name}\""),
            PayloadWarning::UnrecognizedLabel { field, label } => {
                write!(f, "{field}: unrecognized label \"{label}\"")
            }
            PayloadWarning::RouteNotRecalculated => {
                f.write_str("locations changed but distance and duration were not recalculated")
            }
        }
    }
}

impl ReservationEditRequest {
    /// True when the lookup for `field` (e.g. `"dropoff.airport"`) fell back to a placeholder.
    pub fn unresolved(&self, field: &str) -> bool {
        self.warnings.iter().any(|warning| {
            matches!(warning, PayloadWarning::UnresolvedLookup { field: f, .. } if *f == field)
        })
    }
}
