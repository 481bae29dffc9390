use crate::geo::Coordinate;
use crate::labels::compact_key;
use crate::reservation::{LegKind, TransferType};

use super::country::{extract_country, normalize_country};

/// Pickup and dropoff closer than this (degrees, per axis) are the same place (~1 m).
pub const SAME_LOCATION_TOLERANCE_DEG: f64 = 0.000_01;

/// Extra stops closer than this (degrees, per axis) to an endpoint duplicate it (~200 m).
pub const EXTRA_STOP_TOLERANCE_DEG: f64 = 0.002;

pub const SAME_LOCATION_MESSAGE: &str = "Pickup and drop-off locations cannot be the same.";
pub const COUNTRY_MISMATCH_MESSAGE: &str =
    "Pickup and drop-off locations must be in the same country.";
pub const STOP_SAME_AS_PICKUP_MESSAGE: &str =
    "Extra stop cannot be the same as the pickup location.";
pub const STOP_SAME_AS_DROPOFF_MESSAGE: &str =
    "Extra stop cannot be the same as the drop-off location.";
pub const STOP_COUNTRY_MISMATCH_MESSAGE: &str =
    "Extra stops must be in the same country as the pickup and drop-off locations.";
pub const STOP_COUNTRY_UNRESOLVED_MESSAGE: &str =
    "Unable to verify the country of this extra stop. Please choose a more specific address.";
pub const PICKUP_COUNTRY_UNRESOLVED_MESSAGE: &str =
    "Unable to verify the country of the pickup location. Please choose a more specific address.";
pub const DROPOFF_COUNTRY_UNRESOLVED_MESSAGE: &str =
    "Unable to verify the country of the drop-off location. Please choose a more specific address.";

/// A location as entered on the booking form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationEndpoint {
    /// Address or display name as typed / selected.
    pub text: String,
    pub coordinate: Option<Coordinate>,
    /// Country reported by the geocoder, if any.
    pub country: Option<String>,
    /// Country of the selected airport, for airport legs.
    pub airport_country: Option<String>,
}

impl LocationEndpoint {
    pub fn new(text: impl Into<String>, coordinate: Option<Coordinate>) -> Self {
        Self {
            text: text.into(),
            coordinate,
            ..Default::default()
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_airport_country(mut self, country: impl Into<String>) -> Self {
        self.airport_country = Some(country.into());
        self
    }

    /// Country token for this endpoint when it plays the role `kind`.
    pub fn resolved_country(&self, kind: LegKind) -> Option<String> {
        match kind {
            LegKind::Airport => self.airport_country.as_deref().and_then(normalize_country),
            LegKind::Address | LegKind::CruisePort => self
                .country
                .as_deref()
                .and_then(normalize_country)
                .or_else(|| extract_country(&self.text)),
        }
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty() && self.coordinate.is_none()
    }
}

/// Same place if the coordinates agree within ~1 m, or the normalized text matches.
pub fn are_locations_same(
    text_a: &str,
    text_b: &str,
    coord_a: Option<Coordinate>,
    coord_b: Option<Coordinate>,
) -> bool {
    same_within(text_a, text_b, coord_a, coord_b, SAME_LOCATION_TOLERANCE_DEG)
}

fn same_within(
    text_a: &str,
    text_b: &str,
    coord_a: Option<Coordinate>,
    coord_b: Option<Coordinate>,
    tolerance_deg: f64,
) -> bool {
    if let (Some(a), Some(b)) = (coord_a, coord_b) {
        if a.within_degrees(b, tolerance_deg) {
            return true;
        }
    }
    let (a, b) = (compact_key(text_a), compact_key(text_b));
    !a.is_empty() && a == b
}

/// Why this pickup/dropoff pair cannot be booked, or `None` when it can.
pub fn location_conflict_reason(
    pickup: &LocationEndpoint,
    dropoff: &LocationEndpoint,
    transfer_type: TransferType,
) -> Option<String> {
    if pickup.is_blank() || dropoff.is_blank() {
        return None;
    }
    if are_locations_same(&pickup.text, &dropoff.text, pickup.coordinate, dropoff.coordinate) {
        return Some(SAME_LOCATION_MESSAGE.to_string());
    }

    let (pickup_kind, dropoff_kind) = transfer_type.legs();
    match (
        pickup.resolved_country(pickup_kind),
        dropoff.resolved_country(dropoff_kind),
    ) {
        (Some(from), Some(to)) if from != to => Some(COUNTRY_MISMATCH_MESSAGE.to_string()),
        _ => None,
    }
}

/// Validate one extra stop against the booking's endpoints.
///
/// While the user is still typing (`is_performing_submit_validation == false`)
/// an unresolved country is tolerated; on submit it is an error.
pub fn validate_extra_stop(
    stop: &LocationEndpoint,
    pickup: &LocationEndpoint,
    dropoff: &LocationEndpoint,
    transfer_type: TransferType,
    is_performing_submit_validation: bool,
) -> Option<String> {
    if stop.text.trim().is_empty() {
        return None;
    }

    if same_within(
        &stop.text,
        &pickup.text,
        stop.coordinate,
        pickup.coordinate,
        EXTRA_STOP_TOLERANCE_DEG,
    ) {
        return Some(STOP_SAME_AS_PICKUP_MESSAGE.to_string());
    }
    if same_within(
        &stop.text,
        &dropoff.text,
        stop.coordinate,
        dropoff.coordinate,
        EXTRA_STOP_TOLERANCE_DEG,
    ) {
        return Some(STOP_SAME_AS_DROPOFF_MESSAGE.to_string());
    }

    let (pickup_kind, dropoff_kind) = transfer_type.legs();
    let countries = (
        stop.resolved_country(LegKind::Address),
        pickup.resolved_country(pickup_kind),
        dropoff.resolved_country(dropoff_kind),
    );
    match countries {
        (Some(stop_country), Some(from), Some(to)) => {
            (stop_country != from || stop_country != to)
                .then(|| STOP_COUNTRY_MISMATCH_MESSAGE.to_string())
        }
        _ if !is_performing_submit_validation => None,
        (None, _, _) => Some(STOP_COUNTRY_UNRESOLVED_MESSAGE.to_string()),
        (_, None, _) => Some(PICKUP_COUNTRY_UNRESOLVED_MESSAGE.to_string()),
        (_, _, None) => Some(DROPOFF_COUNTRY_UNRESOLVED_MESSAGE.to_string()),
    }
}
