//! Pickup, dropoff and extra-stop validation for the booking form.

pub mod country;
pub mod validation;

pub use country::{extract_country, normalize_country};
pub use validation::{
    are_locations_same, location_conflict_reason, validate_extra_stop, LocationEndpoint,
    COUNTRY_MISMATCH_MESSAGE, DROPOFF_COUNTRY_UNRESOLVED_MESSAGE, EXTRA_STOP_TOLERANCE_DEG,
    PICKUP_COUNTRY_UNRESOLVED_MESSAGE, SAME_LOCATION_MESSAGE,
    SAME_LOCATION_TOLERANCE_DEG, STOP_COUNTRY_MISMATCH_MESSAGE, STOP_COUNTRY_UNRESOLVED_MESSAGE,
    STOP_SAME_AS_DROPOFF_MESSAGE, STOP_SAME_AS_PICKUP_MESSAGE,
};
