pub mod error;
pub mod geo;
pub mod labels;
pub mod location;
pub mod rates;
pub mod reservation;
pub mod routing;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
