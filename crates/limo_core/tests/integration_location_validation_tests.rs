use limo_core::geo::Coordinate;
use limo_core::location::{
    are_locations_same, extract_country, location_conflict_reason, normalize_country,
    validate_extra_stop, LocationEndpoint, COUNTRY_MISMATCH_MESSAGE, SAME_LOCATION_MESSAGE,
    STOP_COUNTRY_UNRESOLVED_MESSAGE, STOP_SAME_AS_DROPOFF_MESSAGE,
};
use limo_core::reservation::TransferType;
use limo_core::test_helpers::{BOSTON_COMMON, LOGAN_AIRPORT, SOUTH_STATION};

fn boston(text: &str, coordinate: Coordinate) -> LocationEndpoint {
    LocationEndpoint::new(text, Some(coordinate))
}

#[test]
fn country_samples_normalize_consistently() {
    for raw in ["USA", "United States", "US", "MA", "u.s.a."] {
        assert_eq!(normalize_country(raw).as_deref(), Some("UNITEDSTATES"), "{raw}");
    }
    for raw in ["Canada", "CA", "ON", "QC"] {
        assert_eq!(normalize_country(raw).as_deref(), Some("CANADA"), "{raw}");
    }
    assert_eq!(
        extract_country("Rua Augusta 100, Lisboa, Portugal").as_deref(),
        Some("PORTUGAL")
    );
}

#[test]
fn same_address_with_different_formatting() {
    assert!(are_locations_same(
        "123 Main St, Boston",
        "123 MAIN ST BOSTON",
        None,
        None
    ));
}

#[test]
fn distinct_boston_endpoints_are_valid() {
    let pickup = boston("139 Tremont St, Boston, MA 02111", BOSTON_COMMON);
    let dropoff = boston("700 Atlantic Ave, Boston, MA 02110", SOUTH_STATION);
    assert_eq!(
        location_conflict_reason(&pickup, &dropoff, TransferType::CityToCity),
        None
    );
}

#[test]
fn neighbouring_cities_without_country_are_valid() {
    let pickup = LocationEndpoint::new("123 Main St, Boston", None);
    let dropoff = LocationEndpoint::new("1 Elm St, Cambridge", None);
    assert_eq!(
        location_conflict_reason(&pickup, &dropoff, TransferType::CityToCity),
        None
    );
}

#[test]
fn same_coordinates_with_different_text_conflict() {
    let pickup = boston("South Station", SOUTH_STATION);
    let dropoff = boston("700 Atlantic Ave", SOUTH_STATION);
    assert_eq!(
        location_conflict_reason(&pickup, &dropoff, TransferType::CityToCity).as_deref(),
        Some(SAME_LOCATION_MESSAGE)
    );
}

#[test]
fn cross_border_city_transfer_is_rejected() {
    let pickup = boston("139 Tremont St, Boston, MA 02111, USA", BOSTON_COMMON);
    let dropoff = LocationEndpoint::new(
        "290 Bremner Blvd, Toronto, ON M5V 3L9, Canada",
        Some(Coordinate::new(43.642_6, -79.387_1)),
    );
    assert_eq!(
        location_conflict_reason(&pickup, &dropoff, TransferType::CityToCity).as_deref(),
        Some(COUNTRY_MISMATCH_MESSAGE)
    );
}

#[test]
fn geocoder_country_wins_over_address_text() {
    let pickup = boston("Somewhere", BOSTON_COMMON).with_country("United States");
    let dropoff = boston("Terminal E", LOGAN_AIRPORT).with_airport_country("US");
    assert_eq!(
        location_conflict_reason(&pickup, &dropoff, TransferType::CityToAirport),
        None
    );
}

#[test]
fn stop_near_dropoff_is_duplicate() {
    let pickup = boston("139 Tremont St, Boston, MA", BOSTON_COMMON);
    let dropoff = boston("Logan Airport, Boston, MA", LOGAN_AIRPORT);
    // ~110 m north of the dropoff
    let stop = boston(
        "Harborside Dr, Boston, MA",
        LOGAN_AIRPORT.offset_m(110.0, 0.0),
    );
    assert_eq!(
        validate_extra_stop(&stop, &pickup, &dropoff, TransferType::CityToCity, false).as_deref(),
        Some(STOP_SAME_AS_DROPOFF_MESSAGE)
    );
}

#[test]
fn valid_stop_passes_submit_validation() {
    let pickup = boston("139 Tremont St, Boston, MA", BOSTON_COMMON);
    let dropoff = boston("Logan Airport, Boston, MA", LOGAN_AIRPORT);
    let stop = boston(
        "4 Yawkey Way, Boston, MA 02215",
        Coordinate::new(42.346_7, -71.097_2),
    );
    assert_eq!(
        validate_extra_stop(&stop, &pickup, &dropoff, TransferType::CityToCity, true),
        None
    );
}

#[test]
fn blank_stop_is_ignored_and_vague_stop_fails_on_submit() {
    let pickup = boston("139 Tremont St, Boston, MA", BOSTON_COMMON);
    let dropoff = boston("Logan Airport, Boston, MA", LOGAN_AIRPORT);
    let blank = LocationEndpoint::new("   ", None);
    assert_eq!(
        validate_extra_stop(&blank, &pickup, &dropoff, TransferType::CityToCity, true),
        None
    );

    let vague = LocationEndpoint::new("Fenway", None);
    assert_eq!(
        validate_extra_stop(&vague, &pickup, &dropoff, TransferType::CityToCity, true).as_deref(),
        Some(STOP_COUNTRY_UNRESOLVED_MESSAGE)
    );
}
