mod support;

use limo_core::geo::Coordinate;
use limo_core::rates::{RatePolicy, ServiceType, BASE_RATE_KEY};
use limo_core::reservation::{
    build, ExtraStop, LegEdit, LegKind, PayloadWarning, ReservationPayloadBuilder, RouteEstimate,
    TransferType, UserEditSet,
};
use limo_core::test_helpers::{test_lookups, test_snapshot, LOGAN_AIRPORT};
use support::{airport_pickup_snapshot, assert_close, no_edits};

#[test]
fn unedited_snapshot_builds_complete_request() {
    let request = build(&test_snapshot(), &no_edits(), &test_lookups()).expect("request");

    assert_eq!(request.reservation_id, "R-1001");
    assert_eq!(request.service_type, ServiceType::OneWay);
    assert_eq!(request.transfer_type, TransferType::CityToCity);
    assert_eq!(request.number_of_hours, 0);
    assert_eq!(request.number_of_vehicles, 1);
    assert_eq!(request.pickup.kind, LegKind::Address);
    assert_eq!(request.pickup.address, "139 Tremont St, Boston, MA 02111");
    assert_eq!(request.distance_meters, 1_400.0);
    assert_eq!(request.rates.all_inclusive_rates.len(), 1);
    assert_close(request.rates.grand_total, 170.75);
    assert!(request.warnings.is_empty());
}

#[test]
fn build_is_idempotent() {
    let snapshot = test_snapshot();
    let edits = UserEditSet {
        number_of_vehicles: Some(2),
        ..Default::default()
    };
    let lookups = test_lookups();
    assert_eq!(
        build(&snapshot, &edits, &lookups),
        build(&snapshot, &edits, &lookups)
    );
}

#[test]
fn airport_pickup_resolves_by_code_and_uses_airport_coordinate() {
    let mut snapshot = airport_pickup_snapshot("Logan (BOS)", "B6");
    snapshot.pickup.coordinate = None;
    let request = build(&snapshot, &no_edits(), &test_lookups()).expect("request");

    assert_eq!(request.pickup.kind, LegKind::Airport);
    assert_eq!(request.pickup.airport_id.as_deref(), Some("apt-bos"));
    assert_eq!(request.pickup.airline_id.as_deref(), Some("al-b6"));
    assert_eq!(request.pickup.airline_name, "JetBlue Airways");
    assert_eq!(request.pickup.flight_number, "B6 1234");
    assert_eq!(request.pickup.latitude, LOGAN_AIRPORT.lat);
    assert!(!request.unresolved("pickup.airport"));
}

#[test]
fn unknown_airport_becomes_placeholder_with_warning() {
    let snapshot = airport_pickup_snapshot("Hanscom Field", "Delta");
    let request = build(&snapshot, &no_edits(), &test_lookups()).expect("request");

    assert_eq!(request.pickup.airport_id, None);
    assert_eq!(request.pickup.airport_name, "Hanscom Field");
    assert!(request.unresolved("pickup.airport"));
    assert_eq!(request.pickup.airline_id.as_deref(), Some("al-dl"));
    assert!(!request.unresolved("pickup.airline"));

    let json = serde_json::to_value(&request).expect("json");
    assert!(json["pickup"]["airport_id"].is_null());
    assert!(json.get("warnings").is_none());
}

#[test]
fn edited_leg_overrides_snapshot_fields() {
    let snapshot = airport_pickup_snapshot("BOS", "B6");
    let edits = UserEditSet {
        pickup: LegEdit {
            airline_name: Some("Delta Air Lines".to_string()),
            flight_number: Some("DL 88".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let request = build(&snapshot, &edits, &test_lookups()).expect("request");

    assert_eq!(request.pickup.airport_id.as_deref(), Some("apt-bos"));
    assert_eq!(request.pickup.airline_id.as_deref(), Some("al-dl"));
    assert_eq!(request.pickup.flight_number, "DL 88");
}

#[test]
fn changing_transfer_type_switches_leg_kinds() {
    let edits = UserEditSet {
        transfer_type: Some("City to Cruise Port".to_string()),
        dropoff: LegEdit {
            cruise_port: Some("Flynn Cruiseport Boston".to_string()),
            cruise_ship: Some("Norwegian Gem".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let request = build(&test_snapshot(), &edits, &test_lookups()).expect("request");

    assert_eq!(request.transfer_type, TransferType::CityToCruisePort);
    assert_eq!(request.dropoff.kind, LegKind::CruisePort);
    assert_eq!(request.dropoff.cruise_port, "Flynn Cruiseport Boston");
    assert_eq!(request.dropoff.cruise_ship, "Norwegian Gem");
}

#[test]
fn charter_edits_flow_into_rates() {
    let edits = UserEditSet {
        service_type: Some("Hourly Charter".to_string()),
        number_of_hours: Some(3),
        ..Default::default()
    };
    let request = build(&test_snapshot(), &edits, &test_lookups()).expect("request");

    assert_eq!(request.number_of_hours, 3);
    // base 300 + 11.25 taxes + 10 amenity + 24.5 misc
    assert_close(request.rates.base_rate, 345.75);
    assert_close(request.rates.admin_share, 75.0);
}

#[test]
fn dynamic_rate_edits_appear_in_submitted_lines() {
    let mut edits = UserEditSet::default();
    edits
        .dynamic_rates
        .insert(BASE_RATE_KEY.to_string(), "150".to_string());
    edits.tax_is_percent.insert("State_Tax".to_string(), true);
    let request = build(&test_snapshot(), &edits, &test_lookups()).expect("request");

    assert_close(request.rates.all_inclusive_rates[BASE_RATE_KEY].base_rate, 150.0);
    assert!(request.rates.taxes["State_Tax"].is_percent);
    assert!(!request.rates.taxes["Airport_Fee"].is_percent);
    // 150 + 150 * 6.25% + 5 + 10 + 24.5
    assert_close(request.rates.base_rate, 150.0 + 9.375 + 5.0 + 10.0 + 24.5);
}

#[test]
fn relocated_trip_takes_recalculated_route() {
    let edits = UserEditSet {
        dropoff: LegEdit {
            address: Some("1 Harborside Dr, Boston, MA".to_string()),
            coordinate: Some(LOGAN_AIRPORT),
            ..Default::default()
        },
        has_location_changed: true,
        recalculated_route: Some(RouteEstimate {
            distance_m: 6_200.0,
            duration_secs: 780.0,
        }),
        ..Default::default()
    };
    let request = build(&test_snapshot(), &edits, &test_lookups()).expect("request");

    assert_eq!(request.dropoff.address, "1 Harborside Dr, Boston, MA");
    assert_eq!(request.distance_meters, 6_200.0);
    assert_eq!(request.duration_seconds, 780.0);
    assert!(!request.warnings.contains(&PayloadWarning::RouteNotRecalculated));
}

#[test]
fn extra_stops_carry_coordinates_and_rates() {
    let edits = UserEditSet {
        extra_stops: Some(vec![ExtraStop {
            address: "Quincy Market, Boston, MA".to_string(),
            coordinate: Some(Coordinate::new(42.360_1, -71.054_9)),
            rate: Some(25.0),
            instructions: Some("Wait 10 min".to_string()),
        }]),
        ..Default::default()
    };
    let request = build(&test_snapshot(), &edits, &test_lookups()).expect("request");

    assert_eq!(request.extra_stops.len(), 1);
    assert_eq!(request.extra_stops[0].rate, 25.0);
    assert_eq!(request.extra_stops[0].instructions, "Wait 10 min");
}

#[test]
fn custom_policy_is_applied() {
    let policy = RatePolicy {
        admin_share: 0.30,
        ..Default::default()
    };
    let lookups = test_lookups();
    let request = ReservationPayloadBuilder::new(&lookups)
        .with_policy(policy)
        .build(&test_snapshot(), &no_edits())
        .expect("request");
    assert_close(request.rates.admin_share_percentage, 0.30);
    assert_close(request.rates.admin_share, 30.0);
}
