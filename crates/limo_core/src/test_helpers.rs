//! Shared fixtures for unit tests, integration tests and benchmarks.
//!
//! Coordinates are around downtown Boston so distances stay realistic.

use crate::geo::Coordinate;
use crate::rates::{RateItem, RateSchedule, BASE_RATE_KEY, EXTRA_GRATUITY_KEY};
use crate::reservation::{AirlineOption, AirportOption, BookingSnapshot, LegSnapshot, ReferenceLookups};

pub const BOSTON_COMMON: Coordinate = Coordinate::new(42.355_1, -71.065_6);
pub const SOUTH_STATION: Coordinate = Coordinate::new(42.352_3, -71.055_2);
pub const LOGAN_AIRPORT: Coordinate = Coordinate::new(42.365_6, -71.009_6);

/// A short east-bound street polyline, roughly 1 km long.
pub fn test_polyline() -> Vec<Coordinate> {
    (0..=10)
        .map(|step| BOSTON_COMMON.offset_m(0.0, f64::from(step) * 100.0))
        .collect()
}

/// Schedule with a single base rate line.
pub fn base_rate_schedule(base: f64) -> RateSchedule {
    let mut schedule = RateSchedule::default();
    schedule.all_inclusive_rates.insert(
        BASE_RATE_KEY.to_string(),
        RateItem::with_base_rate("Base Rate", base),
    );
    schedule
}

/// Base rate 100, two taxes, a child seat, tolls and a 20.00 extra gratuity.
pub fn full_schedule() -> RateSchedule {
    let mut schedule = base_rate_schedule(100.0);
    schedule.taxes.insert(
        "State_Tax".to_string(),
        RateItem::with_base_rate("State Tax", 6.25),
    );
    schedule.taxes.insert(
        "Airport_Fee".to_string(),
        RateItem::with_base_rate("Airport Fee", 5.0),
    );
    schedule.amenities.insert(
        "Child_Seat".to_string(),
        RateItem::with_base_rate("Child Seat", 10.0),
    );
    schedule
        .misc
        .insert("Tolls".to_string(), RateItem::with_base_rate("Tolls", 4.5));
    schedule.misc.insert(
        EXTRA_GRATUITY_KEY.to_string(),
        RateItem {
            amount: 20.0,
            ..RateItem::with_base_rate("Extra Gratuity", 20.0)
        },
    );
    schedule
}

pub fn test_lookups() -> ReferenceLookups {
    ReferenceLookups {
        airports: vec![
            AirportOption {
                id: Some("apt-bos".to_string()),
                code: Some("BOS".to_string()),
                name: "Boston Logan International Airport (BOS)".to_string(),
                country: Some("US".to_string()),
                coordinate: Some(LOGAN_AIRPORT),
            },
            AirportOption {
                id: Some("apt-yyz".to_string()),
                code: Some("YYZ".to_string()),
                name: "Toronto Pearson International Airport (YYZ)".to_string(),
                country: Some("CA".to_string()),
                coordinate: Some(Coordinate::new(43.677_7, -79.624_8)),
            },
        ],
        airlines: vec![
            AirlineOption {
                id: Some("al-b6".to_string()),
                code: Some("B6".to_string()),
                name: "JetBlue Airways".to_string(),
            },
            AirlineOption {
                id: Some("al-dl".to_string()),
                code: Some("DL".to_string()),
                name: "Delta Air Lines".to_string(),
            },
        ],
    }
}

/// One-way city-to-city booking from Boston Common to South Station.
pub fn test_snapshot() -> BookingSnapshot {
    BookingSnapshot {
        reservation_id: Some("R-1001".to_string()),
        service_type: Some("One Way".to_string()),
        transfer_type: Some("City To City".to_string()),
        pickup: LegSnapshot {
            address: Some("139 Tremont St, Boston, MA 02111".to_string()),
            coordinate: Some(BOSTON_COMMON),
            ..Default::default()
        },
        dropoff: LegSnapshot {
            address: Some("700 Atlantic Ave, Boston, MA 02110".to_string()),
            coordinate: Some(SOUTH_STATION),
            ..Default::default()
        },
        pickup_date: Some("2026-11-02".to_string()),
        pickup_time: Some("09:30".to_string()),
        number_of_vehicles: Some(1),
        account_type: Some("individual".to_string()),
        created_by: Some(42),
        affiliate_id: Some("aff-7".to_string()),
        reservation_type: Some("standard".to_string()),
        distance_meters: Some(1_400.0),
        duration_seconds: Some(420.0),
        status: Some("pending".to_string()),
        rates: full_schedule(),
        ..Default::default()
    }
}
