#![allow(dead_code)]

use limo_core::rates::{RateComputationResult, RateItem, RateSchedule};
use limo_core::reservation::{BookingSnapshot, LegSnapshot, UserEditSet};
use limo_core::test_helpers::{test_snapshot, LOGAN_AIRPORT};

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Totals invariant that must hold for every computation.
pub fn assert_totals_consistent(result: &RateComputationResult, vehicles: u32) {
    assert_close(result.grand_total, result.sub_total * f64::from(vehicles));
    assert_close(result.shares.grand_total, result.grand_total);
    assert_close(
        result.shares.stripe_fee,
        result.grand_total * 0.05 + 0.30,
    );
    let intermediary = result
        .shares
        .travel_agent_share
        .or(result.shares.farmout_share)
        .unwrap_or(0.0);
    assert_close(
        result.shares.affiliate_share,
        result.grand_total
            - result.shares.admin_share
            - result.shares.extra_gratuity_share
            - intermediary,
    );
}

pub fn schedule_with(lines: &[(&str, f64)]) -> RateSchedule {
    let mut schedule = RateSchedule::default();
    for (key, value) in lines {
        schedule
            .all_inclusive_rates
            .insert((*key).to_string(), RateItem::with_base_rate(*key, *value));
    }
    schedule
}

/// Airport pickup at Logan with the given airport and airline display names.
pub fn airport_pickup_snapshot(airport: &str, airline: &str) -> BookingSnapshot {
    BookingSnapshot {
        transfer_type: Some("Airport To City".to_string()),
        pickup: LegSnapshot {
            airport_name: Some(airport.to_string()),
            airline_name: Some(airline.to_string()),
            flight_number: Some("B6 1234".to_string()),
            coordinate: Some(LOGAN_AIRPORT),
            ..Default::default()
        },
        ..test_snapshot()
    }
}

pub fn no_edits() -> UserEditSet {
    UserEditSet::default()
}
