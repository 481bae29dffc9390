//! Fare and share computation.
//!
//! Pure functions: the same schedule and input always produce bit-identical
//! results. Nothing is rounded here; see [`super::format`] for display.

use serde::{Deserialize, Serialize};

use super::{
    parse_amount, RateComputationInput, RateComputationResult, RateGroup, RateItem, ServiceType,
    ShareBreakdown,
};
use crate::labels::{canonical_label, compact_key};

/// Canonical key of the hourly-scaled base rate line.
pub const BASE_RATE_KEY: &str = "Base_Rate";

/// Misc key whose `amount` carries the extra gratuity.
pub const EXTRA_GRATUITY_KEY: &str = "Extra_Gratuity";

const TRAVEL_PLANNER_ACCOUNT: &str = "travel_planner";
const FARMOUT_RESERVATION: &str = "farmout";

/// Percentages and fees applied on top of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatePolicy {
    /// Admin share for regular bookings.
    pub admin_share: f64,
    /// Admin share for farmout and travel-planner bookings.
    pub reduced_admin_share: f64,
    /// Share paid to the travel agent or farmout partner.
    pub intermediary_share: f64,
    /// Portion of the extra gratuity retained by the platform.
    pub extra_gratuity_share: f64,
    /// Card-processing percentage fee.
    pub card_fee_rate: f64,
    /// Card-processing flat fee per charge.
    pub card_fee_flat: f64,
    /// `createdBy` id of platform-created bookings.
    pub platform_creator_id: i64,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            admin_share: 0.25,
            reduced_admin_share: 0.15,
            intermediary_share: 0.10,
            extra_gratuity_share: 0.25,
            card_fee_rate: 0.05,
            card_fee_flat: 0.30,
            platform_creator_id: 1,
        }
    }
}

/// Which party, if any, sits between the platform and the affiliate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShareCase {
    Standard,
    TravelPlanner,
    Farmout,
}

impl ShareCase {
    /// Farmout wins when both gates hold, so at most one intermediary share exists.
    fn classify(input: &RateComputationInput, policy: &RatePolicy) -> ShareCase {
        if canonical_label(&input.reservation_type) == FARMOUT_RESERVATION {
            ShareCase::Farmout
        } else if canonical_label(&input.account_type) == TRAVEL_PLANNER_ACCOUNT
            && input.created_by != Some(policy.platform_creator_id)
        {
            ShareCase::TravelPlanner
        } else {
            ShareCase::Standard
        }
    }
}

/// Compute totals and shares with the default [`RatePolicy`].
pub fn compute(
    schedule: &super::RateSchedule,
    input: &RateComputationInput,
) -> RateComputationResult {
    compute_with_policy(schedule, input, &RatePolicy::default())
}

/// Compute totals and shares.
///
/// 1. All-inclusive lines are summed; for charters the base-rate line is
///    multiplied by the hour count.
/// 2. Taxes, amenities and misc are added unscaled.
/// 3. The admin share is a percentage of the all-inclusive sum only.
/// 4. Farmout / travel-planner bookings add an intermediary share.
/// 5. The subtotal is multiplied by the vehicle count.
pub fn compute_with_policy(
    schedule: &super::RateSchedule,
    input: &RateComputationInput,
    policy: &RatePolicy,
) -> RateComputationResult {
    let hours = hour_multiplier(input);

    let all_inclusive = sum_all_inclusive(&schedule.all_inclusive_rates, input, hours);
    let taxes = sum_taxes(&schedule.taxes, input, all_inclusive);
    let amenities = sum_group(&schedule.amenities, input);
    let misc = sum_group(&schedule.misc, input);
    let total_baserates = all_inclusive + taxes + amenities + misc;

    let admin_share_baserates = all_inclusive;
    let case = ShareCase::classify(input, policy);
    let admin_share_percentage = match case {
        ShareCase::Standard => policy.admin_share,
        ShareCase::TravelPlanner | ShareCase::Farmout => policy.reduced_admin_share,
    };
    let admin_share = admin_share_baserates * admin_share_percentage;

    let intermediary = admin_share_baserates * policy.intermediary_share;
    let (travel_agent_share, farmout_share) = match case {
        ShareCase::Standard => (None, None),
        ShareCase::TravelPlanner => (Some(intermediary), None),
        ShareCase::Farmout => (None, Some(intermediary)),
    };
    let intermediary_total = travel_agent_share.or(farmout_share).unwrap_or(0.0);

    let sub_total = total_baserates + admin_share + intermediary_total;
    let grand_total = sub_total * f64::from(input.number_of_vehicles);

    let extra_gratuity_share = schedule
        .misc
        .get(EXTRA_GRATUITY_KEY)
        .map_or(0.0, |item| item.amount)
        * policy.extra_gratuity_share;
    let affiliate_share = grand_total - admin_share - extra_gratuity_share - intermediary_total;

    let stripe_fee = grand_total * policy.card_fee_rate + policy.card_fee_flat;
    let deducted_admin_share = admin_share - stripe_fee;

    RateComputationResult {
        base_rate: total_baserates,
        admin_share_baserates,
        admin_share_percentage,
        sub_total,
        grand_total,
        shares: ShareBreakdown {
            base_rate: total_baserates,
            grand_total,
            stripe_fee,
            admin_share,
            deducted_admin_share,
            affiliate_share,
            extra_gratuity_share,
            travel_agent_share,
            farmout_share,
        },
    }
}

/// True for keys that name the hourly base rate (`"Base_Rate"`, `"base rate"`, ...).
pub fn is_base_rate_key(key: &str) -> bool {
    compact_key(key) == compact_key(BASE_RATE_KEY)
}

/// The value a line contributes before scaling: a numeric user override when
/// present, otherwise the schedule's base rate.
pub fn effective_rate(key: &str, item: &RateItem, input: &RateComputationInput) -> f64 {
    input
        .dynamic_rates
        .get(key)
        .and_then(|raw| parse_amount(raw))
        .unwrap_or(item.base_rate)
}

fn hour_multiplier(input: &RateComputationInput) -> Option<f64> {
    match input.service_type {
        ServiceType::CharterTour => Some(input.number_of_hours.unwrap_or(0).max(0) as f64),
        ServiceType::OneWay => None,
    }
}

fn sum_all_inclusive(group: &RateGroup, input: &RateComputationInput, hours: Option<f64>) -> f64 {
    group
        .iter()
        .map(|(key, item)| {
            let value = effective_rate(key, item, input);
            match hours {
                Some(hours) if is_base_rate_key(key) => value * hours,
                _ => value,
            }
        })
        .sum()
}

fn sum_taxes(group: &RateGroup, input: &RateComputationInput, all_inclusive: f64) -> f64 {
    group
        .iter()
        .map(|(key, item)| {
            let value = effective_rate(key, item, input);
            if input.tax_is_percent.get(key).copied().unwrap_or(false) {
                all_inclusive * value / 100.0
            } else {
                value
            }
        })
        .sum()
}

fn sum_group(group: &RateGroup, input: &RateComputationInput) -> f64 {
    group
        .iter()
        .map(|(key, item)| effective_rate(key, item, input))
        .sum()
}
