//! Rate schedules and the fare/share computation engine.
//!
//! A [`RateSchedule`] is the server-provided price sheet for one booking. The
//! engine in [`engine`] turns it into totals and the split between the
//! platform, the affiliate operator and any intermediary.

pub mod engine;
pub mod format;

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::labels::canonical_label;

pub use engine::{compute, compute_with_policy, RatePolicy, BASE_RATE_KEY, EXTRA_GRATUITY_KEY};
pub use format::{format_amount, truncate_to_cents};

/// Accepts numbers, numeric strings and `null`; anything unparseable is 0.0.
fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(de)? {
        Some(Raw::Number(value)) => value,
        Some(Raw::Text(text)) => parse_amount(&text).unwrap_or(0.0),
        None => 0.0,
    })
}

/// Parse a user-entered amount such as `"1,250.50"` or `"$80"`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | ' '))
        .collect();
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// One priced line of a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateItem {
    pub label: String,
    #[serde(alias = "baserate", deserialize_with = "lenient_f64")]
    pub base_rate: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub multiple: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub percentage: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(rename = "type")]
    pub rate_type: String,
}

impl RateItem {
    pub fn with_base_rate(label: impl Into<String>, base_rate: f64) -> Self {
        Self {
            label: label.into(),
            base_rate,
            ..Default::default()
        }
    }
}

/// Insertion-ordered group of rate lines keyed by a stable identifier.
pub type RateGroup = IndexMap<String, RateItem>;

/// The four rate groupings attached to a booking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateSchedule {
    pub all_inclusive_rates: RateGroup,
    pub taxes: RateGroup,
    pub amenities: RateGroup,
    pub misc: RateGroup,
}

/// Billing model of a booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    #[default]
    OneWay,
    CharterTour,
}

impl ServiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::OneWay => "one_way",
            ServiceType::CharterTour => "charter_tour",
        }
    }

    /// Map a display label onto a service type. `None` for labels we do not know.
    pub fn from_label(label: &str) -> Option<ServiceType> {
        let canonical = canonical_label(label);
        if canonical.contains("charter") || canonical == "hourly" || canonical == "tour" {
            return Some(ServiceType::CharterTour);
        }
        match canonical.as_str() {
            "one_way" | "oneway" | "point_to_point" | "transfer" => Some(ServiceType::OneWay),
            _ => None,
        }
    }

    /// Like [`ServiceType::from_label`] but unknown labels fall back to one-way.
    pub fn from_label_or_default(label: &str) -> ServiceType {
        Self::from_label(label).unwrap_or_default()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking parameters that drive the computation.
#[derive(Debug, Clone, PartialEq)]
pub struct RateComputationInput {
    pub service_type: ServiceType,
    /// Only meaningful for charters. Negative values are treated as zero.
    pub number_of_hours: Option<i64>,
    pub number_of_vehicles: u32,
    pub account_type: String,
    pub created_by: Option<i64>,
    pub reservation_type: String,
    /// User-edited values keyed like the schedule; used when they parse as numbers.
    pub dynamic_rates: IndexMap<String, String>,
    /// Tax keys whose value is a percentage of the all-inclusive sum.
    pub tax_is_percent: HashMap<String, bool>,
}

impl Default for RateComputationInput {
    fn default() -> Self {
        Self {
            service_type: ServiceType::OneWay,
            number_of_hours: None,
            number_of_vehicles: 1,
            account_type: String::new(),
            created_by: None,
            reservation_type: String::new(),
            dynamic_rates: IndexMap::new(),
            tax_is_percent: HashMap::new(),
        }
    }
}

impl RateComputationInput {
    pub fn with_service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = service_type;
        self
    }

    pub fn with_hours(mut self, hours: i64) -> Self {
        self.number_of_hours = Some(hours);
        self
    }

    pub fn with_vehicles(mut self, vehicles: u32) -> Self {
        self.number_of_vehicles = vehicles;
        self
    }

    pub fn with_account(mut self, account_type: impl Into<String>, created_by: Option<i64>) -> Self {
        self.account_type = account_type.into();
        self.created_by = created_by;
        self
    }

    pub fn with_reservation_type(mut self, reservation_type: impl Into<String>) -> Self {
        self.reservation_type = reservation_type.into();
        self
    }

    pub fn with_dynamic_rate(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dynamic_rates.insert(key.into(), value.into());
        self
    }

    /// Problems the caller should show before submitting. The engine itself
    /// computes regardless.
    pub fn issues(&self) -> Vec<RateInputIssue> {
        let mut issues = Vec::new();
        if self.service_type == ServiceType::CharterTour {
            if let Some(hours) = self.number_of_hours.filter(|hours| *hours < 2) {
                issues.push(RateInputIssue::CharterHoursBelowMinimum { hours });
            }
        }
        if self.number_of_vehicles == 0 {
            issues.push(RateInputIssue::NoVehicles);
        }
        issues
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateInputIssue {
    CharterHoursBelowMinimum { hours: i64 },
    NoVehicles,
}

impl fmt::Display for RateInputIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateInputIssue::CharterHoursBelowMinimum { hours } => {
                write!(f, "charter bookings need at least 2 hours (got {hours})")
            }
            RateInputIssue::NoVehicles => f.write_str("at least one vehicle is required"),
        }
    }
}

/// How the computed total is split between the parties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareBreakdown {
    pub base_rate: f64,
    pub grand_total: f64,
    pub stripe_fee: f64,
    pub admin_share: f64,
    pub deducted_admin_share: f64,
    pub affiliate_share: f64,
    pub extra_gratuity_share: f64,
    /// Present only for travel-planner bookings not created by the platform.
    pub travel_agent_share: Option<f64>,
    /// Present only for farmout reservations.
    pub farmout_share: Option<f64>,
}

/// Output of [`compute`]. Derived once and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateComputationResult {
    /// Sum of every group's base rates, charter-scaled.
    pub base_rate: f64,
    /// All-inclusive portion the admin share is taken from.
    pub admin_share_baserates: f64,
    pub admin_share_percentage: f64,
    pub sub_total: f64,
    pub grand_total: f64,
    pub shares: ShareBreakdown,
}
